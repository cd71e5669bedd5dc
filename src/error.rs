use thiserror::Error;

/// 核心分析管线错误
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 没有任何可用K线数据，分析无法进行
    #[error("K线数据为空，无法进行分析")]
    EmptySeries,
}

/// AI 研判（叙述生成）调用错误。
/// 该路径为尽力而为，所有变体最终都会回退到规则评分，不对外暴露。
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("网络请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI API 错误 ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("AI 返回空 choices")]
    EmptyChoices,

    #[error("AI 回复中未找到 JSON 对象")]
    JsonExtraction,

    #[error("AI 评分结构解析失败: {0}")]
    InvalidPayload(String),
}
