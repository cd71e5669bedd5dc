use regex::Regex;

use crate::error::NarrativeError;
use crate::models::ai::{
    AIConfig, AiSummaryPayload, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
};
use crate::utils::http::build_ai_client;

const SYSTEM_PROMPT: &str = r#"你是一位资深的股票分析师，擅长从多个维度综合分析股票。
请根据提供的数据，进行专业的股票分析，并按以下JSON格式输出：

{
  "overall_score": 75.5,
  "risk_level": "中等风险",
  "recommendation": "持有",
  "key_points": ["关键要点1", "关键要点2", "关键要点3"],
  "opportunities": ["机会提示1", "机会提示2"],
  "risks": ["风险提示1", "风险提示2"],
  "analysis": "详细的分析说明...",
  "score_details": {
    "技术面": 70.0,
    "资金面": 75.0,
    "基本面": 80.0,
    "消息面": 75.0
  }
}

评分标准：
- overall_score: 0-100分的综合评分
- risk_level: 低风险、中等风险、高风险
- recommendation: 买入、持有、观望、规避
- 技术面(权重40%): 考虑MA/MACD/KDJ/RSI等指标
- 资金面(权重30%): 考虑主力资金、北向资金、DDE等
- 基本面(权重20%): 考虑财务数据、估值指标
- 消息面(权重10%): 考虑新闻、概念题材

要求：
1. 综合评分要客观，基于数据分析
2. key_points列出3-5个最重要的观察点
3. opportunities和risks分别列出2-4个具体的机会和风险
4. analysis提供详细的分析逻辑和操作建议
5. 必须输出有效的JSON格式，不要有其他文字"#;

/// AI 研判客户端：调用 OpenAI 兼容的 chat/completions 接口，
/// 解析模型返回的结构化评分。调用方负责失败时回退到规则评分。
pub struct NarrativeClient {
    config: AIConfig,
}

impl NarrativeClient {
    pub fn new(config: AIConfig) -> Self {
        Self { config }
    }

    /// 摘要 generated_by 标注，如 "DeepSeek AI"
    pub fn model_label(&self) -> String {
        if self.config.model_name.to_lowercase().contains("deepseek") {
            "DeepSeek AI".to_string()
        } else {
            format!("{} AI", self.config.model_name)
        }
    }

    /// 将格式化后的股票数据交给大模型，返回结构化评分载荷。
    pub async fn analyze_stock_data(
        &self,
        stock_data: &str,
    ) -> Result<AiSummaryPayload, NarrativeError> {
        let client = build_ai_client(self.config.timeout_secs)
            .map_err(|e| NarrativeError::InvalidPayload(e.to_string()))?;

        let req = ChatCompletionRequest {
            model: self.config.model_name.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(&format!(
                    "请分析以下股票数据：\n\n{}\n\n严格按照JSON格式输出。",
                    stock_data
                )),
            ],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let resp = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(NarrativeError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let response: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| NarrativeError::InvalidPayload(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .ok_or(NarrativeError::EmptyChoices)?;

        parse_summary_payload(&content)
    }
}

/// 解析模型回复中的评分 JSON
pub fn parse_summary_payload(content: &str) -> Result<AiSummaryPayload, NarrativeError> {
    let json_str = extract_json(content);
    serde_json::from_str(&json_str).map_err(|e| NarrativeError::InvalidPayload(e.to_string()))
}

/// 从模型回复中提取 JSON 部分。
/// 依次尝试 ```json 代码块、``` 代码块、裸 JSON 对象，都没有则返回原文。
fn extract_json(text: &str) -> String {
    // regex 常量模式，编译不会失败
    let fenced_json = Regex::new(r"(?s)```json\s*(.*?)\s*```").ok();
    if let Some(cap) = fenced_json.as_ref().and_then(|re| re.captures(text)) {
        return cap[1].to_string();
    }

    let fenced = Regex::new(r"(?s)```\s*(.*?)\s*```").ok();
    if let Some(cap) = fenced.as_ref().and_then(|re| re.captures(text)) {
        return cap[1].to_string();
    }

    let bare = Regex::new(r"(?s)\{.*\}").ok();
    if let Some(m) = bare.as_ref().and_then(|re| re.find(text)) {
        return m.as_str().to_string();
    }

    text.to_string()
}
