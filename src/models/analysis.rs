use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 均线趋势分析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaTrend {
    /// 强势上涨 / 弱势下跌 / 震荡整理 / 数据不足
    pub trend: String,
    /// 多头排列 / 空头排列 / 均线纠缠 / 未知
    pub alignment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma5: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma10: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma60: Option<f64>,
}

/// MACD 信号分析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdSignal {
    pub signal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dif: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dea: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hist: Option<f64>,
}

/// KDJ 信号分析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdjSignal {
    pub signal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub j: Option<f64>,
}

/// 支撑位与压力位
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
    pub current: f64,
    /// 当前价距支撑位的百分比
    pub support_distance: f64,
    /// 压力位距当前价的百分比
    pub resistance_distance: f64,
}

/// 最新一根K线的基本行情信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicInfo {
    pub stock_code: String,
    pub stock_name: String,
    pub date: String,
    pub close: f64,
    pub change_pct: f64,
    pub volume: f64,
    pub amount: f64,
    pub turnover_rate: f64,
}

/// RSI 最新值快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi6: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi12: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi24: Option<f64>,
}

/// 布林带最新值快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
}

/// 技术分析聚合报告（纯技术面，单只股票一次分析的产物）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalReport {
    pub basic_info: BasicInfo,
    pub ma_trend: MaTrend,
    pub macd_signal: MacdSignal,
    pub kdj_signal: KdjSignal,
    pub rsi: RsiSnapshot,
    pub boll: BollSnapshot,
    pub support_resistance: SupportResistance,
}

/// 诊股数据：外部诊断服务返回的松散分类文本。
/// 评分器只读取固定类目的存在性，不做数值解析。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosisData {
    /// 类目名 -> 原始文本（透传）
    pub sections: BTreeMap<String, String>,
}

impl DiagnosisData {
    pub fn contains(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn has_fund_flow(&self) -> bool {
        ["历史主力资金流向", "北向资金流向情况", "DDE散户数量变化"]
            .iter()
            .any(|k| self.contains(k))
    }

    pub fn has_fundamentals(&self) -> bool {
        ["财务数据", "估值指标", "十大股东持股比例"]
            .iter()
            .any(|k| self.contains(k))
    }

    pub fn has_news(&self) -> bool {
        ["重要新闻", "所属概念列表", "投顾点评"]
            .iter()
            .any(|k| self.contains(k))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// 综合评分摘要：每次分析请求新建，不可变，不持久化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// 0-100 综合评分
    pub overall_score: f64,
    /// 低风险 / 中等风险 / 高风险
    pub risk_level: String,
    /// 买入 / 持有 / 观望 / 规避
    pub recommendation: String,
    pub key_points: Vec<String>,
    pub opportunities: Vec<String>,
    pub risks: Vec<String>,
    /// 维度名 -> 分项得分
    pub score_details: BTreeMap<String, f64>,
    /// AI 详细分析文本（规则路径为空）
    #[serde(default)]
    pub ai_analysis: String,
    /// "Rule" 或 AI 模型标注
    pub generated_by: String,
}

/// 股票综合分析报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockComprehensiveReport {
    pub id: String,
    pub stock_code: String,
    pub stock_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<TechnicalReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<DiagnosisData>,
    pub summary: AnalysisSummary,
    pub created_at: String,
}
