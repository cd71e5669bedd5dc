use serde::{Deserialize, Serialize};

/// K线单条数据（一个交易日的完整观测）
///
/// 不变量：low ≤ open/close ≤ high。解析后不再修改。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KlineItem {
    pub date: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub amplitude: f64,
    #[serde(default)]
    pub change_pct: f64,
    #[serde(default)]
    pub change_amount: f64,
    #[serde(default)]
    pub turnover_rate: f64,
}

/// 一只股票按日期升序排列的K线序列，附带元信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KlineSeries {
    pub stock_code: String,
    pub stock_name: String,
    pub items: Vec<KlineItem>,
}

impl KlineSeries {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn latest(&self) -> Option<&KlineItem> {
        self.items.last()
    }
}

/// 技术指标计算结果，逐K线对齐。
/// 窗口未满时为 None（如 ma60 前59根）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub dates: Vec<String>,
    pub ma5: Vec<Option<f64>>,
    pub ma10: Vec<Option<f64>>,
    pub ma20: Vec<Option<f64>>,
    pub ma60: Vec<Option<f64>>,
    pub macd_dif: Vec<Option<f64>>,
    pub macd_dea: Vec<Option<f64>>,
    pub macd_hist: Vec<Option<f64>>,
    pub kdj_k: Vec<Option<f64>>,
    pub kdj_d: Vec<Option<f64>>,
    pub kdj_j: Vec<Option<f64>>,
    pub rsi6: Vec<Option<f64>>,
    pub rsi12: Vec<Option<f64>>,
    pub rsi24: Vec<Option<f64>>,
    pub boll_upper: Vec<Option<f64>>,
    pub boll_mid: Vec<Option<f64>>,
    pub boll_lower: Vec<Option<f64>>,
}

impl TechnicalIndicators {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
