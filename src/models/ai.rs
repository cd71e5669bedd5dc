use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// AI 大模型接入配置。
/// 显式传入各服务，不使用全局单例。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIConfig {
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
    pub max_tokens: u32,
    /// 分析场景 temperature（建议 0.1~0.3）
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com/v1".to_string(),
            api_key: String::new(),
            model_name: "deepseek-chat".to_string(),
            max_tokens: 2000,
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

impl AIConfig {
    /// 从环境变量构造（DEEPSEEK_API_KEY 等），密钥缺失时返回 None
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("DEEPSEEK_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }
        let mut config = Self {
            api_key,
            ..Self::default()
        };
        if let Ok(base_url) = std::env::var("DEEPSEEK_BASE_URL") {
            if !base_url.is_empty() {
                config.base_url = base_url;
            }
        }
        if let Ok(model) = std::env::var("DEEPSEEK_MODEL") {
            if !model.is_empty() {
                config.model_name = model;
            }
        }
        Some(config)
    }
}

// ========== Chat Completion 数据结构 ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: Option<ChatChoiceMessage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoiceMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// AI 返回的结构化评分载荷。
/// 字段带默认值，缺失时回落到中性取值；解析彻底失败则整体走规则评分。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSummaryPayload {
    #[serde(default = "default_score")]
    pub overall_score: f64,
    #[serde(default = "default_risk_level")]
    pub risk_level: String,
    #[serde(default = "default_recommendation")]
    pub recommendation: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub score_details: BTreeMap<String, f64>,
    #[serde(default)]
    pub analysis: String,
}

fn default_score() -> f64 {
    50.0
}

fn default_risk_level() -> String {
    "中等风险".to_string()
}

fn default_recommendation() -> String {
    "观望".to_string()
}
