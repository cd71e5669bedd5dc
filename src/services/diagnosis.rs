use anyhow::{anyhow, Result};

use crate::models::analysis::DiagnosisData;
use crate::utils::http::build_diagnosis_client;
use crate::utils::retry::retry_with_backoff;

const DIAGNOSIS_URL: &str = "https://www.iwencai.com/customized/chart/get-robot-data";

/// 单个诊断类目文本的最大长度，超出部分截断
const SECTION_MAX_CHARS: usize = 2000;

/// 获取个股诊断信息（资金面/基本面/消息面的分类文本）。
/// 尽力而为：接口失败或响应不可解析时返回错误，由调用方决定降级。
pub async fn get_stock_diagnosis(stock_code: &str) -> Result<DiagnosisData> {
    let client = build_diagnosis_client()?;
    let url = format!(
        "{}?question={}&secondary_intent=stock",
        DIAGNOSIS_URL,
        urlencoding::encode(stock_code)
    );

    let response = retry_with_backoff(1, || async {
        let resp = client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("诊股接口返回 {}", status));
        }
        let json: serde_json::Value = resp.json().await?;
        Ok(json)
    })
    .await?;

    let data = parse_diagnosis_response(&response)?;
    log::info!("获取 {} 诊股类目 {} 个", stock_code, data.sections.len());
    Ok(data)
}

/// 将诊股接口的 JSON 响应展平为 类目名 -> 文本 的映射。
/// 字符串值原样保留，对象/数组序列化为 JSON 文本。
pub fn parse_diagnosis_response(response: &serde_json::Value) -> Result<DiagnosisData> {
    let obj = response
        .get("data")
        .and_then(|d| d.as_object())
        .or_else(|| response.as_object())
        .ok_or_else(|| anyhow!("诊股响应不是 JSON 对象"))?;

    let mut data = DiagnosisData::default();
    for (key, value) in obj {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        };
        if text.is_empty() || text == "null" {
            continue;
        }
        data.sections.insert(key.clone(), truncate_chars(&text, SECTION_MAX_CHARS));
    }

    if data.is_empty() {
        return Err(anyhow!("诊股响应无有效类目"));
    }
    Ok(data)
}

/// 格式化诊断信息为可读文本（用于拼接 AI 提示词）
pub fn format_diagnosis(diagnosis: &DiagnosisData) -> String {
    if diagnosis.is_empty() {
        return "未获取到诊断信息".to_string();
    }

    let mut lines = Vec::new();
    lines.push("=".repeat(80));
    lines.push("股票诊断报告".to_string());
    lines.push("=".repeat(80));

    for (key, value) in &diagnosis.sections {
        lines.push(format!("\n【{}】", key));
        lines.push(value.clone());
    }

    lines.join("\n")
}

/// 按字符截断（类目文本含中文，不能按字节切）
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max).collect();
    format!("{}\n... (内容过长已截取)", truncated)
}
