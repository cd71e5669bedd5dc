use anyhow::{anyhow, Result};

use crate::models::kline::KlineSeries;
use crate::services::kline_parser::parse_kline_response;
use crate::utils::http::build_stock_client;
use crate::utils::retry::retry_with_backoff;

const KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";

/// 股票代码转东方财富 secid：6开头为沪市（市场1），其余为深市（市场0）
pub fn build_secid(stock_code: &str) -> String {
    let market = if stock_code.starts_with('6') { "1" } else { "0" };
    format!("{}.{}", market, stock_code)
}

/// 获取个股日K线历史（前复权），返回按日期升序的K线序列。
/// lmt 为往前回看的条数。
pub async fn get_stock_history(stock_code: &str, lmt: usize) -> Result<KlineSeries> {
    let secid = build_secid(stock_code);
    let client = build_stock_client()?;

    let url = format!(
        "{}?fields1=f1,f2,f3,f4,f5,f6\
         &fields2=f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61\
         &klt=101&fqt=1&end=20500000&secid={}&lmt={}",
        KLINE_URL,
        urlencoding::encode(&secid),
        lmt
    );

    let response = retry_with_backoff(2, || async {
        let resp = client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("K线接口返回 {}", status));
        }
        let json: serde_json::Value = resp.json().await?;
        Ok(json)
    })
    .await?;

    let series = parse_kline_response(&response)
        .map_err(|e| anyhow!("股票 {} K线解析失败: {}", stock_code, e))?;

    log::info!(
        "获取 {} K线 {} 条（{} ~ {}）",
        stock_code,
        series.len(),
        series.items.first().map(|k| k.date.as_str()).unwrap_or("-"),
        series.items.last().map(|k| k.date.as_str()).unwrap_or("-")
    );

    Ok(series)
}
