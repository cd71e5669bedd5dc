use crate::error::AnalysisError;
use crate::models::kline::{KlineItem, KlineSeries};

/// 单条K线记录的字段数下限：
/// 日期,开盘,收盘,最高,最低,成交量,成交额,振幅,涨跌幅,涨跌额,换手率
const MIN_FIELDS: usize = 11;

/// 解析东方财富K线接口的原始响应。
/// 响应结构: {"data": {"code": "...", "name": "...", "klines": ["...", ...]}}
pub fn parse_kline_response(response: &serde_json::Value) -> Result<KlineSeries, AnalysisError> {
    let data = response.get("data");
    let klines: Vec<String> = data
        .and_then(|d| d.get("klines"))
        .and_then(|k| k.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let stock_code = data
        .and_then(|d| d.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let stock_name = data
        .and_then(|d| d.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let items = parse_kline_records(&klines)?;
    Ok(KlineSeries {
        stock_code,
        stock_name,
        items,
    })
}

/// 解析逗号分隔的K线记录列表，输出按日期升序、无重复日期的序列。
/// 畸形记录（字段不足、数值解析失败）跳过；全部无效时返回 EmptySeries。
pub fn parse_kline_records<S: AsRef<str>>(records: &[S]) -> Result<Vec<KlineItem>, AnalysisError> {
    let mut items: Vec<KlineItem> = Vec::with_capacity(records.len());

    for record in records {
        match parse_kline_record(record.as_ref()) {
            Some(item) => items.push(item),
            None => {
                log::warn!("跳过畸形K线记录: {}", record.as_ref());
            }
        }
    }

    if items.is_empty() {
        return Err(AnalysisError::EmptySeries);
    }

    // 按日期升序排列，重复日期保留先出现的一条
    items.sort_by(|a, b| a.date.cmp(&b.date));
    items.dedup_by(|b, a| a.date == b.date);

    Ok(items)
}

fn parse_kline_record(record: &str) -> Option<KlineItem> {
    let parts: Vec<&str> = record.split(',').collect();
    if parts.len() < MIN_FIELDS {
        return None;
    }

    let date = parts[0].trim();
    if date.is_empty() {
        return None;
    }

    Some(KlineItem {
        date: date.to_string(),
        open: parts[1].trim().parse().ok()?,
        close: parts[2].trim().parse().ok()?,
        high: parts[3].trim().parse().ok()?,
        low: parts[4].trim().parse().ok()?,
        volume: parts[5].trim().parse().ok()?,
        amount: parts[6].trim().parse().ok()?,
        amplitude: parts[7].trim().parse().ok()?,
        change_pct: parts[8].trim().parse().ok()?,
        change_amount: parts[9].trim().parse().ok()?,
        turnover_rate: parts[10].trim().parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(date: &str, close: f64) -> String {
        format!(
            "{},10.00,{:.2},10.50,9.80,123456,9876543.0,7.1,1.5,0.15,2.3",
            date, close
        )
    }

    #[test]
    fn test_parse_valid_records_sorted() {
        let records = vec![
            sample_record("2025-01-03", 10.2),
            sample_record("2025-01-02", 10.1),
            sample_record("2025-01-06", 10.3),
        ];
        let items = parse_kline_records(&records).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].date, "2025-01-02");
        assert_eq!(items[2].date, "2025-01-06");
        assert_eq!(items[0].close, 10.1);
        assert_eq!(items[0].turnover_rate, 2.3);
    }

    #[test]
    fn test_malformed_records_skipped() {
        let records = vec![
            "2025-01-02,10.0,10.1".to_string(), // 字段不足
            "2025-01-03,abc,10.1,10.5,9.8,1,1,1,1,1,1".to_string(), // 非数值
            sample_record("2025-01-06", 10.3),
        ];
        let items = parse_kline_records(&records).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].date, "2025-01-06");
    }

    #[test]
    fn test_empty_series_error() {
        let records: Vec<String> = vec!["bad,record".to_string()];
        let err = parse_kline_records(&records).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptySeries));

        let none: Vec<String> = vec![];
        assert!(matches!(
            parse_kline_records(&none).unwrap_err(),
            AnalysisError::EmptySeries
        ));
    }

    #[test]
    fn test_duplicate_dates_deduped() {
        let records = vec![
            sample_record("2025-01-02", 10.1),
            sample_record("2025-01-02", 99.9),
            sample_record("2025-01-03", 10.2),
        ];
        let items = parse_kline_records(&records).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].close, 10.1);
    }

    #[test]
    fn test_parse_kline_response_envelope() {
        let response = serde_json::json!({
            "data": {
                "code": "002115",
                "name": "三维通信",
                "klines": [
                    sample_record("2025-01-02", 10.1),
                    sample_record("2025-01-03", 10.2),
                ]
            }
        });
        let series = parse_kline_response(&response).unwrap();
        assert_eq!(series.stock_code, "002115");
        assert_eq!(series.stock_name, "三维通信");
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_parse_kline_response_missing_data() {
        let response = serde_json::json!({"rc": 0});
        assert!(matches!(
            parse_kline_response(&response).unwrap_err(),
            AnalysisError::EmptySeries
        ));
    }
}
