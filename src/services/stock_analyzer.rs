use anyhow::Result;
use chrono::Local;
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::models::ai::AIConfig;
use crate::models::analysis::{
    AnalysisSummary, BasicInfo, BollSnapshot, DiagnosisData, RsiSnapshot, StockComprehensiveReport,
    TechnicalReport,
};
use crate::models::kline::KlineSeries;
use crate::services::composite_scorer::{rule_based_summary, summary_from_ai_payload};
use crate::services::narrative::NarrativeClient;
use crate::services::technical_indicators::compute_indicators;
use crate::services::trend_analyzer::{
    analyze_kdj_signal, analyze_ma_trend, analyze_macd_signal, get_support_resistance,
    SUPPORT_RESISTANCE_DAYS,
};
use crate::services::{diagnosis, eastmoney};

/// 对K线序列做纯技术分析，产出聚合报告。
/// 确定性计算，无任何外部调用。
pub fn analyze(series: &KlineSeries) -> Result<TechnicalReport, AnalysisError> {
    let latest = series.latest().ok_or(AnalysisError::EmptySeries)?;

    let indicators = compute_indicators(&series.items);
    let i = indicators.len() - 1;

    let basic_info = BasicInfo {
        stock_code: series.stock_code.clone(),
        stock_name: series.stock_name.clone(),
        date: latest.date.clone(),
        close: latest.close,
        change_pct: latest.change_pct,
        volume: latest.volume,
        amount: latest.amount,
        turnover_rate: latest.turnover_rate,
    };

    let rsi = RsiSnapshot {
        rsi6: indicators.rsi6[i].map(round2),
        rsi12: indicators.rsi12[i].map(round2),
        rsi24: indicators.rsi24[i].map(round2),
    };
    let boll = BollSnapshot {
        upper: indicators.boll_upper[i].map(round2),
        mid: indicators.boll_mid[i].map(round2),
        lower: indicators.boll_lower[i].map(round2),
    };

    let support_resistance = get_support_resistance(&series.items, SUPPORT_RESISTANCE_DAYS)
        .ok_or(AnalysisError::EmptySeries)?;

    Ok(TechnicalReport {
        basic_info,
        ma_trend: analyze_ma_trend(&indicators),
        macd_signal: analyze_macd_signal(&indicators),
        kdj_signal: analyze_kdj_signal(&indicators),
        rsi,
        boll,
        support_resistance,
    })
}

/// 根据技术分析结果拼接交易建议（分号分隔）
pub fn get_trade_suggestion(report: &TechnicalReport) -> String {
    let mut suggestions = Vec::new();

    if report.ma_trend.alignment.contains("多头") {
        suggestions.push("均线多头排列，趋势向好");
    } else if report.ma_trend.alignment.contains("空头") {
        suggestions.push("均线空头排列，谨慎操作");
    }

    if report.macd_signal.signal.contains("金叉") {
        suggestions.push("MACD金叉，买入信号");
    } else if report.macd_signal.signal.contains("死叉") {
        suggestions.push("MACD死叉，卖出信号");
    }

    if report.kdj_signal.signal.contains("超买") {
        suggestions.push("KDJ超买，注意回调");
    } else if report.kdj_signal.signal.contains("超卖") {
        suggestions.push("KDJ超卖，关注反弹");
    }

    if suggestions.is_empty() {
        "震荡行情，观望为主".to_string()
    } else {
        suggestions.join("；")
    }
}

/// 综合分析器：拉取K线与诊股数据，输出技术面+多维评分的综合报告。
/// 配置了 AI 时优先走大模型评分，任何失败都回退到规则评分。
pub struct StockComprehensiveAnalyzer {
    narrative: Option<NarrativeClient>,
}

impl StockComprehensiveAnalyzer {
    pub fn new(ai_config: Option<AIConfig>) -> Self {
        Self {
            narrative: ai_config.map(NarrativeClient::new),
        }
    }

    pub async fn analyze_stock(
        &self,
        stock_code: &str,
        stock_name: Option<&str>,
        kline_days: usize,
    ) -> Result<StockComprehensiveReport> {
        log::info!("开始分析股票: {}", stock_name.unwrap_or(stock_code));

        // 1. 诊股数据（尽力而为，失败不阻断）
        let diagnosis = match diagnosis::get_stock_diagnosis(stock_name.unwrap_or(stock_code)).await
        {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("获取 {} 诊股数据失败: {}", stock_code, e);
                None
            }
        };

        // 2. K线历史
        let series = eastmoney::get_stock_history(stock_code, kline_days).await?;

        // 3. 技术分析
        let technical = analyze(&series)?;

        // 4. 综合评分
        let summary = self.generate_summary(&technical, diagnosis.as_ref()).await;

        Ok(StockComprehensiveReport {
            id: Uuid::new_v4().to_string(),
            stock_code: stock_code.to_string(),
            stock_name: if series.stock_name.is_empty() {
                stock_name.unwrap_or(stock_code).to_string()
            } else {
                series.stock_name.clone()
            },
            technical: Some(technical),
            diagnosis,
            summary,
            created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    async fn generate_summary(
        &self,
        technical: &TechnicalReport,
        diagnosis: Option<&DiagnosisData>,
    ) -> AnalysisSummary {
        if let Some(client) = &self.narrative {
            let stock_data = format_data_for_ai(technical, diagnosis);
            match client.analyze_stock_data(&stock_data).await {
                Ok(payload) => return summary_from_ai_payload(payload, &client.model_label()),
                Err(e) => {
                    log::warn!("AI分析失败，使用规则评分: {}", e);
                }
            }
        }
        rule_based_summary(Some(technical), diagnosis)
    }
}

/// 格式化技术面与诊股数据，作为大模型的输入
pub fn format_data_for_ai(
    technical: &TechnicalReport,
    diagnosis: Option<&DiagnosisData>,
) -> String {
    let mut parts = Vec::new();

    let basic = &technical.basic_info;
    parts.push(format!(
        "【基本信息】\n股票代码: {}\n股票名称: {}\n日期: {}\n当前价: {} 元\n涨跌幅: {}%\n成交量: {} 手\n换手率: {}%",
        basic.stock_code, basic.stock_name, basic.date, basic.close, basic.change_pct,
        basic.volume, basic.turnover_rate
    ));

    let ma = &technical.ma_trend;
    let macd = &technical.macd_signal;
    let kdj = &technical.kdj_signal;
    let rsi = &technical.rsi;
    let sr = &technical.support_resistance;
    parts.push(format!(
        "【技术指标】\n均线系统:\n  趋势: {}\n  排列: {}\n  MA5: {}  MA10: {}\n  MA20: {}  MA60: {}\n\n\
         MACD指标:\n  信号: {}\n  DIF: {}  DEA: {}\n\n\
         KDJ指标:\n  信号: {}\n  K: {}  D: {}  J: {}\n\n\
         RSI指标:\n  RSI6: {}  RSI12: {}\n\n\
         支撑压力位:\n  支撑位: {} 元\n  压力位: {} 元\n  当前价: {} 元",
        ma.trend, ma.alignment,
        fmt_opt(ma.ma5), fmt_opt(ma.ma10), fmt_opt(ma.ma20), fmt_opt(ma.ma60),
        macd.signal, fmt_opt(macd.dif), fmt_opt(macd.dea),
        kdj.signal, fmt_opt(kdj.k), fmt_opt(kdj.d), fmt_opt(kdj.j),
        fmt_opt(rsi.rsi6), fmt_opt(rsi.rsi12),
        sr.support, sr.resistance, sr.current
    ));

    if let Some(diag) = diagnosis {
        if diag.has_fund_flow() {
            parts.push("【资金面】\n包含: 主力资金流向、北向资金、DDE散户数据".to_string());
        }
        if diag.has_fundamentals() {
            parts.push("【基本面】\n包含: 财务数据、估值指标、股东信息".to_string());
        }
        if diag.has_news() {
            parts.push("【消息面】\n包含: 重要新闻、概念题材、投顾点评".to_string());
        }
    }

    parts.join("\n\n")
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{}", x),
        None => "N/A".to_string(),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
