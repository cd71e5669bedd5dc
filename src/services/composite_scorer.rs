use std::collections::BTreeMap;

use crate::models::ai::AiSummaryPayload;
use crate::models::analysis::{AnalysisSummary, DiagnosisData, TechnicalReport};

/// 四个评分维度的权重：技术面40% / 资金面30% / 基本面20% / 消息面10%
const WEIGHT_TECHNICAL: f64 = 0.4;
const WEIGHT_FUNDS: f64 = 0.3;
const WEIGHT_FUNDAMENTALS: f64 = 0.2;
const WEIGHT_NEWS: f64 = 0.1;

/// 规则评分：确定性，无外部调用，对合法输入永不失败。
/// 缺失的维度直接不计入加权（与参考行为一致，不做权重归一化）。
pub fn rule_based_summary(
    technical: Option<&TechnicalReport>,
    diagnosis: Option<&DiagnosisData>,
) -> AnalysisSummary {
    let mut summary = AnalysisSummary {
        overall_score: 0.0,
        risk_level: "未知".to_string(),
        recommendation: "观望".to_string(),
        key_points: Vec::new(),
        opportunities: Vec::new(),
        risks: Vec::new(),
        score_details: BTreeMap::new(),
        ai_analysis: String::new(),
        generated_by: "Rule".to_string(),
    };

    let mut scores: Vec<(&str, f64, f64)> = Vec::new();

    if let Some(tech) = technical {
        let score = evaluate_technical(tech, &mut summary);
        scores.push(("技术面", score, WEIGHT_TECHNICAL));
    }

    if let Some(diag) = diagnosis.filter(|d| !d.is_empty()) {
        scores.push(("资金面", evaluate_funds(diag, &mut summary), WEIGHT_FUNDS));
        scores.push((
            "基本面",
            evaluate_fundamentals(diag, &mut summary),
            WEIGHT_FUNDAMENTALS,
        ));
        scores.push(("消息面", evaluate_news(diag, &mut summary), WEIGHT_NEWS));
    }

    if !scores.is_empty() {
        let total: f64 = scores.iter().map(|(_, s, w)| s * w).sum();
        summary.overall_score = round1(total.clamp(0.0, 100.0));
        summary.score_details = scores
            .iter()
            .map(|(name, s, _)| (name.to_string(), *s))
            .collect();
    }

    summary.recommendation = get_recommendation(summary.overall_score).to_string();
    summary.risk_level = get_risk_level(summary.overall_score).to_string();

    summary
}

/// 技术面评分（基础分50，按均线/MACD/KDJ信号加减，钳制 0-100）
fn evaluate_technical(tech: &TechnicalReport, summary: &mut AnalysisSummary) -> f64 {
    let mut score: f64 = 50.0;

    // 均线趋势（30分）
    match tech.ma_trend.trend.as_str() {
        "强势上涨" => {
            score += 30.0;
            summary.key_points.push("✓ 均线多头排列，趋势强劲".to_string());
        }
        "弱势下跌" => {
            score -= 20.0;
            summary.risks.push("✗ 均线空头排列，趋势偏弱".to_string());
        }
        _ => {
            summary.key_points.push("○ 均线纠缠，震荡整理".to_string());
        }
    }

    // MACD信号（20分）
    if tech.macd_signal.signal.contains("金叉") {
        score += 20.0;
        summary.opportunities.push("✓ MACD金叉，买入信号".to_string());
    } else if tech.macd_signal.signal.contains("死叉") {
        score -= 15.0;
        summary.risks.push("✗ MACD死叉，卖出信号".to_string());
    }

    // KDJ信号（20分）
    let kdj = &tech.kdj_signal.signal;
    if kdj.contains("买入") || kdj.contains("金叉") {
        score += 15.0;
        summary.opportunities.push("✓ KDJ金叉向上".to_string());
    } else if kdj.contains("超买") {
        score -= 10.0;
        summary.risks.push("⚠ KDJ超买，注意回调".to_string());
    } else if kdj.contains("超卖") {
        score += 10.0;
        summary.opportunities.push("✓ KDJ超卖，可能反弹".to_string());
    }

    score.clamp(0.0, 100.0)
}

/// 资金面评分：按诊股数据中资金类目的存在性加分
fn evaluate_funds(diagnosis: &DiagnosisData, summary: &mut AnalysisSummary) -> f64 {
    let mut score: f64 = 50.0;

    if diagnosis.contains("历史主力资金流向") {
        summary.key_points.push("○ 包含主力资金流向数据".to_string());
        score += 10.0;
    }
    if diagnosis.contains("北向资金流向情况") {
        summary.key_points.push("○ 包含北向资金数据".to_string());
        score += 5.0;
    }
    if diagnosis.contains("DDE散户数量变化") {
        summary.key_points.push("○ 包含DDE散户数据".to_string());
        score += 5.0;
    }

    score.clamp(0.0, 100.0)
}

/// 基本面评分
fn evaluate_fundamentals(diagnosis: &DiagnosisData, summary: &mut AnalysisSummary) -> f64 {
    let mut score: f64 = 50.0;

    if diagnosis.contains("财务数据") {
        summary.key_points.push("○ 包含财务数据".to_string());
        score += 15.0;
    }
    if diagnosis.contains("估值指标") {
        summary.key_points.push("○ 包含估值指标".to_string());
        score += 10.0;
    }

    score.clamp(0.0, 100.0)
}

/// 消息面评分
fn evaluate_news(diagnosis: &DiagnosisData, summary: &mut AnalysisSummary) -> f64 {
    let mut score: f64 = 50.0;

    if diagnosis.contains("重要新闻") {
        summary.key_points.push("○ 包含重要新闻".to_string());
        score += 10.0;
    }
    if diagnosis.contains("所属概念列表") {
        summary.key_points.push("○ 包含概念题材".to_string());
        score += 10.0;
    }

    score.clamp(0.0, 100.0)
}

/// 根据综合评分给出操作建议
pub fn get_recommendation(score: f64) -> &'static str {
    if score >= 75.0 {
        "买入"
    } else if score >= 60.0 {
        "持有"
    } else if score >= 45.0 {
        "观望"
    } else {
        "规避"
    }
}

/// 根据综合评分给出风险等级
pub fn get_risk_level(score: f64) -> &'static str {
    if score >= 70.0 {
        "低风险"
    } else if score >= 50.0 {
        "中等风险"
    } else {
        "高风险"
    }
}

/// 将 AI 返回的结构化载荷转换为分析摘要
pub fn summary_from_ai_payload(payload: AiSummaryPayload, model_label: &str) -> AnalysisSummary {
    AnalysisSummary {
        overall_score: payload.overall_score.clamp(0.0, 100.0),
        risk_level: payload.risk_level,
        recommendation: payload.recommendation,
        key_points: payload.key_points,
        opportunities: payload.opportunities,
        risks: payload.risks,
        score_details: payload.score_details,
        ai_analysis: payload.analysis,
        generated_by: model_label.to_string(),
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{
        BasicInfo, BollSnapshot, KdjSignal, MaTrend, MacdSignal, RsiSnapshot, SupportResistance,
    };

    fn tech_report(ma: &str, macd: &str, kdj: &str) -> TechnicalReport {
        TechnicalReport {
            basic_info: BasicInfo {
                stock_code: "002115".to_string(),
                stock_name: "三维通信".to_string(),
                date: "2025-06-30".to_string(),
                close: 10.5,
                change_pct: 1.2,
                volume: 123456.0,
                amount: 1296288.0,
                turnover_rate: 2.1,
            },
            ma_trend: MaTrend {
                trend: ma.to_string(),
                alignment: "多头排列".to_string(),
                ma5: Some(10.4),
                ma10: Some(10.3),
                ma20: Some(10.2),
                ma60: Some(10.0),
            },
            macd_signal: MacdSignal {
                signal: macd.to_string(),
                dif: Some(0.1),
                dea: Some(0.05),
                hist: Some(0.1),
            },
            kdj_signal: KdjSignal {
                signal: kdj.to_string(),
                k: Some(60.0),
                d: Some(55.0),
                j: Some(70.0),
            },
            rsi: RsiSnapshot {
                rsi6: Some(65.0),
                rsi12: Some(60.0),
                rsi24: Some(58.0),
            },
            boll: BollSnapshot {
                upper: Some(11.0),
                mid: Some(10.2),
                lower: Some(9.4),
            },
            support_resistance: SupportResistance {
                support: 9.5,
                resistance: 11.2,
                current: 10.5,
                support_distance: 9.52,
                resistance_distance: 6.67,
            },
        }
    }

    fn full_diagnosis() -> DiagnosisData {
        let mut diag = DiagnosisData::default();
        for key in [
            "历史主力资金流向",
            "北向资金流向情况",
            "DDE散户数量变化",
            "财务数据",
            "估值指标",
            "重要新闻",
            "所属概念列表",
        ] {
            diag.sections.insert(key.to_string(), "…".to_string());
        }
        diag
    }

    #[test]
    fn test_all_bullish_full_diagnosis() {
        let tech = tech_report("强势上涨", "金叉 - 买入信号", "金叉向上 - 买入");
        let summary = rule_based_summary(Some(&tech), Some(&full_diagnosis()));

        // 技术面 50+30+20+15=115 → 100；资金面 70；基本面 75；消息面 70
        assert_eq!(summary.score_details["技术面"], 100.0);
        assert_eq!(summary.score_details["资金面"], 70.0);
        assert_eq!(summary.score_details["基本面"], 75.0);
        assert_eq!(summary.score_details["消息面"], 70.0);
        // 100*0.4 + 70*0.3 + 75*0.2 + 70*0.1 = 83.0
        assert_eq!(summary.overall_score, 83.0);
        assert_eq!(summary.recommendation, "买入");
        assert_eq!(summary.risk_level, "低风险");
        assert_eq!(summary.generated_by, "Rule");
    }

    #[test]
    fn test_bearish_technical_only() {
        let tech = tech_report("弱势下跌", "死叉 - 卖出信号", "超买 - 注意回调风险");
        let summary = rule_based_summary(Some(&tech), None);

        // 技术面 50-20-15-10=5；仅技术面时 overall = 5*0.4 = 2.0
        assert_eq!(summary.score_details["技术面"], 5.0);
        assert_eq!(summary.overall_score, 2.0);
        assert_eq!(summary.recommendation, "规避");
        assert_eq!(summary.risk_level, "高风险");
        assert!(summary.risks.iter().any(|r| r.contains("空头排列")));
    }

    #[test]
    fn test_score_bounded_for_any_dimension_mix() {
        let tech = tech_report("强势上涨", "金叉 - 买入信号", "超卖 - 可能反弹");

        for diagnosis in [None, Some(DiagnosisData::default()), Some(full_diagnosis())] {
            let summary = rule_based_summary(Some(&tech), diagnosis.as_ref());
            assert!(summary.overall_score >= 0.0 && summary.overall_score <= 100.0);
        }

        // 无任何维度输入
        let summary = rule_based_summary(None, None);
        assert_eq!(summary.overall_score, 0.0);
        assert_eq!(summary.recommendation, "规避");
        assert!(summary.score_details.is_empty());
    }

    #[test]
    fn test_empty_diagnosis_skips_dimensions() {
        let tech = tech_report("震荡整理", "震荡 - 等待", "震荡 - 观望");
        let summary = rule_based_summary(Some(&tech), Some(&DiagnosisData::default()));
        assert!(summary.score_details.contains_key("技术面"));
        assert!(!summary.score_details.contains_key("资金面"));
    }

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(get_recommendation(75.0), "买入");
        assert_eq!(get_recommendation(74.9), "持有");
        assert_eq!(get_recommendation(60.0), "持有");
        assert_eq!(get_recommendation(45.0), "观望");
        assert_eq!(get_recommendation(44.9), "规避");
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(get_risk_level(70.0), "低风险");
        assert_eq!(get_risk_level(50.0), "中等风险");
        assert_eq!(get_risk_level(49.9), "高风险");
    }

    #[test]
    fn test_summary_from_ai_payload_clamps_score() {
        let payload = AiSummaryPayload {
            overall_score: 150.0,
            risk_level: "低风险".to_string(),
            recommendation: "买入".to_string(),
            key_points: vec!["点1".to_string()],
            opportunities: vec![],
            risks: vec![],
            score_details: BTreeMap::new(),
            analysis: "分析".to_string(),
        };
        let summary = summary_from_ai_payload(payload, "DeepSeek AI");
        assert_eq!(summary.overall_score, 100.0);
        assert_eq!(summary.generated_by, "DeepSeek AI");
    }
}
