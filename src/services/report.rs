use crate::models::analysis::StockComprehensiveReport;

/// 生成可读的综合分析报告文本。
/// detailed 为 true 时附带技术分析详情。
pub fn generate_report(report: &StockComprehensiveReport, detailed: bool) -> String {
    let mut lines = Vec::new();
    let bar = "=".repeat(80);

    lines.push(bar.clone());
    lines.push(format!(
        "股票综合分析报告 - {}({})",
        report.stock_name, report.stock_code
    ));
    lines.push(bar.clone());

    let summary = &report.summary;
    lines.push(format!("\n【综合评分】{:.1} 分", summary.overall_score));
    lines.push(format!("风险等级：{}", summary.risk_level));
    lines.push(format!("操作建议：{}", summary.recommendation));

    if !summary.score_details.is_empty() {
        lines.push("\n【分项评分】".to_string());
        for (name, score) in &summary.score_details {
            lines.push(format!("  {}: {:.1} 分", name, score));
        }
    }

    if !summary.key_points.is_empty() {
        lines.push("\n【关键要点】".to_string());
        for point in &summary.key_points {
            lines.push(format!("  {}", point));
        }
    }

    if !summary.opportunities.is_empty() {
        lines.push("\n【机会提示】".to_string());
        for opp in &summary.opportunities {
            lines.push(format!("  {}", opp));
        }
    }

    if !summary.risks.is_empty() {
        lines.push("\n【风险提示】".to_string());
        for risk in &summary.risks {
            lines.push(format!("  {}", risk));
        }
    }

    if !summary.ai_analysis.is_empty() {
        lines.push("\n【AI详细分析】".to_string());
        lines.push(summary.ai_analysis.clone());
    }

    lines.push(format!("\n[分析方式: {}]", summary.generated_by));

    if detailed {
        if let Some(tech) = &report.technical {
            lines.push(format!("\n{}", bar));
            lines.push("技术分析详情".to_string());
            lines.push(bar.clone());

            let basic = &tech.basic_info;
            lines.push("\n【基本信息】".to_string());
            lines.push(format!("  日期: {}", basic.date));
            lines.push(format!("  收盘价: {} 元", basic.close));
            lines.push(format!("  涨跌幅: {}%", basic.change_pct));
            lines.push(format!("  成交量: {} 手", basic.volume));
            lines.push(format!("  换手率: {}%", basic.turnover_rate));

            let ma = &tech.ma_trend;
            lines.push("\n【均线系统】".to_string());
            lines.push(format!("  趋势: {}", ma.trend));
            lines.push(format!("  排列: {}", ma.alignment));
            if let (Some(ma5), Some(ma10), Some(ma20), Some(ma60)) =
                (ma.ma5, ma.ma10, ma.ma20, ma.ma60)
            {
                lines.push(format!("  MA5: {:.2}  MA10: {:.2}", ma5, ma10));
                lines.push(format!("  MA20: {:.2}  MA60: {:.2}", ma20, ma60));
            }

            let macd = &tech.macd_signal;
            lines.push("\n【MACD】".to_string());
            lines.push(format!("  信号: {}", macd.signal));
            if let (Some(dif), Some(dea), Some(hist)) = (macd.dif, macd.dea, macd.hist) {
                lines.push(format!("  DIF: {}  DEA: {}  HIST: {}", dif, dea, hist));
            }

            let kdj = &tech.kdj_signal;
            lines.push("\n【KDJ】".to_string());
            lines.push(format!("  信号: {}", kdj.signal));
            if let (Some(k), Some(d), Some(j)) = (kdj.k, kdj.d, kdj.j) {
                lines.push(format!("  K: {}  D: {}  J: {}", k, d, j));
            }

            let sr = &tech.support_resistance;
            lines.push("\n【支撑压力位】".to_string());
            lines.push(format!("  当前价: {} 元", sr.current));
            lines.push(format!(
                "  支撑位: {} 元 (距离 {}%)",
                sr.support, sr.support_distance
            ));
            lines.push(format!(
                "  压力位: {} 元 (距离 {}%)",
                sr.resistance, sr.resistance_distance
            ));
        }
    }

    lines.push(format!("\n{}", bar));
    lines.push("报告生成完成".to_string());
    lines.push(bar);

    lines.join("\n")
}
