use anyhow::Result;
use clap::{Parser, Subcommand};

use stock_insight::models::ai::AIConfig;
use stock_insight::services::report::generate_report;
use stock_insight::services::stock_analyzer::StockComprehensiveAnalyzer;

#[derive(Parser)]
#[command(name = "stock-insight", about = "A股技术分析与综合评分工具", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 分析单只股票，输出综合报告
    Analyze {
        /// 股票代码，如 002115
        code: String,
        /// 股票名称（可选，用于诊股查询）
        #[arg(short, long)]
        name: Option<String>,
        /// K线回看天数
        #[arg(short, long, default_value_t = 120)]
        days: usize,
        /// 输出 JSON 而非文本报告
        #[arg(long)]
        json: bool,
        /// 禁用 AI 研判，仅用规则评分
        #[arg(long)]
        no_ai: bool,
    },
    /// 批量分析多只股票，输出简表
    Batch {
        /// 股票代码列表
        codes: Vec<String>,
        /// K线回看天数
        #[arg(short, long, default_value_t = 120)]
        days: usize,
        /// 禁用 AI 研判，仅用规则评分
        #[arg(long)]
        no_ai: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            code,
            name,
            days,
            json,
            no_ai,
        } => {
            let analyzer = StockComprehensiveAnalyzer::new(ai_config(no_ai));
            let report = analyzer.analyze_stock(&code, name.as_deref(), days).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", generate_report(&report, true));
            }
        }
        Commands::Batch { codes, days, no_ai } => {
            if codes.is_empty() {
                anyhow::bail!("请至少提供一个股票代码");
            }
            let analyzer = StockComprehensiveAnalyzer::new(ai_config(no_ai));
            for code in &codes {
                match analyzer.analyze_stock(code, None, days).await {
                    Ok(report) => {
                        println!(
                            "{}({})  评分 {:.1}  {}  {}",
                            report.stock_name,
                            report.stock_code,
                            report.summary.overall_score,
                            report.summary.risk_level,
                            report.summary.recommendation
                        );
                    }
                    Err(e) => {
                        log::error!("分析 {} 失败: {}", code, e);
                        println!("{}  分析失败", code);
                    }
                }
            }
        }
    }

    Ok(())
}

fn ai_config(no_ai: bool) -> Option<AIConfig> {
    if no_ai {
        return None;
    }
    let config = AIConfig::from_env();
    if config.is_none() {
        log::info!("未配置 DEEPSEEK_API_KEY，使用规则评分");
    }
    config
}
