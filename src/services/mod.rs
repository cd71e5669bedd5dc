pub mod composite_scorer;
pub mod diagnosis;
pub mod eastmoney;
pub mod kline_parser;
pub mod narrative;
pub mod report;
pub mod stock_analyzer;
pub mod technical_indicators;
pub mod trend_analyzer;
