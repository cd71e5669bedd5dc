pub mod ai;
pub mod analysis;
pub mod kline;
