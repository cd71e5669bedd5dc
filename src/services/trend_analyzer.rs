use crate::models::analysis::{KdjSignal, MaTrend, MacdSignal, SupportResistance};
use crate::models::kline::{KlineItem, TechnicalIndicators};

/// MA 趋势判断所需的最少K线数（覆盖 ma60 回看窗口）
const MA_TREND_MIN_BARS: usize = 60;

/// 支撑/压力位默认回看天数
pub const SUPPORT_RESISTANCE_DAYS: usize = 60;

/// 分析均线排列与趋势。不足60根K线时返回"数据不足"。
pub fn analyze_ma_trend(indicators: &TechnicalIndicators) -> MaTrend {
    let n = indicators.len();
    if n < MA_TREND_MIN_BARS {
        return MaTrend {
            trend: "数据不足".to_string(),
            alignment: "未知".to_string(),
            ma5: None,
            ma10: None,
            ma20: None,
            ma60: None,
        };
    }

    let i = n - 1;
    match (
        indicators.ma5[i],
        indicators.ma10[i],
        indicators.ma20[i],
        indicators.ma60[i],
    ) {
        (Some(ma5), Some(ma10), Some(ma20), Some(ma60)) => {
            let (trend, alignment) = if ma5 > ma10 && ma10 > ma20 && ma20 > ma60 {
                ("强势上涨", "多头排列")
            } else if ma5 < ma10 && ma10 < ma20 && ma20 < ma60 {
                ("弱势下跌", "空头排列")
            } else {
                ("震荡整理", "均线纠缠")
            };
            MaTrend {
                trend: trend.to_string(),
                alignment: alignment.to_string(),
                ma5: Some(ma5),
                ma10: Some(ma10),
                ma20: Some(ma20),
                ma60: Some(ma60),
            }
        }
        _ => MaTrend {
            trend: "数据不足".to_string(),
            alignment: "未知".to_string(),
            ma5: None,
            ma10: None,
            ma20: None,
            ma60: None,
        },
    }
}

/// 分析 MACD 信号：比较最近两根的 DIF/DEA 判断金叉死叉，否则按多空区间归类。
/// 需要至少2根K线。
pub fn analyze_macd_signal(indicators: &TechnicalIndicators) -> MacdSignal {
    let n = indicators.len();
    if n < 2 {
        return MacdSignal {
            signal: "数据不足".to_string(),
            dif: None,
            dea: None,
            hist: None,
        };
    }

    let latest = n - 1;
    let prev = n - 2;

    let (dif, dea, hist, prev_dif, prev_dea) = match (
        indicators.macd_dif[latest],
        indicators.macd_dea[latest],
        indicators.macd_hist[latest],
        indicators.macd_dif[prev],
        indicators.macd_dea[prev],
    ) {
        (Some(a), Some(b), Some(c), Some(d), Some(e)) => (a, b, c, d, e),
        _ => {
            return MacdSignal {
                signal: "数据不足".to_string(),
                dif: None,
                dea: None,
                hist: None,
            }
        }
    };

    let signal = if prev_dif <= prev_dea && dif > dea {
        "金叉 - 买入信号"
    } else if prev_dif >= prev_dea && dif < dea {
        "死叉 - 卖出信号"
    } else if dif > dea && hist > 0.0 {
        "多头 - 持有"
    } else if dif < dea && hist < 0.0 {
        "空头 - 观望"
    } else {
        "震荡 - 等待"
    };

    MacdSignal {
        signal: signal.to_string(),
        dif: Some(round3(dif)),
        dea: Some(round3(dea)),
        hist: Some(round3(hist)),
    }
}

/// 分析 KDJ 信号：超买超卖优先，其次金叉/死叉方向，否则震荡。
pub fn analyze_kdj_signal(indicators: &TechnicalIndicators) -> KdjSignal {
    let n = indicators.len();
    if n == 0 {
        return KdjSignal {
            signal: "数据不足".to_string(),
            k: None,
            d: None,
            j: None,
        };
    }

    let i = n - 1;
    let (k, d, j) = match (indicators.kdj_k[i], indicators.kdj_d[i], indicators.kdj_j[i]) {
        (Some(k), Some(d), Some(j)) => (k, d, j),
        _ => {
            return KdjSignal {
                signal: "数据不足".to_string(),
                k: None,
                d: None,
                j: None,
            }
        }
    };

    let signal = if k > 80.0 && d > 80.0 {
        "超买 - 注意回调风险"
    } else if k < 20.0 && d < 20.0 {
        "超卖 - 可能反弹"
    } else if k > d && j > k {
        "金叉向上 - 买入"
    } else if k < d && j < k {
        "死叉向下 - 卖出"
    } else {
        "震荡 - 观望"
    };

    KdjSignal {
        signal: signal.to_string(),
        k: Some(round2(k)),
        d: Some(round2(d)),
        j: Some(round2(j)),
    }
}

/// 计算支撑位（近N日最低价）与压力位（近N日最高价），
/// 以及两者相对当前收盘价的百分比距离。
pub fn get_support_resistance(klines: &[KlineItem], days: usize) -> Option<SupportResistance> {
    let latest = klines.last()?;
    let start = klines.len().saturating_sub(days);
    let recent = &klines[start..];

    let support = recent.iter().map(|k| k.low).fold(f64::INFINITY, f64::min);
    let resistance = recent.iter().map(|k| k.high).fold(f64::NEG_INFINITY, f64::max);
    let current = latest.close;

    let (support_distance, resistance_distance) = if current.abs() > 1e-10 {
        (
            round2((current - support) / current * 100.0),
            round2((resistance - current) / current * 100.0),
        )
    } else {
        (0.0, 0.0)
    };

    Some(SupportResistance {
        support: round2(support),
        resistance: round2(resistance),
        current: round2(current),
        support_distance,
        resistance_distance,
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
