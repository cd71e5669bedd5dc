use crate::models::kline::{KlineItem, TechnicalIndicators};

/// 对整个序列一次性计算全部技术指标（单次前向遍历，无回溯修正）
pub fn compute_indicators(klines: &[KlineItem]) -> TechnicalIndicators {
    let closes: Vec<f64> = klines.iter().map(|k| k.close).collect();
    let highs: Vec<f64> = klines.iter().map(|k| k.high).collect();
    let lows: Vec<f64> = klines.iter().map(|k| k.low).collect();
    let dates: Vec<String> = klines.iter().map(|k| k.date.clone()).collect();

    let ma5 = calc_ma(&closes, 5);
    let ma10 = calc_ma(&closes, 10);
    let ma20 = calc_ma(&closes, 20);
    let ma60 = calc_ma(&closes, 60);

    let (macd_dif, macd_dea, macd_hist) = calc_macd(&closes, 12, 26, 9);
    let (kdj_k, kdj_d, kdj_j) = calc_kdj(&highs, &lows, &closes, 9, 3, 3);
    let rsi6 = calc_rsi(&closes, 6);
    let rsi12 = calc_rsi(&closes, 12);
    let rsi24 = calc_rsi(&closes, 24);
    let (boll_upper, boll_mid, boll_lower) = calc_boll(&closes, 20, 2.0);

    TechnicalIndicators {
        dates,
        ma5,
        ma10,
        ma20,
        ma60,
        macd_dif,
        macd_dea,
        macd_hist,
        kdj_k,
        kdj_d,
        kdj_j,
        rsi6,
        rsi12,
        rsi24,
        boll_upper,
        boll_mid,
        boll_lower,
    }
}

/// 移动平均线：窗口未满时为 None
pub fn calc_ma(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    let mut sum: f64 = data[..period].iter().sum();
    result[period - 1] = Some(sum / period as f64);

    for i in period..data.len() {
        sum += data[i] - data[i - period];
        result[i] = Some(sum / period as f64);
    }
    result
}

/// 指数移动平均：以首个值为种子，alpha = 2/(period+1)，从第0根即有值
pub fn calc_ema(data: &[f64], period: usize) -> Vec<f64> {
    let mut result = Vec::with_capacity(data.len());
    if data.is_empty() || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    result.push(data[0]);

    for i in 1..data.len() {
        let prev = result[i - 1];
        result.push(data[i] * alpha + prev * (1.0 - alpha));
    }
    result
}

/// MACD：DIF = EMA(fast) − EMA(slow)，DEA = EMA(DIF, signal)，HIST = 2·(DIF−DEA)。
/// EMA 无预热期，三列自首根K线起有值。
pub fn calc_macd(
    data: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let n = data.len();
    if n == 0 {
        return (vec![], vec![], vec![]);
    }

    let ema_fast = calc_ema(data, fast);
    let ema_slow = calc_ema(data, slow);

    let dif_values: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();
    let dea_values = calc_ema(&dif_values, signal);

    let dif = dif_values.iter().map(|&v| Some(v)).collect();
    let hist = dif_values
        .iter()
        .zip(dea_values.iter())
        .map(|(d, de)| Some((d - de) * 2.0))
        .collect();
    let dea = dea_values.into_iter().map(Some).collect();

    (dif, dea, hist)
}

/// KDJ：RSV = (close − n日最低) / (n日最高 − n日最低) × 100。
/// 平坦区间（最高 == 最低）时 RSV 取 50；K/D 以 50 为种子做平滑。
pub fn calc_kdj(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    n: usize,
    m1: usize,
    m2: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let len = closes.len();
    let mut k_vals = vec![None; len];
    let mut d_vals = vec![None; len];
    let mut j_vals = vec![None; len];

    if n == 0 || len < n {
        return (k_vals, d_vals, j_vals);
    }

    let mut prev_k = 50.0_f64;
    let mut prev_d = 50.0_f64;

    for i in (n - 1)..len {
        let start = i + 1 - n;
        let highest = highs[start..=i].iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let lowest = lows[start..=i].iter().cloned().fold(f64::INFINITY, f64::min);

        let rsv = if (highest - lowest).abs() < 1e-10 {
            50.0
        } else {
            (closes[i] - lowest) / (highest - lowest) * 100.0
        };

        let k = prev_k * (m1 as f64 - 1.0) / m1 as f64 + rsv / m1 as f64;
        let d = prev_d * (m2 as f64 - 1.0) / m2 as f64 + k / m2 as f64;
        let j = 3.0 * k - 2.0 * d;

        k_vals[i] = Some(k);
        d_vals[i] = Some(d);
        j_vals[i] = Some(j);

        prev_k = k;
        prev_d = d;
    }

    (k_vals, d_vals, j_vals)
}

/// RSI：窗口内涨跌幅简单均值之比。
/// 平均跌幅为 0 时取 100；窗口未满（前 period 根）为 None。
pub fn calc_rsi(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period + 1 {
        return result;
    }

    // 涨跌分离：上涨日跌幅记 0，下跌日涨幅记 0
    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);
    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut gain_sum: f64 = gains[..period].iter().sum();
    let mut loss_sum: f64 = losses[..period].iter().sum();
    result[period] = Some(rsi_from_sums(gain_sum, loss_sum));

    for i in period..gains.len() {
        gain_sum += gains[i] - gains[i - period];
        loss_sum += losses[i] - losses[i - period];
        result[i + 1] = Some(rsi_from_sums(gain_sum, loss_sum));
    }

    result
}

fn rsi_from_sums(gain_sum: f64, loss_sum: f64) -> f64 {
    if loss_sum.abs() < 1e-10 {
        return 100.0;
    }
    let rs = gain_sum / loss_sum;
    100.0 - 100.0 / (1.0 + rs)
}

/// 布林带：中轨 = SMA(period)，上下轨 = 中轨 ± multiplier × 样本标准差（ddof=1）
pub fn calc_boll(
    data: &[f64],
    period: usize,
    multiplier: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let n = data.len();
    let mut upper = vec![None; n];
    let mut mid = vec![None; n];
    let mut lower = vec![None; n];

    if period < 2 || n < period {
        return (upper, mid, lower);
    }

    for i in (period - 1)..n {
        let start = i + 1 - period;
        let slice = &data[start..=i];
        let mean: f64 = slice.iter().sum::<f64>() / period as f64;
        let variance: f64 = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
            / (period as f64 - 1.0);
        let std_dev = variance.sqrt();

        mid[i] = Some(mean);
        upper[i] = Some(mean + multiplier * std_dev);
        lower[i] = Some(mean - multiplier * std_dev);
    }

    (upper, mid, lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising_closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 10.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn test_ma_window_alignment() {
        let data = rising_closes(10);
        let ma5 = calc_ma(&data, 5);
        assert!(ma5[3].is_none());
        // 前5个: 10.0..10.4，均值 10.2
        assert!((ma5[4].unwrap() - 10.2).abs() < 1e-9);
        assert!(ma5[9].is_some());
    }

    #[test]
    fn test_ma_insufficient_data() {
        let data = rising_closes(3);
        let ma5 = calc_ma(&data, 5);
        assert!(ma5.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_ema_seeded_at_first_close() {
        let data = vec![10.0, 11.0, 12.0];
        let ema = calc_ema(&data, 12);
        assert_eq!(ema[0], 10.0);
        let alpha = 2.0 / 13.0;
        assert!((ema[1] - (11.0 * alpha + 10.0 * (1.0 - alpha))).abs() < 1e-9);
    }

    #[test]
    fn test_macd_defined_from_first_bar() {
        let data = rising_closes(30);
        let (dif, dea, hist) = calc_macd(&data, 12, 26, 9);
        assert!(dif[0].is_some());
        assert!(dea[0].is_some());
        assert!(hist[0].is_some());
        // 首根 DIF = 首收盘 − 首收盘 = 0
        assert!((dif[0].unwrap()).abs() < 1e-9);
        // 持续上涨时后段 DIF 为正
        assert!(dif[29].unwrap() > 0.0);
    }

    #[test]
    fn test_kdj_flat_window_is_finite() {
        let flat = vec![10.0; 20];
        let (k, d, j) = calc_kdj(&flat, &flat, &flat, 9, 3, 3);
        assert!(k[..8].iter().all(|v| v.is_none()));
        for i in 8..20 {
            let (kv, dv, jv) = (k[i].unwrap(), d[i].unwrap(), j[i].unwrap());
            assert!(kv.is_finite() && dv.is_finite() && jv.is_finite());
            // 平坦序列 RSV 固定 50，K/D/J 收敛在 50
            assert!((kv - 50.0).abs() < 1e-6);
            assert!((jv - 50.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_kdj_rising_series_high_k() {
        let n = 30;
        let closes = rising_closes(n);
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.05).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 0.05).collect();
        let (k, d, _) = calc_kdj(&highs, &lows, &closes, 9, 3, 3);
        // 单边上涨时收盘价贴近区间顶部，K 高于 D
        assert!(k[n - 1].unwrap() > 70.0);
        assert!(k[n - 1].unwrap() > d[n - 1].unwrap());
    }

    #[test]
    fn test_rsi_bounded_and_flat_clamped() {
        let flat = vec![10.0; 30];
        let rsi = calc_rsi(&flat, 6);
        assert!(rsi[..6].iter().all(|v| v.is_none()));
        // 全平序列平均跌幅为 0，约定取 100
        assert_eq!(rsi[6].unwrap(), 100.0);

        let rising = rising_closes(30);
        let rsi = calc_rsi(&rising, 6);
        assert_eq!(rsi[29].unwrap(), 100.0);

        let mut mixed = rising_closes(15);
        mixed.extend((0..15).map(|i| 11.4 - i as f64 * 0.1));
        for v in calc_rsi(&mixed, 6).iter().flatten() {
            assert!(*v >= 0.0 && *v <= 100.0);
        }
        let falling: Vec<f64> = (0..30).map(|i| 20.0 - i as f64 * 0.1).collect();
        assert!(calc_rsi(&falling, 6)[29].unwrap() < 1e-9);
    }

    #[test]
    fn test_boll_sample_stddev() {
        // 20个点：前19个为10.0，最后一个为12.0
        let mut data = vec![10.0; 19];
        data.push(12.0);
        let (upper, mid, lower) = calc_boll(&data, 20, 2.0);
        let mean = (19.0 * 10.0 + 12.0) / 20.0;
        assert!((mid[19].unwrap() - mean).abs() < 1e-9);
        // 样本方差 ddof=1
        let var: f64 = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 19.0;
        let expected_upper = mean + 2.0 * var.sqrt();
        assert!((upper[19].unwrap() - expected_upper).abs() < 1e-9);
        assert!(lower[19].unwrap() < mid[19].unwrap());
    }

    #[test]
    fn test_no_lookahead_on_append() {
        let data = rising_closes(40);
        let mut extended = data.clone();
        extended.push(5.0); // 追加一根暴跌K线

        let ma_a = calc_ma(&data, 5);
        let ma_b = calc_ma(&extended, 5);
        let (dif_a, dea_a, _) = calc_macd(&data, 12, 26, 9);
        let (dif_b, dea_b, _) = calc_macd(&extended, 12, 26, 9);
        let rsi_a = calc_rsi(&data, 6);
        let rsi_b = calc_rsi(&extended, 6);

        for i in 0..data.len() {
            assert_eq!(ma_a[i], ma_b[i]);
            assert_eq!(dif_a[i], dif_b[i]);
            assert_eq!(dea_a[i], dea_b[i]);
            assert_eq!(rsi_a[i], rsi_b[i]);
        }
    }

    #[test]
    fn test_compute_indicators_alignment() {
        let klines: Vec<crate::models::kline::KlineItem> = (0..70)
            .map(|i| crate::models::kline::KlineItem {
                date: format!("2025-01-{:02}", i + 1),
                open: 10.0 + i as f64 * 0.1,
                close: 10.05 + i as f64 * 0.1,
                high: 10.1 + i as f64 * 0.1,
                low: 9.95 + i as f64 * 0.1,
                volume: 1000.0,
                amount: 10000.0,
                amplitude: 1.5,
                change_pct: 1.0,
                change_amount: 0.1,
                turnover_rate: 2.0,
            })
            .collect();

        let ind = compute_indicators(&klines);
        assert_eq!(ind.len(), 70);
        assert!(ind.ma60[58].is_none());
        assert!(ind.ma60[59].is_some());
        assert!(ind.kdj_k[69].is_some());
        assert!(ind.boll_mid[69].is_some());
        assert!(ind.rsi24[69].is_some());
    }
}
