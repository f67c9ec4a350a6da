//! 가격 모멘텀 지표.

use loader_core::MomentumMetrics;

use super::{MetricInput, TRADING_DAYS_PER_YEAR};
use crate::indicators::{MomentumCalculator, RsiParams, SmaParams, TrendIndicators};

/// 1개월 거래일 수.
const MONTH: usize = 21;

/// 일봉 수정 종가 기반 모멘텀 계산기.
pub struct PriceMomentumCalculator;

impl PriceMomentumCalculator {
    pub fn calculate(input: &MetricInput<'_>) -> MomentumMetrics {
        let mut row = MomentumMetrics::new(input.symbol, input.as_of);
        let closes = &input.prices.adj_close;
        let Some(&last) = closes.last() else {
            return row;
        };
        if !(last.is_finite() && last > 0.0) {
            return row;
        }

        row.return_1m = trailing_return(closes, MONTH);
        row.return_3m = trailing_return(closes, 3 * MONTH);
        row.return_6m = trailing_return(closes, 6 * MONTH);
        row.return_12m = trailing_return(closes, TRADING_DAYS_PER_YEAR);

        // 12개월 전 → 1개월 전
        let n = closes.len();
        if n > TRADING_DAYS_PER_YEAR {
            row.momentum_12_1 = ratio(closes[n - 1 - MONTH], closes[n - 1 - TRADING_DAYS_PER_YEAR]);
        }

        let year = &closes[n.saturating_sub(TRADING_DAYS_PER_YEAR)..];
        let high_52w = year
            .iter()
            .copied()
            .filter(|c| c.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        row.pct_from_52w_high = ratio(last, high_52w);

        let trend = TrendIndicators::new();
        let last_sma = |period: usize| {
            trend
                .sma(closes, SmaParams { period })
                .ok()
                .and_then(|v| v.last().copied().flatten())
        };
        row.price_vs_sma50 = last_sma(50).and_then(|sma| ratio(last, sma));
        row.price_vs_sma200 = last_sma(200).and_then(|sma| ratio(last, sma));

        row.rsi_14 = MomentumCalculator::new()
            .rsi(closes, RsiParams::default())
            .ok()
            .and_then(|v| v.last().copied().flatten());

        row
    }
}

/// `periods` 거래일 전 대비 수익률.
fn trailing_return(closes: &[f64], periods: usize) -> Option<f64> {
    let n = closes.len();
    if n <= periods {
        return None;
    }
    ratio(closes[n - 1], closes[n - 1 - periods])
}

/// `a / b - 1`.
fn ratio(a: f64, b: f64) -> Option<f64> {
    if !(a.is_finite() && b.is_finite()) || b <= 0.0 {
        return None;
    }
    Some(a / b - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{input, series};

    #[test]
    fn test_returns_on_steady_uptrend() {
        let prices = series(300, 100.0, 0.001);
        let row = PriceMomentumCalculator::calculate(&input(&[], None, &prices, None));

        let expected_1m = 1.001_f64.powi(21) - 1.0;
        assert!((row.return_1m.unwrap() - expected_1m).abs() < 1e-9);
        let expected_12m = 1.001_f64.powi(252) - 1.0;
        assert!((row.return_12m.unwrap() - expected_12m).abs() < 1e-9);
        let expected_12_1 = 1.001_f64.powi(231) - 1.0;
        assert!((row.momentum_12_1.unwrap() - expected_12_1).abs() < 1e-9);

        // 마지막 봉이 52주 최고가
        assert!(row.pct_from_52w_high.unwrap().abs() < 1e-12);
        assert!(row.price_vs_sma50.unwrap() > 0.0);
        assert!(row.price_vs_sma200.unwrap() > 0.0);
        assert_eq!(row.rsi_14, Some(100.0));
    }

    #[test]
    fn test_short_history() {
        let prices = series(30, 100.0, -0.01);
        let row = PriceMomentumCalculator::calculate(&input(&[], None, &prices, None));

        assert!(row.return_1m.unwrap() < 0.0);
        assert_eq!(row.return_3m, None);
        assert_eq!(row.momentum_12_1, None);
        assert_eq!(row.price_vs_sma50, None);
        assert!(row.pct_from_52w_high.unwrap() < 0.0);
        assert!(row.rsi_14.unwrap() < 1e-9);
    }

    #[test]
    fn test_empty_prices() {
        let prices = series(0, 100.0, 0.0);
        let row = PriceMomentumCalculator::calculate(&input(&[], None, &prices, None));
        assert_eq!(row.return_1m, None);
    }
}
