//! 봉별 기술적 지표 행 생성.

use loader_core::{PriceBar, PriceSeries, TechnicalRow};

use super::{
    BollingerBandsParams, EmaParams, MacdParams, MacdResult, MomentumCalculator, ObvIndicator,
    RocParams, RsiParams, SmaParams, TrendIndicators, VolatilityIndicators,
};
use super::{AtrParams, BollingerBandsResult};
use crate::patterns::pivots::{find_peaks, find_troughs};

/// 기술적 지표 스냅샷.
pub struct TechnicalSnapshot;

impl TechnicalSnapshot {
    /// 피벗 확정에 필요한 좌우 봉 수.
    pub const PIVOT_ORDER: usize = 5;

    /// 바마다 한 행을 만듭니다. 워밍업이 끝나지 않은 지표는 `None`입니다.
    ///
    /// 바는 한 종목의 날짜 오름차순이어야 합니다.
    pub fn compute(bars: &[PriceBar]) -> Vec<TechnicalRow> {
        let Some(first) = bars.first() else {
            return Vec::new();
        };
        let symbol = first.symbol.as_str();
        let series = PriceSeries::from_bars(bars);
        let n = series.len();
        let close = &series.close;

        let trend = TrendIndicators::new();
        let momentum = MomentumCalculator::new();
        let volatility = VolatilityIndicators::new();

        // 데이터가 부족한 지표는 전 구간 None
        let none = || vec![None; n];
        let sma = |period| trend.sma(close, SmaParams { period }).unwrap_or_else(|_| none());
        let ema = |period| trend.ema(close, EmaParams { period }).unwrap_or_else(|_| none());

        let sma_20 = sma(20);
        let sma_50 = sma(50);
        let sma_200 = sma(200);
        let ema_12 = ema(12);
        let ema_26 = ema(26);
        let macd = trend
            .macd(close, MacdParams::default())
            .unwrap_or_else(|_| vec![MacdResult::default(); n]);
        let rsi = momentum
            .rsi(close, RsiParams::default())
            .unwrap_or_else(|_| none());
        let roc = momentum
            .roc(close, RocParams::default())
            .unwrap_or_else(|_| none());
        let mom = momentum
            .momentum(close, RocParams::default())
            .unwrap_or_else(|_| none());
        let bb = volatility
            .bollinger_bands(close, BollingerBandsParams::default())
            .unwrap_or_else(|_| vec![BollingerBandsResult::default(); n]);
        let atr = volatility
            .atr(&series.high, &series.low, close, AtrParams::default())
            .unwrap_or_else(|_| none());
        let obv = ObvIndicator::new()
            .calculate(close, &series.volume)
            .unwrap_or_else(|_| vec![f64::NAN; n]);

        let mut pivot_high = vec![None; n];
        for i in find_peaks(&series.high, Self::PIVOT_ORDER, 0.0) {
            pivot_high[i] = Some(series.high[i]);
        }
        let mut pivot_low = vec![None; n];
        for i in find_troughs(&series.low, Self::PIVOT_ORDER, 0.0) {
            pivot_low[i] = Some(series.low[i]);
        }

        (0..n)
            .map(|i| {
                let mut row = TechnicalRow::new(symbol, series.dates[i]);
                row.rsi = rsi[i];
                row.macd = macd[i].macd;
                row.macd_signal = macd[i].signal;
                row.macd_hist = macd[i].histogram;
                row.sma_20 = sma_20[i];
                row.sma_50 = sma_50[i];
                row.sma_200 = sma_200[i];
                row.ema_12 = ema_12[i];
                row.ema_26 = ema_26[i];
                row.bb_upper = bb[i].upper;
                row.bb_middle = bb[i].middle;
                row.bb_lower = bb[i].lower;
                row.atr = atr[i];
                row.roc = roc[i];
                row.mom = mom[i];
                row.obv = obv[i].is_finite().then_some(obv[i]);
                row.pivot_high = pivot_high[i];
                row.pivot_low = pivot_low[i];
                row
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use loader_core::Timeframe;
    use rust_decimal::Decimal;

    fn bars(count: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.1;
                let d = |v: f64| Decimal::from_f64_retain(v).unwrap().round_dp(4);
                PriceBar::new(
                    "TEST",
                    Timeframe::D1,
                    start + Duration::days(i as i64),
                    d(close - 0.5),
                    d(close + 1.0),
                    d(close - 1.0),
                    d(close),
                    1_000 + i as i64,
                )
            })
            .collect()
    }

    #[test]
    fn test_one_row_per_bar_with_warmup() {
        let rows = TechnicalSnapshot::compute(&bars(60));
        assert_eq!(rows.len(), 60);
        assert!(rows[0].sma_20.is_none());
        assert!(rows[19].sma_20.is_some());
        assert!(rows[59].sma_50.is_some());
        // 200봉 미만이면 SMA200 없음
        assert!(rows.iter().all(|r| r.sma_200.is_none()));
        assert!(rows[59].macd_signal.is_some());
        assert!(rows[14].rsi.is_some());
        assert_eq!(rows[0].obv, Some(0.0));
    }

    #[test]
    fn test_pivots_marked() {
        let rows = TechnicalSnapshot::compute(&bars(120));
        assert!(rows.iter().any(|r| r.pivot_high.is_some()));
        assert!(rows.iter().any(|r| r.pivot_low.is_some()));
        // 마지막 PIVOT_ORDER 봉은 확정될 수 없음
        assert!(rows[115..].iter().all(|r| r.pivot_high.is_none()));
    }

    #[test]
    fn test_empty_input() {
        assert!(TechnicalSnapshot::compute(&[]).is_empty());
    }
}
