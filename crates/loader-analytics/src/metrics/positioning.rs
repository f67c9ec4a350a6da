//! 수급 / 보유 구조 지표.

use loader_core::PositioningMetrics;

use super::{finite, MetricInput};
use crate::indicators::ObvIndicator;
use crate::stats::{linear_slope, mean};

/// 단기 거래량 창.
const SHORT_WINDOW: usize = 20;
/// 장기 거래량 창.
const LONG_WINDOW: usize = 60;

pub struct PositioningCalculator;

impl PositioningCalculator {
    pub fn calculate(input: &MetricInput<'_>) -> PositioningMetrics {
        let mut row = PositioningMetrics::new(input.symbol, input.as_of);

        if let Some(stats) = input.key_stats {
            row.institutional_ownership = finite(stats.held_percent_institutions);
            row.insider_ownership = finite(stats.held_percent_insiders);
            row.short_percent_float = finite(stats.short_percent_of_float);
            row.short_ratio = finite(stats.short_ratio);
        }

        let volume = &input.prices.volume;
        let close = &input.prices.close;
        let n = volume.len();

        if n >= LONG_WINDOW {
            let short = mean(&volume[n - SHORT_WINDOW..]);
            let long = mean(&volume[n - LONG_WINDOW..]);
            row.relative_volume = match (short, long) {
                (Some(s), Some(l)) if l > 0.0 => Some(s / l),
                _ => None,
            };
        }

        if n > SHORT_WINDOW {
            row.obv_slope = ObvIndicator::new()
                .calculate(close, volume)
                .ok()
                .and_then(|obv| {
                    let slope = linear_slope(&obv[n - SHORT_WINDOW..])?;
                    let avg_volume = mean(&volume[n - SHORT_WINDOW..])?;
                    (avg_volume > 0.0).then(|| slope / avg_volume)
                });
        }

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{input, series};
    use loader_core::KeyStatistics;

    #[test]
    fn test_ownership_from_key_statistics() {
        let prices = series(0, 1.0, 0.0);
        let mut stats = KeyStatistics::new("TEST");
        stats.held_percent_institutions = Some(0.62);
        stats.short_ratio = Some(f64::NAN);
        let row = PositioningCalculator::calculate(&input(&[], Some(&stats), &prices, None));

        assert_eq!(row.institutional_ownership, Some(0.62));
        assert_eq!(row.short_ratio, None);
        assert_eq!(row.relative_volume, None);
    }

    #[test]
    fn test_relative_volume_and_obv_slope() {
        let mut prices = series(60, 100.0, 0.002);
        for v in prices.volume[40..].iter_mut() {
            *v = 2_000.0;
        }
        let row = PositioningCalculator::calculate(&input(&[], None, &prices, None));

        // 최근 20일 2000, 60일 평균 (40×1000 + 20×2000)/60
        let expected = 2000.0 / (80_000.0 / 60.0);
        assert!((row.relative_volume.unwrap() - expected).abs() < 1e-12);
        // 매일 상승 → OBV가 하루 2000씩 증가, 평균 거래량 2000으로 정규화
        assert!((row.obv_slope.unwrap() - 1.0).abs() < 1e-9);
    }
}
