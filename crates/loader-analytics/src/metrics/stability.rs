//! 변동성 / 안정성 지표.

use std::collections::HashMap;

use chrono::NaiveDate;
use loader_core::{PriceSeries, StabilityMetrics};

use super::{MetricInput, TRADING_DAYS_PER_YEAR};
use crate::stats::{
    annualized_volatility, beta, downside_deviation, max_drawdown, mean, returns, std_dev,
};

/// 이익 변동계수 계산에 필요한 최소 회계연도 수.
const MIN_EARNINGS_YEARS: usize = 3;

pub struct StabilityCalculator;

impl StabilityCalculator {
    pub fn calculate(input: &MetricInput<'_>) -> StabilityMetrics {
        let mut row = StabilityMetrics::new(input.symbol, input.as_of);
        let ppy = TRADING_DAYS_PER_YEAR as f64;

        let closes = last_year(&input.prices.adj_close);
        let rets = returns(closes);
        row.volatility_1y = annualized_volatility(&rets, ppy);
        row.downside_deviation = downside_deviation(&rets, ppy);
        row.max_drawdown_1y = max_drawdown(closes);

        if let Some(benchmark) = input.benchmark {
            let (asset, bench) = aligned_closes(input.prices, benchmark);
            row.beta = beta(&returns(last_year(&asset)), &returns(last_year(&bench)));
        }

        let earnings: Vec<f64> = input
            .sorted_statements()
            .iter()
            .filter_map(|s| s.net_income)
            .collect();
        if earnings.len() >= MIN_EARNINGS_YEARS {
            row.earnings_variability = match (std_dev(&earnings, 1), mean(&earnings)) {
                (Some(sd), Some(m)) if m != 0.0 => Some(sd / m.abs()),
                _ => None,
            };
        }

        row
    }
}

/// 최근 1년 + 1봉 (수익률 252개).
fn last_year(closes: &[f64]) -> &[f64] {
    &closes[closes.len().saturating_sub(TRADING_DAYS_PER_YEAR + 1)..]
}

/// 두 시계열에 모두 있는 날짜의 종가만 날짜순으로 맞춥니다.
fn aligned_closes(asset: &PriceSeries, benchmark: &PriceSeries) -> (Vec<f64>, Vec<f64>) {
    let bench_by_date: HashMap<NaiveDate, f64> = benchmark
        .dates
        .iter()
        .copied()
        .zip(benchmark.adj_close.iter().copied())
        .collect();

    asset
        .dates
        .iter()
        .zip(&asset.adj_close)
        .filter_map(|(date, a)| bench_by_date.get(date).map(|b| (*a, *b)))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{input, series, statements};

    /// 벤치마크의 일간 수익률을 `k`배 한 시계열.
    fn levered(bench: &PriceSeries, k: f64) -> PriceSeries {
        let mut out = bench.clone();
        let mut price = 100.0;
        out.adj_close = vec![price];
        for w in bench.adj_close.windows(2) {
            price *= 1.0 + k * (w[1] / w[0] - 1.0);
            out.adj_close.push(price);
        }
        out.close = out.adj_close.clone();
        out
    }

    fn wavy(len: usize) -> PriceSeries {
        let mut s = series(len, 100.0, 0.0);
        s.adj_close = (0..len).map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0).collect();
        s.close = s.adj_close.clone();
        s
    }

    #[test]
    fn test_beta_against_levered_benchmark() {
        let bench = wavy(300);
        let asset = levered(&bench, 2.0);
        let row = StabilityCalculator::calculate(&input(&[], None, &asset, Some(&bench)));

        assert!((row.beta.unwrap() - 2.0).abs() < 1e-9);
        assert!(row.volatility_1y.unwrap() > 0.0);
        assert!(row.max_drawdown_1y.unwrap() < 0.0);
        assert!(row.downside_deviation.unwrap() > 0.0);
    }

    #[test]
    fn test_beta_uses_shared_dates_only() {
        let bench = wavy(100);
        let mut asset = levered(&bench, 1.5);
        // 벤치마크에 없는 날짜를 섞음
        asset.dates[10] = asset.dates[10] + chrono::Duration::days(1000);
        let row = StabilityCalculator::calculate(&input(&[], None, &asset, Some(&bench)));
        assert!(row.beta.is_some());
    }

    #[test]
    fn test_monotonic_rise_has_no_drawdown() {
        let prices = series(300, 100.0, 0.001);
        let row = StabilityCalculator::calculate(&input(&[], None, &prices, None));

        assert_eq!(row.max_drawdown_1y, Some(0.0));
        assert_eq!(row.downside_deviation, Some(0.0));
        assert_eq!(row.beta, None);
    }

    #[test]
    fn test_earnings_variability() {
        let stmts = statements("TEST");
        let prices = series(0, 1.0, 0.0);
        let row = StabilityCalculator::calculate(&input(&stmts, None, &prices, None));

        let ni: Vec<f64> = stmts.iter().map(|s| s.net_income.unwrap()).collect();
        let expected = std_dev(&ni, 1).unwrap() / mean(&ni).unwrap();
        assert!((row.earnings_variability.unwrap() - expected).abs() < 1e-12);
        assert_eq!(row.volatility_1y, None);
    }
}
