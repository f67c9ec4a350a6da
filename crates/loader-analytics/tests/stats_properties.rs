//! 통계 함수와 점수의 성질 테스트.

use chrono::NaiveDate;
use loader_analytics::stats::{percentile, percentile_rank, winsorize, zscore};
use loader_analytics::{FactorScorer, SectorScorer, ZScoreScorer};
use loader_core::{
    GrowthMetrics, MetricsSnapshot, MomentumMetrics, QualityMetrics, ScoringConfig, ValueMetrics,
};
use proptest::prelude::*;

fn finite_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6..1.0e6f64, 3..60)
}

proptest! {
    #[test]
    fn zscore_has_zero_mean_and_unit_std(values in finite_values()) {
        let spread = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
            - values.iter().cloned().fold(f64::INFINITY, f64::min);
        prop_assume!(spread > 1e-3);

        let z = zscore(&values);
        let n = z.len() as f64;
        let mean = z.iter().sum::<f64>() / n;
        let var = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        prop_assert!(mean.abs() < 1e-6);
        prop_assert!((var.sqrt() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zscore_of_constant_series_is_zero(x in -1.0e6..1.0e6f64, n in 2usize..40) {
        for z in zscore(&vec![x; n]) {
            prop_assert_eq!(z, 0.0);
        }
    }

    #[test]
    fn winsorized_values_stay_within_percentiles(
        values in finite_values(),
        lower in 0.0..0.2f64,
        upper in 0.8..1.0f64,
    ) {
        let lo = percentile(&values, lower).unwrap();
        let hi = percentile(&values, upper).unwrap();
        for v in winsorize(&values, lower, upper) {
            prop_assert!(v >= lo && v <= hi);
        }
    }

    #[test]
    fn percentile_ranks_lie_in_unit_interval(values in finite_values()) {
        for r in percentile_rank(&values) {
            prop_assert!(r > 0.0 && r <= 1.0);
        }
    }

    #[test]
    fn composite_scores_are_bounded(xs in prop::collection::vec(-50.0..50.0f64, 5..30)) {
        let snapshots: Vec<MetricsSnapshot> = xs
            .iter()
            .enumerate()
            .map(|(i, x)| snapshot(&format!("P{i}"), *x))
            .collect();

        for scorer in scorers() {
            for score in scorer.score(&snapshots, date()) {
                prop_assert!((0.0..=100.0).contains(&score.composite_score));
            }
        }
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

fn scorers() -> Vec<Box<dyn FactorScorer>> {
    vec![
        Box::new(ZScoreScorer::new(ScoringConfig::default()).unwrap()),
        Box::new(SectorScorer::new(ScoringConfig::default()).unwrap()),
    ]
}

fn snapshot(symbol: &str, x: f64) -> MetricsSnapshot {
    let mut s = MetricsSnapshot::new(symbol);
    s.sector = Some("Industrials".to_string());

    let mut g = GrowthMetrics::new(symbol, date());
    g.revenue_growth_yoy = Some(x / 100.0);
    let mut q = QualityMetrics::new(symbol, date());
    q.roe = Some(x / 50.0);
    let mut v = ValueMetrics::new(symbol, date());
    v.pe_ratio = Some(60.0 - x);
    let mut m = MomentumMetrics::new(symbol, date());
    m.return_12m = Some(x / 10.0);

    s.growth = Some(g);
    s.quality = Some(q);
    s.value = Some(v);
    s.momentum = Some(m);
    s
}

/// 한 종목의 입력만 개선하면 나머지가 같을 때 종합 점수가 내려가지 않음.
#[test]
fn composite_is_monotone_in_factor_input() {
    let base: Vec<MetricsSnapshot> = (0..12)
        .map(|i| snapshot(&format!("M{i}"), i as f64 * 3.0))
        .collect();

    for scorer in scorers() {
        let before = scorer.score(&base, date());

        let mut improved = base.clone();
        improved[4] = snapshot("M4", 20.0);
        let after = scorer.score(&improved, date());

        let find = |scores: &[loader_core::StockScore]| {
            scores.iter().find(|s| s.symbol == "M4").unwrap().composite_score
        };
        assert!(find(&after) >= find(&before), "{}", scorer.method());
    }
}
