//! 섹터 상대 백분위 스코어러.

use std::collections::HashMap;

use chrono::NaiveDate;
use loader_core::{MetricKind, MetricsSnapshot, ScoreMethod, ScoringConfig, StockScore};

use super::factors::{factor_metrics, Direction, MetricDef};
use super::{build_score, validate_config, weighted_composite, FactorScorer, FactorValues, ScoringResult};
use crate::stats::{mean, percentile_rank};

/// 섹터 내 백분위 스코어러.
///
/// 종목 수가 `min_sector_size` 미만인 섹터와 섹터 정보가 없는 종목은 전체
/// 유니버스를 비교 집단으로 사용합니다.
#[derive(Debug, Clone)]
pub struct SectorScorer {
    config: ScoringConfig,
}

impl SectorScorer {
    pub fn new(config: ScoringConfig) -> ScoringResult<Self> {
        validate_config(&config)?;
        Ok(Self { config })
    }

    /// 비교 집단별 종목 인덱스. 작은 섹터는 유니버스 집단으로 합쳐집니다.
    pub fn peer_groups(&self, snapshots: &[MetricsSnapshot]) -> Vec<Vec<usize>> {
        let mut by_sector: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, s) in snapshots.iter().enumerate() {
            if let Some(sector) = s.sector.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                by_sector.entry(sector).or_default().push(i);
            }
        }

        let mut groups: Vec<Vec<usize>> = by_sector
            .into_values()
            .filter(|members| members.len() >= self.config.min_sector_size)
            .collect();
        groups.sort();
        groups
    }

    /// 종목 × 팩터의 백분위 점수 (0~100).
    pub fn factor_percentiles(&self, snapshots: &[MetricsSnapshot]) -> Vec<FactorValues> {
        let n = snapshots.len();
        let groups = self.peer_groups(snapshots);

        // 섹터 집단에 속하지 않은 종목은 유니버스 순위를 사용
        let mut in_sector = vec![false; n];
        for &i in groups.iter().flatten() {
            in_sector[i] = true;
        }
        let universe: Vec<usize> = (0..n).collect();

        let mut table: Vec<FactorValues> = vec![[None; 6]; n];
        for (f, kind) in MetricKind::ALL.iter().enumerate() {
            let defs = factor_metrics(*kind);
            // 지표별 종목 백분위
            let mut metric_pct: Vec<Vec<f64>> = vec![vec![f64::NAN; n]; defs.len()];

            for (m, def) in defs.iter().enumerate() {
                let values = def.values(snapshots);
                let universe_pct = group_percentiles(&values, &universe, def);
                for i in 0..n {
                    if !in_sector[i] {
                        metric_pct[m][i] = universe_pct[i];
                    }
                }
                for group in &groups {
                    let pct = group_percentiles(&values, group, def);
                    for &i in group {
                        metric_pct[m][i] = pct[i];
                    }
                }
            }

            for (i, row) in table.iter_mut().enumerate() {
                let per_symbol: Vec<f64> = metric_pct.iter().map(|p| p[i]).collect();
                row[f] = mean(&per_symbol);
            }
        }

        table
    }
}

/// 집단 내 백분위 × 100. 결과는 전체 길이이며 집단 밖은 NaN입니다.
fn group_percentiles(values: &[f64], members: &[usize], def: &MetricDef) -> Vec<f64> {
    let group_values: Vec<f64> = members.iter().map(|&i| values[i]).collect();
    let ranks = percentile_rank(&group_values);
    let count = group_values.iter().filter(|v| v.is_finite()).count() as f64;

    let mut out = vec![f64::NAN; values.len()];
    for (&i, &rank) in members.iter().zip(&ranks) {
        if !rank.is_finite() {
            continue;
        }
        let pct = match def.direction {
            Direction::HigherIsBetter => rank,
            Direction::LowerIsBetter => 1.0 - rank + 1.0 / count,
        };
        out[i] = pct * 100.0;
    }
    out
}

impl FactorScorer for SectorScorer {
    fn method(&self) -> ScoreMethod {
        ScoreMethod::Sector
    }

    fn score(&self, snapshots: &[MetricsSnapshot], date: NaiveDate) -> Vec<StockScore> {
        let table = self.factor_percentiles(snapshots);

        let scores: Vec<StockScore> = snapshots
            .iter()
            .zip(&table)
            .filter_map(|(snapshot, factors)| {
                let (composite, count) =
                    weighted_composite(factors, &self.config.weights, self.config.min_factors)?;
                Some(build_score(
                    snapshot,
                    date,
                    ScoreMethod::Sector,
                    factors,
                    composite,
                    count,
                ))
            })
            .collect();

        tracing::debug!(
            universe = snapshots.len(),
            scored = scores.len(),
            "섹터 백분위 점수 계산 완료"
        );
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loader_core::{GrowthMetrics, MomentumMetrics, QualityMetrics};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    fn snapshot(symbol: &str, sector: Option<&str>, x: f64) -> MetricsSnapshot {
        let mut s = MetricsSnapshot::new(symbol);
        s.sector = sector.map(str::to_string);
        let mut g = GrowthMetrics::new(symbol, date());
        g.revenue_growth_yoy = Some(x);
        let mut q = QualityMetrics::new(symbol, date());
        q.debt_to_equity = Some(10.0 - x);
        let mut m = MomentumMetrics::new(symbol, date());
        m.return_12m = Some(x);
        s.growth = Some(g);
        s.quality = Some(q);
        s.momentum = Some(m);
        s
    }

    #[test]
    fn test_ranks_within_sector() {
        let mut snapshots: Vec<MetricsSnapshot> = (1..=5)
            .map(|i| snapshot(&format!("T{i}"), Some("Technology"), i as f64))
            .collect();
        // 다른 섹터의 큰 값은 기술 섹터 순위에 영향을 주지 않음
        snapshots.extend((1..=5).map(|i| snapshot(&format!("E{i}"), Some("Energy"), 100.0 + i as f64)));

        let scorer = SectorScorer::new(ScoringConfig::default()).unwrap();
        let scores = scorer.score(&snapshots, date());
        assert_eq!(scores.len(), 10);

        let best_tech = scores.iter().find(|s| s.symbol == "T5").unwrap();
        let best_energy = scores.iter().find(|s| s.symbol == "E5").unwrap();
        assert!((best_tech.composite_score - 100.0).abs() < 1e-9);
        assert!((best_energy.composite_score - 100.0).abs() < 1e-9);

        // 역방향 지표: 부채비율이 가장 낮은 종목이 100
        assert!((best_tech.quality_score.unwrap() - 100.0).abs() < 1e-9);
        let worst_tech = scores.iter().find(|s| s.symbol == "T1").unwrap();
        assert!((worst_tech.quality_score.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_sector_falls_back_to_universe() {
        let mut snapshots: Vec<MetricsSnapshot> = (1..=6)
            .map(|i| snapshot(&format!("B{i}"), Some("Banks"), i as f64))
            .collect();
        snapshots.push(snapshot("U1", Some("Utilities"), 3.5));
        snapshots.push(snapshot("X1", None, 0.5));

        let scorer = SectorScorer::new(ScoringConfig::default()).unwrap();
        assert_eq!(scorer.peer_groups(&snapshots), vec![vec![0, 1, 2, 3, 4, 5]]);

        let scores = scorer.score(&snapshots, date());
        let utility = scores.iter().find(|s| s.symbol == "U1").unwrap();
        // 유니버스 8종목 중 5번째 → 62.5
        assert!((utility.growth_score.unwrap() - 62.5).abs() < 1e-9);
        let unknown = scores.iter().find(|s| s.symbol == "X1").unwrap();
        assert!((unknown.growth_score.unwrap() - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_percentiles_in_unit_range() {
        let snapshots: Vec<MetricsSnapshot> =
            (0..7).map(|i| snapshot(&format!("S{i}"), None, (i % 3) as f64)).collect();
        let scorer = SectorScorer::new(ScoringConfig::default()).unwrap();
        for row in scorer.factor_percentiles(&snapshots) {
            for v in row.iter().flatten() {
                assert!(*v > 0.0 && *v <= 100.0);
            }
        }
    }
}
