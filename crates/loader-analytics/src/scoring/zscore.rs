//! 유니버스 z-score 스코어러.

use chrono::NaiveDate;
use loader_core::{MetricKind, MetricsSnapshot, ScoreMethod, ScoringConfig, StockScore};

use super::factors::{factor_metrics, Direction};
use super::{build_score, validate_config, weighted_composite, FactorScorer, FactorValues, ScoringResult};
use crate::stats::{clip_zscores, mean, norm_cdf, winsorize, zscore};

/// 전체 유니버스 기준 z-score 스코어러.
///
/// 지표마다 윈저라이징 → z-score → ±clip → 방향 보정을 거친 뒤, 팩터 z는
/// 구성 지표 z의 평균, 종합 z는 팩터 z의 가중 평균입니다. 각 z는
/// `norm_cdf(z) × 100`으로 0~100에 매핑됩니다.
#[derive(Debug, Clone)]
pub struct ZScoreScorer {
    config: ScoringConfig,
}

impl ZScoreScorer {
    pub fn new(config: ScoringConfig) -> ScoringResult<Self> {
        validate_config(&config)?;
        Ok(Self { config })
    }

    /// 종목 × 팩터의 z 값 (결측은 `None`).
    pub fn factor_zscores(&self, snapshots: &[MetricsSnapshot]) -> Vec<FactorValues> {
        let mut table: Vec<FactorValues> = vec![[None; 6]; snapshots.len()];

        for (f, kind) in MetricKind::ALL.iter().enumerate() {
            let metric_z: Vec<Vec<f64>> = factor_metrics(*kind)
                .iter()
                .map(|def| {
                    let raw = def.values(snapshots);
                    let clipped = winsorize(&raw, self.config.winsor_lower, self.config.winsor_upper);
                    let z = clip_zscores(&zscore(&clipped), self.config.z_clip);
                    match def.direction {
                        Direction::HigherIsBetter => z,
                        Direction::LowerIsBetter => z.iter().map(|v| -v).collect(),
                    }
                })
                .collect();

            for (i, row) in table.iter_mut().enumerate() {
                let per_symbol: Vec<f64> = metric_z.iter().map(|z| z[i]).collect();
                row[f] = mean(&per_symbol);
            }
        }

        table
    }
}

impl FactorScorer for ZScoreScorer {
    fn method(&self) -> ScoreMethod {
        ScoreMethod::ZScore
    }

    fn score(&self, snapshots: &[MetricsSnapshot], date: NaiveDate) -> Vec<StockScore> {
        let table = self.factor_zscores(snapshots);

        let scores: Vec<StockScore> = snapshots
            .iter()
            .zip(&table)
            .filter_map(|(snapshot, factors)| {
                let (composite_z, count) =
                    weighted_composite(factors, &self.config.weights, self.config.min_factors)?;
                let as_score = factors.map(|z| z.map(|z| norm_cdf(z) * 100.0));
                Some(build_score(
                    snapshot,
                    date,
                    ScoreMethod::ZScore,
                    &as_score,
                    norm_cdf(composite_z) * 100.0,
                    count,
                ))
            })
            .collect();

        tracing::debug!(
            universe = snapshots.len(),
            scored = scores.len(),
            "z-score 점수 계산 완료"
        );
        scores
    }
}
