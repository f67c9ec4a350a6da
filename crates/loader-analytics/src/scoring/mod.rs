//! 팩터 스코어링.
//!
//! 종목별 최신 지표 묶음([`MetricsSnapshot`])을 받아 팩터 점수와 종합 점수
//! (0~100)를 계산합니다.
//!
//! - [`ZScoreScorer`]: 전체 유니버스 기준 윈저라이징 → z-score → 정규분포 CDF
//! - [`SectorScorer`]: 섹터 내 백분위 (작은 섹터는 전체 유니버스로 대체)

pub mod factors;
pub mod sector;
pub mod zscore;

use chrono::NaiveDate;
use loader_core::{FactorWeights, MetricKind, MetricsSnapshot, ScoreMethod, ScoringConfig, StockScore};
use thiserror::Error;

pub use factors::{factor_metrics, Direction, MetricDef};
pub use sector::SectorScorer;
pub use zscore::ZScoreScorer;

/// 스코어링 오류.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// 가중치가 음수이거나 합계가 0
    #[error("잘못된 팩터 가중치: {0}")]
    InvalidWeights(String),

    /// 잘못된 설정값
    #[error("잘못된 스코어링 설정: {0}")]
    InvalidConfig(String),
}

pub type ScoringResult<T> = Result<T, ScoringError>;

/// 점수 산출기.
pub trait FactorScorer: Send + Sync {
    /// 저장 시 사용하는 산출 방식.
    fn method(&self) -> ScoreMethod;

    /// 유니버스 전체를 한 번에 점수화합니다.
    ///
    /// 사용 가능한 팩터가 최소 개수에 못 미치는 종목은 결과에서 빠집니다.
    fn score(&self, snapshots: &[MetricsSnapshot], date: NaiveDate) -> Vec<StockScore>;
}

/// 산출 방식에 맞는 스코어러를 생성합니다.
pub fn scorer_for(method: ScoreMethod, config: &ScoringConfig) -> ScoringResult<Box<dyn FactorScorer>> {
    Ok(match method {
        ScoreMethod::ZScore => Box::new(ZScoreScorer::new(config.clone())?),
        ScoreMethod::Sector => Box::new(SectorScorer::new(config.clone())?),
    })
}

/// 가중치를 검증합니다.
pub fn validate_weights(weights: &FactorWeights) -> ScoringResult<()> {
    for kind in MetricKind::ALL {
        let w = weight_of(weights, kind);
        if !w.is_finite() || w < 0.0 {
            return Err(ScoringError::InvalidWeights(format!("{} = {}", kind, w)));
        }
    }
    if weights.total() <= 0.0 {
        return Err(ScoringError::InvalidWeights("가중치 합계가 0입니다".to_string()));
    }
    Ok(())
}

fn validate_config(config: &ScoringConfig) -> ScoringResult<()> {
    validate_weights(&config.weights)?;
    let (lo, hi) = (config.winsor_lower, config.winsor_upper);
    if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo >= hi {
        return Err(ScoringError::InvalidConfig(format!(
            "윈저라이징 구간 {}~{}",
            lo, hi
        )));
    }
    if config.min_factors == 0 || config.min_factors > MetricKind::ALL.len() {
        return Err(ScoringError::InvalidConfig(format!(
            "min_factors = {}",
            config.min_factors
        )));
    }
    Ok(())
}

pub fn weight_of(weights: &FactorWeights, kind: MetricKind) -> f64 {
    match kind {
        MetricKind::Quality => weights.quality,
        MetricKind::Growth => weights.growth,
        MetricKind::Value => weights.value,
        MetricKind::Momentum => weights.momentum,
        MetricKind::Stability => weights.stability,
        MetricKind::Positioning => weights.positioning,
    }
}

/// `MetricKind::ALL` 순서의 팩터 값.
pub(crate) type FactorValues = [Option<f64>; 6];

/// 사용 가능한 팩터의 가중 평균과 팩터 수.
///
/// 팩터 수가 `min_factors` 미만이거나 사용 가능한 팩터의 가중치 합이 0이면 `None`.
pub(crate) fn weighted_composite(
    factors: &FactorValues,
    weights: &FactorWeights,
    min_factors: usize,
) -> Option<(f64, usize)> {
    let available: Vec<(f64, f64)> = MetricKind::ALL
        .iter()
        .zip(factors)
        .filter_map(|(kind, f)| f.filter(|v| v.is_finite()).map(|v| (v, weight_of(weights, *kind))))
        .collect();

    if available.len() < min_factors {
        return None;
    }
    let total_weight: f64 = available.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return None;
    }
    let composite = available.iter().map(|(v, w)| v * w).sum::<f64>() / total_weight;
    Some((composite, available.len()))
}

pub(crate) fn build_score(
    snapshot: &MetricsSnapshot,
    date: NaiveDate,
    method: ScoreMethod,
    factors: &FactorValues,
    composite: f64,
    factor_count: usize,
) -> StockScore {
    let factor = |kind: MetricKind| {
        MetricKind::ALL
            .iter()
            .position(|k| *k == kind)
            .and_then(|i| factors[i])
    };
    StockScore {
        symbol: snapshot.symbol.clone(),
        date,
        method,
        sector: snapshot.sector.clone(),
        composite_score: composite.clamp(0.0, 100.0),
        quality_score: factor(MetricKind::Quality),
        growth_score: factor(MetricKind::Growth),
        value_score: factor(MetricKind::Value),
        momentum_score: factor(MetricKind::Momentum),
        stability_score: factor(MetricKind::Stability),
        positioning_score: factor(MetricKind::Positioning),
        factor_count: factor_count as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_weights() {
        assert!(validate_weights(&FactorWeights::default()).is_ok());

        let negative = FactorWeights {
            value: -0.1,
            ..FactorWeights::default()
        };
        assert!(matches!(
            validate_weights(&negative),
            Err(ScoringError::InvalidWeights(_))
        ));

        let zero = FactorWeights {
            quality: 0.0,
            growth: 0.0,
            value: 0.0,
            momentum: 0.0,
            stability: 0.0,
            positioning: 0.0,
        };
        assert!(validate_weights(&zero).is_err());
    }

    #[test]
    fn test_weighted_composite_skips_missing_factors() {
        let weights = FactorWeights::default();
        // growth, value, momentum만 있음 (각 0.2)
        let factors = [Some(10.0), None, Some(20.0), Some(30.0), None, None];
        let (composite, count) = weighted_composite(&factors, &weights, 3).unwrap();
        assert_eq!(count, 3);
        assert!((composite - 20.0).abs() < 1e-12);

        assert!(weighted_composite(&factors, &weights, 4).is_none());
    }

    #[test]
    fn test_invalid_winsor_bounds() {
        let config = ScoringConfig {
            winsor_lower: 0.9,
            winsor_upper: 0.1,
            ..ScoringConfig::default()
        };
        assert!(ZScoreScorer::new(config).is_err());
    }
}
