//! 종합 점수 산출 모듈.
//!
//! 기준일의 최신 팩터 지표 스냅샷을 읽어 z-score 또는 섹터 백분위 방식으로
//! 0~100 종합 점수를 계산하고 `stock_scores`에 upsert합니다.

use std::time::Instant;

use chrono::Utc;
use loader_analytics::scorer_for;
use loader_core::{AppConfig, ScoreMethod};
use loader_data::{MetricsRepository, ScoreRepository};
use sqlx::PgPool;

use crate::{CollectionStats, Result};

/// 종합 점수를 계산합니다.
pub async fn calc_scores(
    pool: &PgPool,
    config: &AppConfig,
    method: ScoreMethod,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();
    let as_of = Utc::now().date_naive();

    let scorer = scorer_for(method, &config.scoring)?;

    let snapshots = MetricsRepository::new(pool.clone())
        .load_snapshot(as_of)
        .await?;
    stats.total = snapshots.len();
    if snapshots.is_empty() {
        tracing::warn!(method = %method, "점수를 계산할 종목이 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    tracing::info!(method = %method, universe = snapshots.len(), as_of = %as_of, "종합 점수 계산 시작");
    let scores = scorer.score(&snapshots, as_of);
    stats.success = scores.len();
    stats.skipped = snapshots.len() - scores.len();

    stats.rows = ScoreRepository::new(pool.clone())
        .upsert_scores(&scores)
        .await?;

    stats.elapsed = start.elapsed();
    Ok(stats)
}
