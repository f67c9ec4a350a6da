//! 종합 점수 저장소 (`stock_scores`).

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;

use loader_core::StockScore;

use super::DEFAULT_BATCH_SIZE;
use crate::error::{DataError, Result};

#[derive(Clone)]
pub struct ScoreRepository {
    pool: PgPool,
}

impl ScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 점수를 `(symbol, date, method)` 키로 upsert합니다.
    #[instrument(skip(self, scores), fields(count = scores.len()))]
    pub async fn upsert_scores(&self, scores: &[StockScore]) -> Result<u64> {
        let mut affected = 0;

        for chunk in scores.chunks(DEFAULT_BATCH_SIZE) {
            let symbols: Vec<&str> = chunk.iter().map(|s| s.symbol.as_str()).collect();
            let dates: Vec<NaiveDate> = chunk.iter().map(|s| s.date).collect();
            let methods: Vec<&str> = chunk.iter().map(|s| s.method.as_str()).collect();
            let sectors: Vec<Option<&str>> = chunk.iter().map(|s| s.sector.as_deref()).collect();
            let composite: Vec<f64> = chunk.iter().map(|s| s.composite_score).collect();
            let quality: Vec<Option<f64>> = chunk.iter().map(|s| s.quality_score).collect();
            let growth: Vec<Option<f64>> = chunk.iter().map(|s| s.growth_score).collect();
            let value: Vec<Option<f64>> = chunk.iter().map(|s| s.value_score).collect();
            let momentum: Vec<Option<f64>> = chunk.iter().map(|s| s.momentum_score).collect();
            let stability: Vec<Option<f64>> = chunk.iter().map(|s| s.stability_score).collect();
            let positioning: Vec<Option<f64>> = chunk.iter().map(|s| s.positioning_score).collect();
            let factor_counts: Vec<i32> = chunk.iter().map(|s| s.factor_count).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO stock_scores (
                    symbol, date, method, sector, composite_score, quality_score, growth_score,
                    value_score, momentum_score, stability_score, positioning_score, factor_count,
                    updated_at
                )
                SELECT u.*, NOW()
                FROM UNNEST(
                    $1::text[], $2::date[], $3::text[], $4::text[], $5::float8[], $6::float8[],
                    $7::float8[], $8::float8[], $9::float8[], $10::float8[], $11::float8[], $12::int4[]
                ) AS u(symbol, date, method, sector, composite_score, quality_score, growth_score,
                       value_score, momentum_score, stability_score, positioning_score, factor_count)
                ON CONFLICT (symbol, date, method) DO UPDATE SET
                    sector = EXCLUDED.sector,
                    composite_score = EXCLUDED.composite_score,
                    quality_score = EXCLUDED.quality_score,
                    growth_score = EXCLUDED.growth_score,
                    value_score = EXCLUDED.value_score,
                    momentum_score = EXCLUDED.momentum_score,
                    stability_score = EXCLUDED.stability_score,
                    positioning_score = EXCLUDED.positioning_score,
                    factor_count = EXCLUDED.factor_count,
                    updated_at = NOW()
                "#,
            )
            .bind(&symbols)
            .bind(&dates)
            .bind(&methods)
            .bind(&sectors)
            .bind(&composite)
            .bind(&quality)
            .bind(&growth)
            .bind(&value)
            .bind(&momentum)
            .bind(&stability)
            .bind(&positioning)
            .bind(&factor_counts)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(format!("stock_scores: {}", e)))?;

            affected += result.rows_affected();
        }

        Ok(affected)
    }
}
