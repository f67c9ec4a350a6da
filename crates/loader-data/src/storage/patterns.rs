//! 패턴 감지 결과 저장소 (`pattern_detections`).

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use loader_core::{PatternDetection, Timeframe};

use crate::error::{DataError, Result};

#[derive(Clone)]
pub struct PatternRepository {
    pool: PgPool,
}

impl PatternRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 한 종목/타임프레임/감지일의 결과를 교체합니다.
    ///
    /// 삭제와 삽입은 같은 트랜잭션에서 실행되므로 중간 실패 시 기존 결과가 유지됩니다.
    #[instrument(skip(self, patterns), fields(count = patterns.len()))]
    pub async fn replace_for(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        detected_on: NaiveDate,
        patterns: &[PatternDetection],
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM pattern_detections WHERE symbol = $1 AND timeframe = $2 AND detected_on = $3",
        )
        .bind(symbol)
        .bind(timeframe.table_suffix())
        .bind(detected_on)
        .execute(&mut *tx)
        .await?;

        let mut inserted = 0;
        for p in patterns {
            let result = sqlx::query(
                r#"
                INSERT INTO pattern_detections (
                    id, symbol, timeframe, detected_on, pattern_type, direction, confidence,
                    start_date, end_date, price_target, details, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
                ON CONFLICT (symbol, timeframe, detected_on, pattern_type, start_date) DO UPDATE SET
                    direction = EXCLUDED.direction,
                    confidence = EXCLUDED.confidence,
                    end_date = EXCLUDED.end_date,
                    price_target = EXCLUDED.price_target,
                    details = EXCLUDED.details
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&p.symbol)
            .bind(p.timeframe.table_suffix())
            .bind(p.detected_on)
            .bind(&p.pattern_type)
            .bind(p.direction.as_str())
            .bind(p.confidence)
            .bind(p.start_date)
            .bind(p.end_date)
            .bind(p.price_target.filter(|v| v.is_finite()))
            .bind(&p.details)
            .execute(&mut *tx)
            .await
            .map_err(|e| DataError::InsertError(format!("pattern_detections: {}", e)))?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
