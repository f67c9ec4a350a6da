//! 거시경제 데이터 저장소 (`economic_series`, `economic_data`).

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;

use loader_core::{EconomicSeries, MacroObservation};

use super::DEFAULT_BATCH_SIZE;
use crate::error::{DataError, Result};

#[derive(Clone)]
pub struct MacroRepository {
    pool: PgPool,
}

impl MacroRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_series(&self, series: &EconomicSeries) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO economic_series (series_id, title, frequency, units, seasonal_adjustment, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (series_id) DO UPDATE SET
                title = EXCLUDED.title,
                frequency = EXCLUDED.frequency,
                units = EXCLUDED.units,
                seasonal_adjustment = EXCLUDED.seasonal_adjustment,
                updated_at = NOW()
            "#,
        )
        .bind(&series.series_id)
        .bind(&series.title)
        .bind(&series.frequency)
        .bind(&series.units)
        .bind(&series.seasonal_adjustment)
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::InsertError(format!("economic_series: {}", e)))?;
        Ok(())
    }

    /// 관측치를 `(series_id, date)` 키로 upsert합니다. 결측값은 NULL로 저장됩니다.
    #[instrument(skip(self, observations), fields(count = observations.len()))]
    pub async fn upsert_observations(&self, observations: &[MacroObservation]) -> Result<u64> {
        let mut affected = 0;

        for chunk in observations.chunks(DEFAULT_BATCH_SIZE) {
            let ids: Vec<&str> = chunk.iter().map(|o| o.series_id.as_str()).collect();
            let dates: Vec<NaiveDate> = chunk.iter().map(|o| o.date).collect();
            let values: Vec<Option<f64>> = chunk.iter().map(|o| o.value).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO economic_data (series_id, date, value, updated_at)
                SELECT u.*, NOW()
                FROM UNNEST($1::text[], $2::date[], $3::float8[]) AS u(series_id, date, value)
                ON CONFLICT (series_id, date) DO UPDATE SET
                    value = EXCLUDED.value,
                    updated_at = NOW()
                "#,
            )
            .bind(&ids)
            .bind(&dates)
            .bind(&values)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(format!("economic_data: {}", e)))?;

            affected += result.rows_affected();
        }

        Ok(affected)
    }

    /// 시리즈의 마지막 관측일.
    pub async fn last_date(&self, series_id: &str) -> Result<Option<NaiveDate>> {
        let (date,): (Option<NaiveDate>,) =
            sqlx::query_as("SELECT MAX(date) FROM economic_data WHERE series_id = $1")
                .bind(series_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(date)
    }
}
