//! 기술지표 저장소 (`technical_data_*`).

use sqlx::PgPool;
use tracing::instrument;

use loader_core::{TechnicalRow, Timeframe};

use super::{technical_table, upsert_keyed_rows, KeyedRow, DEFAULT_BATCH_SIZE};
use crate::error::Result;

#[derive(Clone)]
pub struct TechnicalRepository {
    pool: PgPool,
}

impl TechnicalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn upsert_rows(&self, timeframe: Timeframe, rows: &[TechnicalRow]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let keyed: Vec<KeyedRow> = rows
            .iter()
            .map(|r| KeyedRow {
                symbol: r.symbol.clone(),
                date: r.date,
                values: r.values(),
            })
            .collect();

        upsert_keyed_rows(
            &self.pool,
            technical_table(timeframe),
            TechnicalRow::COLUMNS,
            &keyed,
            DEFAULT_BATCH_SIZE,
        )
        .await
    }
}
