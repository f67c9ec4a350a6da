//! 가격 바 저장소 (`price_daily`, `price_weekly`, `price_monthly`).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

use loader_core::{PriceBar, Timeframe};

use super::{price_table, DEFAULT_BATCH_SIZE};
use crate::error::{DataError, Result};

#[derive(Debug, FromRow)]
struct PriceRecord {
    symbol: String,
    date: NaiveDate,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    adj_close: Option<Decimal>,
    volume: i64,
}

impl PriceRecord {
    fn into_bar(self, timeframe: Timeframe) -> PriceBar {
        PriceBar {
            symbol: self.symbol,
            timeframe,
            date: self.date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            adj_close: self.adj_close,
            volume: self.volume,
        }
    }
}

/// 가격 바 저장소.
#[derive(Clone)]
pub struct PriceRepository {
    pool: PgPool,
    batch_size: usize,
}

impl PriceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// 바를 일괄 upsert합니다.
    ///
    /// UNNEST로 배치당 한 번의 쿼리를 실행하며, 같은 `(symbol, date)`는 새 값으로 덮어씁니다.
    #[instrument(skip(self, bars), fields(count = bars.len()))]
    pub async fn upsert_bars(&self, timeframe: Timeframe, bars: &[PriceBar], source: &str) -> Result<u64> {
        if bars.is_empty() {
            return Ok(0);
        }

        let table = price_table(timeframe);
        let sql = format!(
            r#"
            INSERT INTO {table}
                (symbol, date, open, high, low, close, adj_close, volume, source, fetched_at)
            SELECT u.symbol, u.date, u.open, u.high, u.low, u.close, u.adj_close, u.volume, $9, NOW()
            FROM UNNEST(
                $1::text[], $2::date[], $3::numeric[], $4::numeric[],
                $5::numeric[], $6::numeric[], $7::numeric[], $8::bigint[]
            ) AS u(symbol, date, open, high, low, close, adj_close, volume)
            ON CONFLICT (symbol, date) DO UPDATE SET
                open = EXCLUDED.open,
                high = EXCLUDED.high,
                low = EXCLUDED.low,
                close = EXCLUDED.close,
                adj_close = EXCLUDED.adj_close,
                volume = EXCLUDED.volume,
                source = EXCLUDED.source,
                fetched_at = NOW()
            "#
        );

        let mut affected = 0;
        for chunk in bars.chunks(self.batch_size) {
            let symbols: Vec<&str> = chunk.iter().map(|b| b.symbol.as_str()).collect();
            let dates: Vec<NaiveDate> = chunk.iter().map(|b| b.date).collect();
            let opens: Vec<Decimal> = chunk.iter().map(|b| b.open).collect();
            let highs: Vec<Decimal> = chunk.iter().map(|b| b.high).collect();
            let lows: Vec<Decimal> = chunk.iter().map(|b| b.low).collect();
            let closes: Vec<Decimal> = chunk.iter().map(|b| b.close).collect();
            let adj_closes: Vec<Option<Decimal>> = chunk.iter().map(|b| b.adj_close).collect();
            let volumes: Vec<i64> = chunk.iter().map(|b| b.volume).collect();

            let result = sqlx::query(&sql)
                .bind(&symbols)
                .bind(&dates)
                .bind(&opens)
                .bind(&highs)
                .bind(&lows)
                .bind(&closes)
                .bind(&adj_closes)
                .bind(&volumes)
                .bind(source)
                .execute(&self.pool)
                .await
                .map_err(|e| DataError::InsertError(format!("{}: {}", table, e)))?;

            affected += result.rows_affected();
        }

        debug!(table = table, affected = affected, "가격 바 저장 완료");
        Ok(affected)
    }

    /// 저장된 마지막 바 날짜.
    pub async fn last_date(&self, symbol: &str, timeframe: Timeframe) -> Result<Option<NaiveDate>> {
        let sql = format!("SELECT MAX(date) FROM {} WHERE symbol = $1", price_table(timeframe));
        let (date,): (Option<NaiveDate>,) = sqlx::query_as(&sql)
            .bind(symbol)
            .fetch_one(&self.pool)
            .await?;
        Ok(date)
    }

    /// 최근 `limit`개 바를 날짜 오름차순으로 반환합니다.
    pub async fn recent_bars(&self, symbol: &str, timeframe: Timeframe, limit: i64) -> Result<Vec<PriceBar>> {
        let sql = format!(
            r#"
            SELECT * FROM (
                SELECT symbol, date, open, high, low, close, adj_close, volume
                FROM {}
                WHERE symbol = $1
                ORDER BY date DESC
                LIMIT $2
            ) recent
            ORDER BY date ASC
            "#,
            price_table(timeframe)
        );
        let records: Vec<PriceRecord> = sqlx::query_as(&sql)
            .bind(symbol)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(records.into_iter().map(|r| r.into_bar(timeframe)).collect())
    }
}
