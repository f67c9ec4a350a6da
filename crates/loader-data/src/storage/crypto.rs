//! 암호화폐 저장소 (`crypto_markets`, `crypto_price_daily`).

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;

use loader_core::{CryptoMarket, CryptoPricePoint};

use super::DEFAULT_BATCH_SIZE;
use crate::error::{DataError, Result};

#[derive(Clone)]
pub struct CryptoRepository {
    pool: PgPool,
}

impl CryptoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, markets), fields(count = markets.len()))]
    pub async fn upsert_markets(&self, markets: &[CryptoMarket]) -> Result<u64> {
        let mut affected = 0;

        for chunk in markets.chunks(DEFAULT_BATCH_SIZE) {
            let ids: Vec<&str> = chunk.iter().map(|m| m.coin_id.as_str()).collect();
            let dates: Vec<NaiveDate> = chunk.iter().map(|m| m.date).collect();
            let symbols: Vec<&str> = chunk.iter().map(|m| m.symbol.as_str()).collect();
            let names: Vec<&str> = chunk.iter().map(|m| m.name.as_str()).collect();
            let prices: Vec<Option<f64>> = chunk.iter().map(|m| m.current_price).collect();
            let caps: Vec<Option<f64>> = chunk.iter().map(|m| m.market_cap).collect();
            let ranks: Vec<Option<i32>> = chunk.iter().map(|m| m.market_cap_rank).collect();
            let volumes: Vec<Option<f64>> = chunk.iter().map(|m| m.total_volume).collect();
            let highs: Vec<Option<f64>> = chunk.iter().map(|m| m.high_24h).collect();
            let lows: Vec<Option<f64>> = chunk.iter().map(|m| m.low_24h).collect();
            let changes: Vec<Option<f64>> = chunk.iter().map(|m| m.price_change_24h_pct).collect();
            let circulating: Vec<Option<f64>> = chunk.iter().map(|m| m.circulating_supply).collect();
            let total: Vec<Option<f64>> = chunk.iter().map(|m| m.total_supply).collect();
            let aths: Vec<Option<f64>> = chunk.iter().map(|m| m.ath).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO crypto_markets (
                    coin_id, date, symbol, name, current_price, market_cap, market_cap_rank,
                    total_volume, high_24h, low_24h, price_change_24h_pct, circulating_supply,
                    total_supply, ath, updated_at
                )
                SELECT u.*, NOW()
                FROM UNNEST(
                    $1::text[], $2::date[], $3::text[], $4::text[], $5::float8[], $6::float8[],
                    $7::int4[], $8::float8[], $9::float8[], $10::float8[], $11::float8[],
                    $12::float8[], $13::float8[], $14::float8[]
                ) AS u(coin_id, date, symbol, name, current_price, market_cap, market_cap_rank,
                       total_volume, high_24h, low_24h, price_change_24h_pct, circulating_supply,
                       total_supply, ath)
                ON CONFLICT (coin_id, date) DO UPDATE SET
                    symbol = EXCLUDED.symbol,
                    name = EXCLUDED.name,
                    current_price = EXCLUDED.current_price,
                    market_cap = EXCLUDED.market_cap,
                    market_cap_rank = EXCLUDED.market_cap_rank,
                    total_volume = EXCLUDED.total_volume,
                    high_24h = EXCLUDED.high_24h,
                    low_24h = EXCLUDED.low_24h,
                    price_change_24h_pct = EXCLUDED.price_change_24h_pct,
                    circulating_supply = EXCLUDED.circulating_supply,
                    total_supply = EXCLUDED.total_supply,
                    ath = EXCLUDED.ath,
                    updated_at = NOW()
                "#,
            )
            .bind(&ids)
            .bind(&dates)
            .bind(&symbols)
            .bind(&names)
            .bind(&prices)
            .bind(&caps)
            .bind(&ranks)
            .bind(&volumes)
            .bind(&highs)
            .bind(&lows)
            .bind(&changes)
            .bind(&circulating)
            .bind(&total)
            .bind(&aths)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(format!("crypto_markets: {}", e)))?;

            affected += result.rows_affected();
        }

        Ok(affected)
    }

    #[instrument(skip(self, points), fields(count = points.len()))]
    pub async fn upsert_prices(&self, points: &[CryptoPricePoint]) -> Result<u64> {
        let mut affected = 0;

        for chunk in points.chunks(DEFAULT_BATCH_SIZE) {
            let ids: Vec<&str> = chunk.iter().map(|p| p.coin_id.as_str()).collect();
            let dates: Vec<NaiveDate> = chunk.iter().map(|p| p.date).collect();
            let prices: Vec<f64> = chunk.iter().map(|p| p.price).collect();
            let caps: Vec<Option<f64>> = chunk.iter().map(|p| p.market_cap).collect();
            let volumes: Vec<Option<f64>> = chunk.iter().map(|p| p.volume).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO crypto_price_daily (coin_id, date, price, market_cap, volume, updated_at)
                SELECT u.*, NOW()
                FROM UNNEST($1::text[], $2::date[], $3::float8[], $4::float8[], $5::float8[])
                    AS u(coin_id, date, price, market_cap, volume)
                ON CONFLICT (coin_id, date) DO UPDATE SET
                    price = EXCLUDED.price,
                    market_cap = EXCLUDED.market_cap,
                    volume = EXCLUDED.volume,
                    updated_at = NOW()
                "#,
            )
            .bind(&ids)
            .bind(&dates)
            .bind(&prices)
            .bind(&caps)
            .bind(&volumes)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(format!("crypto_price_daily: {}", e)))?;

            affected += result.rows_affected();
        }

        Ok(affected)
    }
}
