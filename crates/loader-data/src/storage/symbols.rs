//! 종목 마스터 저장소 (`stock_symbols`).

use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

use loader_core::{MarketType, SymbolInfo};

use super::DEFAULT_BATCH_SIZE;
use crate::error::{DataError, Result};

#[derive(Debug, FromRow)]
struct SymbolRecord {
    symbol: String,
    name: Option<String>,
    exchange: Option<String>,
    asset_class: String,
    sector: Option<String>,
    industry: Option<String>,
    is_active: bool,
}

impl From<SymbolRecord> for SymbolInfo {
    fn from(r: SymbolRecord) -> Self {
        SymbolInfo {
            symbol: r.symbol,
            name: r.name,
            exchange: r.exchange,
            market_type: r.asset_class.parse().unwrap_or(MarketType::Stock),
            sector: r.sector,
            industry: r.industry,
            is_active: r.is_active,
        }
    }
}

/// 종목 마스터 저장소.
#[derive(Clone)]
pub struct SymbolRepository {
    pool: PgPool,
}

impl SymbolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 종목 목록을 upsert합니다.
    ///
    /// 섹터/산업은 재무 로더가 채우므로 새 값이 NULL이면 기존 값을 유지합니다.
    #[instrument(skip(self, symbols), fields(count = symbols.len()))]
    pub async fn upsert_many(&self, symbols: &[SymbolInfo]) -> Result<u64> {
        let mut affected = 0;

        for chunk in symbols.chunks(DEFAULT_BATCH_SIZE) {
            let tickers: Vec<&str> = chunk.iter().map(|s| s.symbol.as_str()).collect();
            let names: Vec<Option<&str>> = chunk.iter().map(|s| s.name.as_deref()).collect();
            let exchanges: Vec<Option<&str>> = chunk.iter().map(|s| s.exchange.as_deref()).collect();
            let classes: Vec<&str> = chunk.iter().map(|s| s.market_type.as_str()).collect();
            let sectors: Vec<Option<&str>> = chunk.iter().map(|s| s.sector.as_deref()).collect();
            let industries: Vec<Option<&str>> = chunk.iter().map(|s| s.industry.as_deref()).collect();
            let actives: Vec<bool> = chunk.iter().map(|s| s.is_active).collect();
            let etfs: Vec<bool> = chunk.iter().map(|s| s.is_etf()).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO stock_symbols
                    (symbol, name, exchange, asset_class, sector, industry, is_active, is_etf, updated_at)
                SELECT u.*, NOW()
                FROM UNNEST(
                    $1::text[], $2::text[], $3::text[], $4::text[],
                    $5::text[], $6::text[], $7::bool[], $8::bool[]
                ) AS u(symbol, name, exchange, asset_class, sector, industry, is_active, is_etf)
                ON CONFLICT (symbol) DO UPDATE SET
                    name = COALESCE(EXCLUDED.name, stock_symbols.name),
                    exchange = COALESCE(EXCLUDED.exchange, stock_symbols.exchange),
                    asset_class = EXCLUDED.asset_class,
                    sector = COALESCE(EXCLUDED.sector, stock_symbols.sector),
                    industry = COALESCE(EXCLUDED.industry, stock_symbols.industry),
                    is_active = EXCLUDED.is_active,
                    is_etf = EXCLUDED.is_etf,
                    updated_at = NOW()
                "#,
            )
            .bind(&tickers)
            .bind(&names)
            .bind(&exchanges)
            .bind(&classes)
            .bind(&sectors)
            .bind(&industries)
            .bind(&actives)
            .bind(&etfs)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(format!("stock_symbols: {}", e)))?;

            affected += result.rows_affected();
        }

        debug!(affected = affected, "종목 마스터 저장 완료");
        Ok(affected)
    }

    /// 목록에 없는 종목을 비활성화합니다 (상장 폐지 반영).
    pub async fn deactivate_missing(&self, active: &[String]) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE stock_symbols
            SET is_active = FALSE, updated_at = NOW()
            WHERE is_active AND asset_class IN ('stock', 'etf') AND NOT (symbol = ANY($1))
            "#,
        )
        .bind(active)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// 활성 주식/ETF 티커 (알파벳 순).
    pub async fn active_symbols(&self, limit: Option<i64>) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT symbol FROM stock_symbols
            WHERE is_active AND asset_class IN ('stock', 'etf')
            ORDER BY symbol
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    /// 활성 보통주 티커 (ETF 제외, 재무/지표 계산 대상).
    pub async fn active_stocks(&self, limit: Option<i64>) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT symbol FROM stock_symbols
            WHERE is_active AND asset_class = 'stock' AND NOT is_etf
            ORDER BY symbol
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    pub async fn find(&self, tickers: &[String]) -> Result<Vec<SymbolInfo>> {
        let records: Vec<SymbolRecord> = sqlx::query_as(
            r#"
            SELECT symbol, name, exchange, asset_class, sector, industry, is_active
            FROM stock_symbols
            WHERE symbol = ANY($1)
            ORDER BY symbol
            "#,
        )
        .bind(tickers)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(SymbolInfo::from).collect())
    }

    /// 섹터/산업/이름을 갱신합니다. `None`인 항목은 기존 값을 유지합니다.
    pub async fn update_classification(
        &self,
        symbol: &str,
        name: Option<&str>,
        sector: Option<&str>,
        industry: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE stock_symbols SET
                name = COALESCE($2, name),
                sector = COALESCE($3, sector),
                industry = COALESCE($4, industry),
                updated_at = NOW()
            WHERE symbol = $1
            "#,
        )
        .bind(symbol)
        .bind(name)
        .bind(sector)
        .bind(industry)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
