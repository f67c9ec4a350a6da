//! 재무제표 및 핵심 지표 저장소 (`annual_financials`, `key_statistics`).

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use loader_core::{AnnualFinancials, KeyStatistics};

use crate::error::{DataError, Result};

#[derive(Debug, FromRow)]
struct FinancialsRecord {
    symbol: String,
    fiscal_date: NaiveDate,
    revenue: Option<f64>,
    gross_profit: Option<f64>,
    operating_income: Option<f64>,
    net_income: Option<f64>,
    eps_diluted: Option<f64>,
    ebitda: Option<f64>,
    total_assets: Option<f64>,
    total_equity: Option<f64>,
    total_debt: Option<f64>,
    current_assets: Option<f64>,
    current_liabilities: Option<f64>,
    cash: Option<f64>,
    operating_cash_flow: Option<f64>,
    capital_expenditure: Option<f64>,
    dividends_paid: Option<f64>,
    shares_outstanding: Option<f64>,
}

impl From<FinancialsRecord> for AnnualFinancials {
    fn from(r: FinancialsRecord) -> Self {
        AnnualFinancials {
            symbol: r.symbol,
            fiscal_date: r.fiscal_date,
            revenue: r.revenue,
            gross_profit: r.gross_profit,
            operating_income: r.operating_income,
            net_income: r.net_income,
            eps_diluted: r.eps_diluted,
            ebitda: r.ebitda,
            total_assets: r.total_assets,
            total_equity: r.total_equity,
            total_debt: r.total_debt,
            current_assets: r.current_assets,
            current_liabilities: r.current_liabilities,
            cash: r.cash,
            operating_cash_flow: r.operating_cash_flow,
            capital_expenditure: r.capital_expenditure,
            dividends_paid: r.dividends_paid,
            shares_outstanding: r.shares_outstanding,
        }
    }
}

#[derive(Debug, FromRow)]
struct KeyStatisticsRecord {
    symbol: String,
    market_cap: Option<f64>,
    enterprise_value: Option<f64>,
    trailing_pe: Option<f64>,
    forward_pe: Option<f64>,
    price_to_book: Option<f64>,
    price_to_sales: Option<f64>,
    enterprise_to_ebitda: Option<f64>,
    dividend_yield: Option<f64>,
    beta: Option<f64>,
    shares_outstanding: Option<f64>,
    float_shares: Option<f64>,
    held_percent_insiders: Option<f64>,
    held_percent_institutions: Option<f64>,
    short_percent_of_float: Option<f64>,
    short_ratio: Option<f64>,
    fetched_at: chrono::DateTime<chrono::Utc>,
}

impl From<KeyStatisticsRecord> for KeyStatistics {
    fn from(r: KeyStatisticsRecord) -> Self {
        KeyStatistics {
            symbol: r.symbol,
            market_cap: r.market_cap,
            enterprise_value: r.enterprise_value,
            trailing_pe: r.trailing_pe,
            forward_pe: r.forward_pe,
            price_to_book: r.price_to_book,
            price_to_sales: r.price_to_sales,
            enterprise_to_ebitda: r.enterprise_to_ebitda,
            dividend_yield: r.dividend_yield,
            beta: r.beta,
            shares_outstanding: r.shares_outstanding,
            float_shares: r.float_shares,
            held_percent_insiders: r.held_percent_insiders,
            held_percent_institutions: r.held_percent_institutions,
            short_percent_of_float: r.short_percent_of_float,
            short_ratio: r.short_ratio,
            sector: None,
            industry: None,
            long_name: None,
            fetched_at: r.fetched_at,
        }
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// 재무 데이터 저장소.
#[derive(Clone)]
pub struct FundamentalRepository {
    pool: PgPool,
}

impl FundamentalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 연간 재무제표를 upsert합니다. 한 종목의 행들은 하나의 트랜잭션으로 저장됩니다.
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn upsert_financials(&self, rows: &[AnnualFinancials]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for r in rows {
            let result = sqlx::query(
                r#"
                INSERT INTO annual_financials (
                    symbol, fiscal_date, revenue, gross_profit, operating_income, net_income,
                    eps_diluted, ebitda, total_assets, total_equity, total_debt, current_assets,
                    current_liabilities, cash, operating_cash_flow, capital_expenditure,
                    dividends_paid, shares_outstanding, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, NOW())
                ON CONFLICT (symbol, fiscal_date) DO UPDATE SET
                    revenue = COALESCE(EXCLUDED.revenue, annual_financials.revenue),
                    gross_profit = COALESCE(EXCLUDED.gross_profit, annual_financials.gross_profit),
                    operating_income = COALESCE(EXCLUDED.operating_income, annual_financials.operating_income),
                    net_income = COALESCE(EXCLUDED.net_income, annual_financials.net_income),
                    eps_diluted = COALESCE(EXCLUDED.eps_diluted, annual_financials.eps_diluted),
                    ebitda = COALESCE(EXCLUDED.ebitda, annual_financials.ebitda),
                    total_assets = COALESCE(EXCLUDED.total_assets, annual_financials.total_assets),
                    total_equity = COALESCE(EXCLUDED.total_equity, annual_financials.total_equity),
                    total_debt = COALESCE(EXCLUDED.total_debt, annual_financials.total_debt),
                    current_assets = COALESCE(EXCLUDED.current_assets, annual_financials.current_assets),
                    current_liabilities = COALESCE(EXCLUDED.current_liabilities, annual_financials.current_liabilities),
                    cash = COALESCE(EXCLUDED.cash, annual_financials.cash),
                    operating_cash_flow = COALESCE(EXCLUDED.operating_cash_flow, annual_financials.operating_cash_flow),
                    capital_expenditure = COALESCE(EXCLUDED.capital_expenditure, annual_financials.capital_expenditure),
                    dividends_paid = COALESCE(EXCLUDED.dividends_paid, annual_financials.dividends_paid),
                    shares_outstanding = COALESCE(EXCLUDED.shares_outstanding, annual_financials.shares_outstanding),
                    updated_at = NOW()
                "#,
            )
            .bind(&r.symbol)
            .bind(r.fiscal_date)
            .bind(finite(r.revenue))
            .bind(finite(r.gross_profit))
            .bind(finite(r.operating_income))
            .bind(finite(r.net_income))
            .bind(finite(r.eps_diluted))
            .bind(finite(r.ebitda))
            .bind(finite(r.total_assets))
            .bind(finite(r.total_equity))
            .bind(finite(r.total_debt))
            .bind(finite(r.current_assets))
            .bind(finite(r.current_liabilities))
            .bind(finite(r.cash))
            .bind(finite(r.operating_cash_flow))
            .bind(finite(r.capital_expenditure))
            .bind(finite(r.dividends_paid))
            .bind(finite(r.shares_outstanding))
            .execute(&mut *tx)
            .await
            .map_err(|e| DataError::InsertError(format!("annual_financials: {}", e)))?;
            affected += result.rows_affected();
        }

        tx.commit().await?;
        Ok(affected)
    }

    /// 핵심 지표 스냅샷을 upsert합니다.
    pub async fn upsert_key_statistics(&self, stats: &KeyStatistics) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO key_statistics (
                symbol, market_cap, enterprise_value, trailing_pe, forward_pe, price_to_book,
                price_to_sales, enterprise_to_ebitda, dividend_yield, beta, shares_outstanding,
                float_shares, held_percent_insiders, held_percent_institutions,
                short_percent_of_float, short_ratio, fetched_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (symbol) DO UPDATE SET
                market_cap = EXCLUDED.market_cap,
                enterprise_value = EXCLUDED.enterprise_value,
                trailing_pe = EXCLUDED.trailing_pe,
                forward_pe = EXCLUDED.forward_pe,
                price_to_book = EXCLUDED.price_to_book,
                price_to_sales = EXCLUDED.price_to_sales,
                enterprise_to_ebitda = EXCLUDED.enterprise_to_ebitda,
                dividend_yield = EXCLUDED.dividend_yield,
                beta = EXCLUDED.beta,
                shares_outstanding = EXCLUDED.shares_outstanding,
                float_shares = EXCLUDED.float_shares,
                held_percent_insiders = EXCLUDED.held_percent_insiders,
                held_percent_institutions = EXCLUDED.held_percent_institutions,
                short_percent_of_float = EXCLUDED.short_percent_of_float,
                short_ratio = EXCLUDED.short_ratio,
                fetched_at = EXCLUDED.fetched_at
            "#,
        )
        .bind(&stats.symbol)
        .bind(finite(stats.market_cap))
        .bind(finite(stats.enterprise_value))
        .bind(finite(stats.trailing_pe))
        .bind(finite(stats.forward_pe))
        .bind(finite(stats.price_to_book))
        .bind(finite(stats.price_to_sales))
        .bind(finite(stats.enterprise_to_ebitda))
        .bind(finite(stats.dividend_yield))
        .bind(finite(stats.beta))
        .bind(finite(stats.shares_outstanding))
        .bind(finite(stats.float_shares))
        .bind(finite(stats.held_percent_insiders))
        .bind(finite(stats.held_percent_institutions))
        .bind(finite(stats.short_percent_of_float))
        .bind(finite(stats.short_ratio))
        .bind(stats.fetched_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::InsertError(format!("key_statistics: {}", e)))?;
        Ok(())
    }

    /// 연간 재무제표 (회계연도 오름차순).
    pub async fn financials(&self, symbol: &str) -> Result<Vec<AnnualFinancials>> {
        let records: Vec<FinancialsRecord> = sqlx::query_as(
            r#"
            SELECT symbol, fiscal_date, revenue, gross_profit, operating_income, net_income,
                   eps_diluted, ebitda, total_assets, total_equity, total_debt, current_assets,
                   current_liabilities, cash, operating_cash_flow, capital_expenditure,
                   dividends_paid, shares_outstanding
            FROM annual_financials
            WHERE symbol = $1
            ORDER BY fiscal_date ASC
            "#,
        )
        .bind(symbol)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(AnnualFinancials::from).collect())
    }

    pub async fn key_statistics(&self, symbol: &str) -> Result<Option<KeyStatistics>> {
        let record: Option<KeyStatisticsRecord> = sqlx::query_as(
            r#"
            SELECT symbol, market_cap, enterprise_value, trailing_pe, forward_pe, price_to_book,
                   price_to_sales, enterprise_to_ebitda, dividend_yield, beta, shares_outstanding,
                   float_shares, held_percent_insiders, held_percent_institutions,
                   short_percent_of_float, short_ratio, fetched_at
            FROM key_statistics
            WHERE symbol = $1
            "#,
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(KeyStatistics::from))
    }
}
