//! PostgreSQL 저장소.
//!
//! 모든 쓰기는 `INSERT ... ON CONFLICT DO UPDATE`이므로 같은 작업을 여러 번
//! 실행해도 결과가 같습니다. 테이블 이름은 고정된 목록에서만 선택됩니다.

pub mod crypto;
pub mod database;
pub mod fundamentals;
pub mod macro_data;
pub mod metrics;
pub mod patterns;
pub mod prices;
pub mod scores;
pub mod symbols;
pub mod technicals;

pub use crypto::CryptoRepository;
pub use database::Database;
pub use fundamentals::FundamentalRepository;
pub use macro_data::MacroRepository;
pub use metrics::MetricsRepository;
pub use patterns::PatternRepository;
pub use prices::PriceRepository;
pub use scores::ScoreRepository;
pub use symbols::SymbolRepository;
pub use technicals::TechnicalRepository;

use chrono::NaiveDate;
use loader_core::Timeframe;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{DataError, Result};

/// 한 번의 INSERT에 담을 최대 행 수.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// 타임프레임별 가격 테이블.
pub fn price_table(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::D1 => "price_daily",
        Timeframe::W1 => "price_weekly",
        Timeframe::MN1 => "price_monthly",
    }
}

/// 타임프레임별 기술지표 테이블.
pub fn technical_table(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::D1 => "technical_data_daily",
        Timeframe::W1 => "technical_data_weekly",
        Timeframe::MN1 => "technical_data_monthly",
    }
}

/// `(symbol, date)` 키와 f64 컬럼으로 구성된 한 행.
pub(crate) struct KeyedRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// `INSERT ... ON CONFLICT (symbol, date) DO UPDATE` 문을 만듭니다.
///
/// 모든 값 컬럼은 EXCLUDED 값으로 덮어쓰고 `updated_at`을 갱신합니다.
pub(crate) fn build_keyed_upsert<'a>(
    table: &str,
    columns: &[&str],
    rows: &'a [KeyedRow],
) -> QueryBuilder<'a, Postgres> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "INSERT INTO {} (symbol, date, {}, updated_at) ",
        table,
        columns.join(", ")
    ));

    qb.push_values(rows, |mut b, row| {
        b.push_bind(row.symbol.as_str()).push_bind(row.date);
        for i in 0..columns.len() {
            b.push_bind(row.values.get(i).copied().flatten().filter(|v| v.is_finite()));
        }
        b.push("NOW()");
    });

    let updates: Vec<String> = columns
        .iter()
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect();
    qb.push(format!(
        " ON CONFLICT (symbol, date) DO UPDATE SET {}, updated_at = NOW()",
        updates.join(", ")
    ));
    qb
}

/// 행들을 `batch_size` 단위로 나눠 upsert합니다.
pub(crate) async fn upsert_keyed_rows(
    pool: &PgPool,
    table: &str,
    columns: &[&str],
    rows: &[KeyedRow],
    batch_size: usize,
) -> Result<u64> {
    let mut affected = 0;
    for chunk in rows.chunks(batch_size.max(1)) {
        let mut qb = build_keyed_upsert(table, columns, chunk);
        let result = qb
            .build()
            .execute(pool)
            .await
            .map_err(|e| DataError::InsertError(format!("{}: {}", table, e)))?;
        affected += result.rows_affected();
    }
    Ok(affected)
}
