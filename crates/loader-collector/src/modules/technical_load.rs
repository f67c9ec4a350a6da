//! 기술적 지표 적재 모듈.
//!
//! 저장된 가격 바로 지표를 다시 계산해 `technical_data_*` 테이블에 upsert합니다.

use loader_analytics::TechnicalSnapshot;
use loader_core::{AppConfig, Timeframe};
use loader_data::{PriceRepository, TechnicalRepository};
use sqlx::PgPool;

use super::{target_symbols, SymbolRunner, SymbolScope};
use crate::{CollectionStats, ItemOutcome, ItemResult, Result};

/// 지표 계산에 사용할 최근 바 수 (SMA 200 워밍업 포함).
pub const TECHNICAL_LOOKBACK: i64 = 400;

/// 기술적 지표를 계산하고 저장합니다.
pub async fn load_technicals(
    pool: &PgPool,
    config: &AppConfig,
    timeframe: Timeframe,
    symbols: Option<&str>,
    resume: bool,
) -> Result<CollectionStats> {
    let loader = &config.loader;
    let prices = PriceRepository::new(pool.clone());
    let technicals = TechnicalRepository::new(pool.clone());
    let symbols = target_symbols(pool, loader, symbols, SymbolScope::Listed).await?;

    tracing::info!(timeframe = %timeframe, "기술적 지표 계산 시작");

    let workflow = format!("load_technicals_{}", timeframe.table_suffix());
    let runner = SymbolRunner::new(pool, workflow, loader).resume(resume);

    let prices = &prices;
    let technicals = &technicals;
    runner
        .run(symbols, move |symbol| async move {
            let bars = prices
                .recent_bars(&symbol, timeframe, TECHNICAL_LOOKBACK)
                .await?;
            if bars.is_empty() {
                return Ok(ItemOutcome::Empty);
            }

            let rows = TechnicalSnapshot::compute(&bars);
            let saved = technicals.upsert_rows(timeframe, &rows).await?;
            ItemResult::Ok(ItemOutcome::Saved(saved))
        })
        .await
}
