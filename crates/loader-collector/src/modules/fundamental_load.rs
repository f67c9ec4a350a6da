//! 재무제표 및 핵심 지표 적재 모듈 (Yahoo Finance).
//!
//! 연간 재무제표는 `annual_financials`, 시세 기반 지표는 `key_statistics`에
//! 저장하고, 섹터/산업/회사명은 `stock_symbols`에 반영합니다.

use std::time::Duration;

use loader_core::{AppConfig, Symbol};
use loader_data::{retry_fixed, FundamentalRepository, SymbolRepository, YahooFundamentalsClient};
use sqlx::PgPool;

use super::price_load::retry_policy;
use super::{target_symbols, SymbolRunner, SymbolScope};
use crate::{CollectionStats, ItemOutcome, ItemResult, Result};

/// 재무 데이터를 적재합니다.
pub async fn load_fundamentals(
    pool: &PgPool,
    config: &AppConfig,
    symbols: Option<&str>,
    resume: bool,
) -> Result<CollectionStats> {
    let loader = &config.loader;
    let client = YahooFundamentalsClient::new(
        &config.providers.yahoo_base_url,
        Duration::from_secs(config.providers.http_timeout_secs),
    )?;
    let fundamentals = FundamentalRepository::new(pool.clone());
    let listings = SymbolRepository::new(pool.clone());
    let symbols = target_symbols(pool, loader, symbols, SymbolScope::Stocks).await?;

    tracing::info!("재무 데이터 적재 시작");

    let policy = retry_policy(loader);
    let delay = Duration::from_millis(loader.request_delay_ms);
    let runner = SymbolRunner::new(pool, "load_fundamentals", loader).resume(resume);

    let client = &client;
    let fundamentals = &fundamentals;
    let listings = &listings;
    runner
        .run(symbols, move |symbol| async move {
            let ticker = Symbol::stock(symbol.as_str()).yahoo_ticker();

            let statements = retry_fixed(policy, &ticker, || client.annual_financials(&ticker)).await;
            let key_stats = retry_fixed(policy, &ticker, || client.key_statistics(&ticker)).await;
            tokio::time::sleep(delay).await;

            let mut rows = 0;
            let statements_ok = match statements {
                Ok(mut statements) => {
                    statements.retain(|s| s.has_data());
                    for s in statements.iter_mut() {
                        s.symbol = symbol.clone();
                    }
                    rows += fundamentals.upsert_financials(&statements).await?;
                    true
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "재무제표 조회 실패");
                    false
                }
            };

            match key_stats {
                Ok(mut stats) => {
                    stats.symbol = symbol.clone();
                    fundamentals.upsert_key_statistics(&stats).await?;
                    listings
                        .update_classification(
                            &symbol,
                            stats.long_name.as_deref(),
                            stats.sector.as_deref(),
                            stats.industry.as_deref(),
                        )
                        .await?;
                    rows += 1;
                }
                Err(e) if statements_ok => {
                    tracing::warn!(symbol = %symbol, error = %e, "핵심 지표 조회 실패");
                }
                Err(e) => return Err(e.into()),
            }

            ItemResult::Ok(if rows == 0 {
                ItemOutcome::Empty
            } else {
                ItemOutcome::Saved(rows)
            })
        })
        .await
}
