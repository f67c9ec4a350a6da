//! 암호화폐 적재 모듈 (CoinGecko).
//!
//! 시가총액 상위 코인의 시장 스냅샷을 `crypto_markets`에, 코인별 일별 가격
//! 이력을 `crypto_price_daily`에 저장합니다.

use std::time::{Duration, Instant};

use loader_core::AppConfig;
use loader_data::{retry_fixed, CoinGeckoClient, CryptoRepository};
use sqlx::PgPool;

use super::price_load::retry_policy;
use super::SymbolRunner;
use crate::{CollectionStats, ItemOutcome, ItemResult, Result};

/// 암호화폐 시장 데이터를 적재합니다.
pub async fn load_crypto(pool: &PgPool, config: &AppConfig) -> Result<CollectionStats> {
    let start = Instant::now();
    let loader = &config.loader;
    let providers = &config.providers;

    let client = CoinGeckoClient::new(
        &providers.coingecko_base_url,
        std::env::var("COINGECKO_API_KEY").ok(),
        Duration::from_secs(providers.http_timeout_secs),
    )?;
    let repo = CryptoRepository::new(pool.clone());
    let policy = retry_policy(loader);

    tracing::info!(top_n = providers.coingecko_top_n, "암호화폐 시장 스냅샷 조회");
    let markets = retry_fixed(policy, "coingecko markets", || {
        client.top_markets(providers.coingecko_top_n)
    })
    .await?;
    let snapshot_rows = repo.upsert_markets(&markets).await?;
    tracing::info!(coins = markets.len(), rows = snapshot_rows, "시장 스냅샷 저장 완료");

    let coin_ids: Vec<String> = markets.iter().map(|m| m.coin_id.clone()).collect();
    let days = providers.coingecko_history_days;
    let delay = Duration::from_millis(loader.request_delay_ms);

    // 무료 API의 분당 호출 한도 때문에 순차 처리
    let runner = SymbolRunner::new(pool, "load_crypto_prices", loader).concurrency(1);
    let client = &client;
    let repo = &repo;
    let mut stats = runner
        .run(coin_ids, move |coin_id| async move {
            let points = retry_fixed(policy, &coin_id, || client.daily_prices(&coin_id, days)).await;
            tokio::time::sleep(delay).await;
            let points = points?;
            if points.is_empty() {
                return Ok(ItemOutcome::Empty);
            }
            ItemResult::Ok(ItemOutcome::Saved(repo.upsert_prices(&points).await?))
        })
        .await?;

    stats.rows += snapshot_rows;
    stats.elapsed = start.elapsed();
    Ok(stats)
}
