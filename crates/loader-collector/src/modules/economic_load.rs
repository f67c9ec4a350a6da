//! 거시경제 시리즈 적재 모듈 (FRED).

use std::time::Duration;

use loader_core::{parse_ticker_list, AppConfig};
use loader_data::{retry_fixed, FredClient, MacroRepository};
use sqlx::PgPool;

use super::price_load::retry_policy;
use super::SymbolRunner;
use crate::{CollectionStats, ItemOutcome, ItemResult, Result};

/// 적재할 시리즈 목록. 인자가 없으면 설정의 `providers.fred_series`를 사용합니다.
pub fn series_list(requested: Option<&str>, configured: &[String]) -> Vec<String> {
    match requested {
        Some(list) => parse_ticker_list(list),
        None => parse_ticker_list(&configured.join(",")),
    }
}

/// 시리즈 메타데이터와 마지막 저장일 이후의 관측치를 적재합니다.
pub async fn load_economic(
    pool: &PgPool,
    config: &AppConfig,
    series: Option<&str>,
) -> Result<CollectionStats> {
    let loader = &config.loader;
    let client = FredClient::from_env(
        &config.providers.fred_base_url,
        Duration::from_secs(config.providers.http_timeout_secs),
    )?;
    let repo = MacroRepository::new(pool.clone());
    let series = series_list(series, &config.providers.fred_series);

    tracing::info!(series = series.len(), "거시경제 시리즈 적재 시작");

    let policy = retry_policy(loader);
    let delay = Duration::from_millis(loader.request_delay_ms);
    let runner = SymbolRunner::new(pool, "load_economic", loader);

    let client = &client;
    let repo = &repo;
    runner
        .run(series, move |series_id| async move {
            let info = retry_fixed(policy, &series_id, || client.series_info(&series_id)).await?;
            repo.upsert_series(&info).await?;

            // 마지막 날짜도 다시 받아 수정치를 반영
            let since = repo.last_date(&series_id).await?;
            let observations =
                retry_fixed(policy, &series_id, || client.observations(&series_id, since)).await;
            tokio::time::sleep(delay).await;
            let observations = observations?;

            if observations.is_empty() {
                return Ok(ItemOutcome::Empty);
            }
            ItemResult::Ok(ItemOutcome::Saved(repo.upsert_observations(&observations).await?))
        })
        .await
}
