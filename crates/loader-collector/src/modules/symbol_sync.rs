//! 종목 마스터 동기화 모듈 (Alpaca 자산 목록 → `stock_symbols`).

use std::time::{Duration, Instant};

use loader_core::AppConfig;
use loader_data::{AlpacaAsset, AlpacaClient, AlpacaCredentials, SymbolRepository};
use sqlx::PgPool;

use crate::{CollectionStats, Result};

/// Alpaca의 활성 미국 주식 목록으로 종목 마스터를 갱신합니다.
///
/// 거래 가능하고 OTC가 아닌 자산만 활성으로 저장하며, 목록에서 사라진 종목은
/// 비활성화합니다.
pub async fn sync_symbols(pool: &PgPool, config: &AppConfig) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("심볼 동기화 시작");

    let providers = &config.providers;
    let client = AlpacaClient::new(
        AlpacaCredentials::from_env()?,
        &providers.alpaca_trading_url,
        &providers.alpaca_data_url,
        &providers.alpaca_feed,
        Duration::from_secs(providers.http_timeout_secs),
    )?;

    let assets = client.list_assets().await?;
    let (loadable, rejected) = partition_assets(&assets);
    stats.total = assets.len();
    stats.skipped = rejected;

    let symbols: Vec<_> = loadable.iter().map(|a| a.to_symbol_info()).collect();
    let repo = SymbolRepository::new(pool.clone());
    stats.rows = repo.upsert_many(&symbols).await?;
    stats.success = symbols.len();

    // 빈 목록으로 전체를 비활성화하지 않도록 보호
    if !symbols.is_empty() {
        let active: Vec<String> = symbols.iter().map(|s| s.symbol.clone()).collect();
        let deactivated = repo.deactivate_missing(&active).await?;
        tracing::info!(deactivated = deactivated, "목록에 없는 종목 비활성화");
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 적재 대상 자산과 제외된 자산 수.
fn partition_assets(assets: &[AlpacaAsset]) -> (Vec<&AlpacaAsset>, usize) {
    let loadable: Vec<&AlpacaAsset> = assets.iter().filter(|a| a.is_loadable()).collect();
    let rejected = assets.len() - loadable.len();
    (loadable, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(symbol: &str, exchange: &str, tradable: bool) -> AlpacaAsset {
        serde_json::from_value(serde_json::json!({
            "symbol": symbol,
            "name": format!("{} Inc", symbol),
            "exchange": exchange,
            "class": "us_equity",
            "status": "active",
            "tradable": tradable,
        }))
        .unwrap()
    }

    #[test]
    fn test_partition_excludes_otc_and_untradable() {
        let assets = vec![
            asset("AAPL", "NASDAQ", true),
            asset("PINK", "OTC", true),
            asset("HALT", "NYSE", false),
        ];
        let (loadable, rejected) = partition_assets(&assets);
        assert_eq!(loadable.len(), 1);
        assert_eq!(loadable[0].symbol, "AAPL");
        assert_eq!(rejected, 2);
    }
}
