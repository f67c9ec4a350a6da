//! 배치 작업 모듈.

pub mod checkpoint;
pub mod crypto_load;
pub mod economic_load;
pub mod fundamental_load;
pub mod metric_calc;
pub mod pattern_detect;
pub mod price_load;
pub mod runner;
pub mod score_calc;
pub mod symbol_sync;
pub mod technical_load;
pub mod workflow;

pub use checkpoint::{
    clear_checkpoint, list_checkpoints, mark_interrupted, CheckpointInfo, CheckpointStatus,
};
pub use crypto_load::load_crypto;
pub use economic_load::load_economic;
pub use fundamental_load::load_fundamentals;
pub use metric_calc::calc_metrics;
pub use pattern_detect::detect_patterns;
pub use price_load::{load_prices, PriceSource};
pub use runner::SymbolRunner;
pub use score_calc::calc_scores;
pub use symbol_sync::sync_symbols;
pub use technical_load::load_technicals;
pub use workflow::{run_all, run_daemon};

use loader_core::{parse_ticker_list, LoaderConfig};
use loader_data::SymbolRepository;
use sqlx::PgPool;

use crate::Result;

/// 대상 종목 범위.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    /// 활성 주식과 ETF (가격/지표 적재)
    Listed,
    /// 활성 보통주 (재무/팩터 계산)
    Stocks,
}

/// 작업 대상 심볼을 결정합니다.
///
/// `--symbols`가 주어지면 그 목록을, 아니면 DB의 활성 종목을 사용합니다.
pub async fn target_symbols(
    pool: &PgPool,
    loader: &LoaderConfig,
    symbols: Option<&str>,
    scope: SymbolScope,
) -> Result<Vec<String>> {
    let repo = SymbolRepository::new(pool.clone());

    if let Some(list) = symbols {
        let tickers = parse_ticker_list(list);
        let known = repo.find(&tickers).await?;
        let unknown: Vec<&String> = tickers
            .iter()
            .filter(|t| !known.iter().any(|k| &k.symbol == *t))
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(unknown = ?unknown, "종목 마스터에 없는 심볼");
        }
        tracing::info!(count = tickers.len(), "지정 심볼 처리");
        return Ok(tickers);
    }

    let limit = (loader.max_symbols > 0).then_some(loader.max_symbols as i64);
    let tickers = match scope {
        SymbolScope::Listed => repo.active_symbols(limit).await?,
        SymbolScope::Stocks => repo.active_stocks(limit).await?,
    };
    tracing::info!(count = tickers.len(), scope = ?scope, "활성 심볼 조회 완료");
    Ok(tickers)
}
