//! 가격 바 증분 적재 모듈.
//!
//! 심볼마다 저장된 마지막 날짜에서 `overlap_days`만큼 앞으로 돌아가 다시 받고
//! (수정 주가 반영), 데이터가 없으면 `history_start`부터 받습니다.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use loader_core::{AppConfig, LoaderConfig, Symbol, Timeframe};
use loader_data::{
    retry_fixed, AlpacaClient, AlpacaCredentials, PriceProvider, PriceRepository, RetryPolicy,
    YahooPriceProvider,
};
use sqlx::PgPool;

use super::{target_symbols, SymbolRunner, SymbolScope};
use crate::{CollectionStats, CollectorError, ItemOutcome, ItemResult, Result};

/// 가격 데이터 제공자 선택.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceSource {
    #[default]
    Yahoo,
    Alpaca,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Alpaca => "alpaca",
        }
    }

    /// 제공자 표기의 티커.
    pub fn vendor_ticker(&self, symbol: &str) -> String {
        let symbol = Symbol::stock(symbol);
        match self {
            Self::Yahoo => symbol.yahoo_ticker(),
            Self::Alpaca => symbol.alpaca_ticker(),
        }
    }

    fn provider(&self, config: &AppConfig) -> Result<Arc<dyn PriceProvider>> {
        let provider: Arc<dyn PriceProvider> = match self {
            Self::Yahoo => Arc::new(YahooPriceProvider::new()?),
            Self::Alpaca => {
                let p = &config.providers;
                Arc::new(AlpacaClient::new(
                    AlpacaCredentials::from_env()?,
                    &p.alpaca_trading_url,
                    &p.alpaca_data_url,
                    &p.alpaca_feed,
                    Duration::from_secs(p.http_timeout_secs),
                )?)
            }
        };
        Ok(provider)
    }
}

impl FromStr for PriceSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "alpaca" => Ok(Self::Alpaca),
            _ => Err(format!("Unknown price source: {}", s)),
        }
    }
}

/// 가격 적재 옵션.
#[derive(Debug, Clone)]
pub struct PriceLoadOptions {
    pub timeframe: Timeframe,
    /// 쉼표로 구분된 심볼 (없으면 활성 종목 전체)
    pub symbols: Option<String>,
    pub source: PriceSource,
    pub resume: bool,
}

/// 재시도 정책 (`loader.retry_*`).
pub(crate) fn retry_policy(loader: &LoaderConfig) -> RetryPolicy {
    RetryPolicy::new(
        loader.retry_attempts,
        Duration::from_millis(loader.retry_delay_ms),
    )
}

/// `history_start` 설정 값을 날짜로 파싱합니다.
pub(crate) fn history_start(loader: &LoaderConfig) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&loader.history_start, "%Y-%m-%d").map_err(|e| {
        CollectorError::Config(format!("loader.history_start '{}': {}", loader.history_start, e))
    })
}

/// 증분 적재 시작일.
pub fn resolve_start(last: Option<NaiveDate>, overlap_days: i64, history_start: NaiveDate) -> NaiveDate {
    match last {
        Some(last) => (last - chrono::Duration::days(overlap_days.max(0))).max(history_start),
        None => history_start,
    }
}

/// 가격 바를 적재합니다.
pub async fn load_prices(
    pool: &PgPool,
    config: &AppConfig,
    options: &PriceLoadOptions,
) -> Result<CollectionStats> {
    let loader = &config.loader;
    let timeframe = options.timeframe;
    let source = options.source;

    let first_date = history_start(loader)?;
    let end = Utc::now().date_naive();
    let policy = retry_policy(loader);
    let delay = Duration::from_millis(loader.request_delay_ms);

    let provider = source.provider(config)?;
    let repo = PriceRepository::new(pool.clone()).with_batch_size(loader.batch_size);
    let symbols =
        target_symbols(pool, loader, options.symbols.as_deref(), SymbolScope::Listed).await?;

    tracing::info!(
        timeframe = %timeframe,
        source = source.as_str(),
        end = %end,
        "가격 적재 시작"
    );

    let workflow = format!("load_prices_{}", timeframe.table_suffix());
    let runner = SymbolRunner::new(pool, workflow, loader).resume(options.resume);

    let provider = &provider;
    let repo = &repo;
    runner
        .run(symbols, move |symbol| async move {
            let last = repo.last_date(&symbol, timeframe).await?;
            let start = resolve_start(last, loader.overlap_days, first_date);
            if start > end {
                return Ok(ItemOutcome::Skipped);
            }

            let ticker = source.vendor_ticker(&symbol);
            let fetched = retry_fixed(policy, &ticker, || {
                provider.fetch_bars(&ticker, timeframe, start, end)
            })
            .await;
            tokio::time::sleep(delay).await;
            let bars = fetched?;

            if bars.is_empty() {
                return Ok(ItemOutcome::Empty);
            }

            let received = bars.len();
            let bars: Vec<_> = bars
                .into_iter()
                .filter(|b| b.is_consistent())
                .map(|mut b| {
                    b.symbol = symbol.clone();
                    b
                })
                .collect();
            if bars.len() < received {
                tracing::debug!(
                    symbol = %symbol,
                    dropped = received - bars.len(),
                    "OHLC가 맞지 않는 바 제외"
                );
            }

            let rows = repo.upsert_bars(timeframe, &bars, provider.name()).await?;
            ItemResult::Ok(ItemOutcome::Saved(rows))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_start_with_overlap() {
        let start = resolve_start(Some(date(2024, 6, 28)), 5, date(2000, 1, 1));
        assert_eq!(start, date(2024, 6, 23));
    }

    #[test]
    fn test_resolve_start_without_history() {
        assert_eq!(resolve_start(None, 5, date(2000, 1, 1)), date(2000, 1, 1));
    }

    #[test]
    fn test_resolve_start_never_before_history_start() {
        let start = resolve_start(Some(date(2000, 1, 3)), 5, date(2000, 1, 1));
        assert_eq!(start, date(2000, 1, 1));
    }

    #[test]
    fn test_vendor_ticker() {
        assert_eq!(PriceSource::Yahoo.vendor_ticker("BRK.B"), "BRK-B");
        assert_eq!(PriceSource::Alpaca.vendor_ticker("brk-b"), "BRK.B");
    }

    #[test]
    fn test_source_parse() {
        assert_eq!("Yahoo".parse::<PriceSource>(), Ok(PriceSource::Yahoo));
        assert_eq!("alpaca".parse::<PriceSource>(), Ok(PriceSource::Alpaca));
        assert!("polygon".parse::<PriceSource>().is_err());
    }

    #[test]
    fn test_history_start_parse() {
        let mut loader = LoaderConfig::default();
        assert_eq!(history_start(&loader).unwrap(), date(2000, 1, 1));
        loader.history_start = "01/01/2000".to_string();
        assert!(matches!(history_start(&loader), Err(CollectorError::Config(_))));
    }
}
