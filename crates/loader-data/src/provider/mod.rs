//! 외부 데이터 제공자.
//!
//! - [`YahooPriceProvider`]: Yahoo Finance 가격 바
//! - [`YahooFundamentalsClient`]: Yahoo Finance 재무제표/핵심 지표
//! - [`AlpacaClient`]: Alpaca 자산 목록 및 가격 바
//! - [`CoinGeckoClient`]: 암호화폐 시장 데이터
//! - [`FredClient`]: FRED 거시경제 시리즈

pub mod alpaca;
pub mod coingecko;
pub mod fred;
pub mod yahoo;
pub mod yahoo_fundamentals;

pub use alpaca::{AlpacaAsset, AlpacaClient, AlpacaCredentials};
pub use coingecko::CoinGeckoClient;
pub use fred::FredClient;
pub use yahoo::YahooPriceProvider;
pub use yahoo_fundamentals::YahooFundamentalsClient;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use loader_core::{PriceBar, Timeframe};

use crate::error::{DataError, Result};

/// 가격 바 제공자.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// 제공자 이름 (`price_*.source` 컬럼 값).
    fn name(&self) -> &'static str;

    /// `[start, end]` 구간의 바를 날짜 오름차순으로 반환합니다.
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>>;
}

/// 공통 HTTP 클라이언트를 생성합니다.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent("Mozilla/5.0 (compatible; market-loader/0.1)")
        .build()
        .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))
}

/// 2xx가 아니면 상태 코드를 오류로 변환합니다.
pub(crate) fn ensure_success(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(DataError::from_status(status, context))
    }
}

/// 밀리초 단위 UNIX 타임스탬프를 UTC 날짜로 변환합니다.
pub(crate) fn date_from_millis(millis: i64) -> Option<NaiveDate> {
    chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

/// 초 단위 UNIX 타임스탬프를 UTC 날짜로 변환합니다.
pub(crate) fn date_from_secs(secs: i64) -> Option<NaiveDate> {
    chrono::DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}
