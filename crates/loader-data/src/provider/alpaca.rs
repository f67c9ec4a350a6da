//! Alpaca REST 클라이언트.
//!
//! - 트레이딩 API `/v2/assets`: 상장 종목 목록
//! - 데이터 API `/v2/stocks/{symbol}/bars`: 가격 바 (`next_page_token` 페이지네이션)

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use loader_core::{MarketType, PriceBar, SymbolInfo, Timeframe};

use super::{build_http_client, ensure_success, PriceProvider};
use crate::error::{DataError, Result};

/// 페이지당 최대 바 수 (Alpaca 상한).
const PAGE_LIMIT: u32 = 10_000;

/// Alpaca API 키 쌍.
#[derive(Clone)]
pub struct AlpacaCredentials {
    pub api_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for AlpacaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaCredentials")
            .field("api_key", &"***")
            .field("secret_key", &"***")
            .finish()
    }
}

impl AlpacaCredentials {
    /// `APCA_API_KEY_ID`/`APCA_API_SECRET_KEY`, 없으면 `ALPACA_API_KEY`/`ALPACA_SECRET_KEY`를 읽습니다.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("APCA_API_KEY_ID")
            .or_else(|_| std::env::var("ALPACA_API_KEY"))
            .map_err(|_| DataError::ConfigError("APCA_API_KEY_ID (or ALPACA_API_KEY) not set".into()))?;
        let secret_key = std::env::var("APCA_API_SECRET_KEY")
            .or_else(|_| std::env::var("ALPACA_SECRET_KEY"))
            .map_err(|_| {
                DataError::ConfigError("APCA_API_SECRET_KEY (or ALPACA_SECRET_KEY) not set".into())
            })?;
        Ok(Self { api_key, secret_key })
    }
}

/// `/v2/assets` 응답 항목.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaAsset {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default, rename = "class")]
    pub asset_class: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tradable: bool,
}

impl AlpacaAsset {
    /// 적재 대상 여부: 활성, 거래 가능, OTC 제외.
    pub fn is_loadable(&self) -> bool {
        self.tradable
            && self.status.as_deref().map(|s| s == "active").unwrap_or(true)
            && !self
                .exchange
                .as_deref()
                .map(|e| e.eq_ignore_ascii_case("OTC"))
                .unwrap_or(false)
    }

    pub fn to_symbol_info(&self) -> SymbolInfo {
        let market_type = if self
            .name
            .as_deref()
            .map(|n| n.to_uppercase().contains(" ETF"))
            .unwrap_or(false)
        {
            MarketType::Etf
        } else {
            MarketType::Stock
        };

        let mut info = SymbolInfo::new(self.symbol.replace('/', "."), market_type);
        info.name = self.name.clone();
        info.exchange = self.exchange.clone();
        info.is_active = self.is_loadable();
        info
    }
}

#[derive(Debug, Deserialize)]
struct BarsResponse {
    #[serde(default)]
    bars: Option<Vec<AlpacaBar>>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlpacaBar {
    t: DateTime<Utc>,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

/// Alpaca REST 클라이언트.
pub struct AlpacaClient {
    client: reqwest::Client,
    trading_url: String,
    data_url: String,
    feed: String,
    credentials: AlpacaCredentials,
}

impl AlpacaClient {
    pub fn new(
        credentials: AlpacaCredentials,
        trading_url: impl Into<String>,
        data_url: impl Into<String>,
        feed: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            trading_url: trading_url.into().trim_end_matches('/').to_string(),
            data_url: data_url.into().trim_end_matches('/').to_string(),
            feed: feed.into(),
            credentials,
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            HeaderValue::from_str(&self.credentials.api_key)
                .map_err(|_| DataError::ConfigError("API key contains invalid header characters".into()))?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            HeaderValue::from_str(&self.credentials.secret_key)
                .map_err(|_| DataError::ConfigError("Secret key contains invalid header characters".into()))?,
        );
        Ok(headers)
    }

    /// 활성 미국 주식 자산 목록.
    #[instrument(skip(self))]
    pub async fn list_assets(&self) -> Result<Vec<AlpacaAsset>> {
        let url = format!("{}/v2/assets", self.trading_url);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .query(&[("status", "active"), ("asset_class", "us_equity")])
            .send()
            .await?;

        let assets: Vec<AlpacaAsset> = ensure_success(response, "Alpaca assets")?.json().await?;
        debug!(count = assets.len(), "Alpaca 자산 목록 조회 완료");
        Ok(assets)
    }

    /// 가격 바를 모든 페이지에 걸쳐 가져옵니다.
    #[instrument(skip(self), fields(symbol = symbol))]
    pub async fn get_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let url = format!("{}/v2/stocks/{}/bars", self.data_url, symbol);
        let mut page_token: Option<String> = None;
        let mut bars = Vec::new();
        let mut pages = 0u32;

        loop {
            let mut query: Vec<(&str, String)> = vec![
                ("timeframe", timeframe.alpaca_timeframe().to_string()),
                ("start", start.format("%Y-%m-%d").to_string()),
                ("end", end.format("%Y-%m-%d").to_string()),
                ("limit", PAGE_LIMIT.to_string()),
                ("adjustment", "all".to_string()),
                ("feed", self.feed.clone()),
            ];
            if let Some(token) = &page_token {
                query.push(("page_token", token.clone()));
            }

            let response = self
                .client
                .get(&url)
                .headers(self.auth_headers()?)
                .query(&query)
                .send()
                .await?;
            let page: BarsResponse =
                ensure_success(response, &format!("Alpaca bars {}", symbol))?.json().await?;
            pages += 1;

            for bar in page.bars.unwrap_or_default() {
                if let Some(converted) = convert_bar(symbol, timeframe, &bar) {
                    bars.push(converted);
                }
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        bars.sort_by_key(|b: &PriceBar| b.date);
        bars.dedup_by_key(|b| b.date);
        debug!(symbol = symbol, pages = pages, bars = bars.len(), "Alpaca 바 조회 완료");
        Ok(bars)
    }
}

fn convert_bar(symbol: &str, timeframe: Timeframe, bar: &AlpacaBar) -> Option<PriceBar> {
    if !(bar.c.is_finite() && bar.c > 0.0) {
        return None;
    }
    let to_dec = |v: f64| Decimal::from_f64_retain(v).map(|d| d.round_dp(6));
    let close = to_dec(bar.c)?;
    let mut out = PriceBar::new(
        symbol,
        timeframe,
        bar.t.date_naive(),
        to_dec(bar.o).unwrap_or(close),
        to_dec(bar.h).unwrap_or(close),
        to_dec(bar.l).unwrap_or(close),
        close,
        bar.v.max(0.0).round() as i64,
    );
    // adjustment=all 이므로 종가가 곧 수정 종가입니다.
    out.adj_close = Some(close);
    Some(out)
}

#[async_trait]
impl PriceProvider for AlpacaClient {
    fn name(&self) -> &'static str {
        "alpaca"
    }

    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        self.get_bars(symbol, timeframe, start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(exchange: &str, tradable: bool, name: &str) -> AlpacaAsset {
        AlpacaAsset {
            symbol: "BRK/B".into(),
            name: Some(name.into()),
            exchange: Some(exchange.into()),
            asset_class: Some("us_equity".into()),
            status: Some("active".into()),
            tradable,
        }
    }

    #[test]
    fn test_asset_filter() {
        assert!(asset("NYSE", true, "Berkshire").is_loadable());
        assert!(!asset("OTC", true, "Pink sheet").is_loadable());
        assert!(!asset("NASDAQ", false, "Halted").is_loadable());
    }

    #[test]
    fn test_asset_to_symbol_info() {
        let info = asset("ARCA", true, "SPDR S&P 500 ETF Trust").to_symbol_info();
        assert_eq!(info.symbol, "BRK.B");
        assert_eq!(info.market_type, MarketType::Etf);
        assert_eq!(info.exchange.as_deref(), Some("ARCA"));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = AlpacaCredentials {
            api_key: "PKTEST".into(),
            secret_key: "secret".into(),
        };
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("PKTEST"));
        assert!(!debug.contains("secret\""));
    }
}
