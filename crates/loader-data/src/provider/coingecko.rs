//! CoinGecko REST 클라이언트.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use loader_core::{CryptoMarket, CryptoPricePoint};

use super::{build_http_client, date_from_millis, ensure_success};
use crate::error::Result;

/// `/coins/markets` 페이지 크기 상한.
const MAX_PER_PAGE: usize = 250;

#[derive(Debug, Deserialize)]
struct MarketEntry {
    id: String,
    symbol: String,
    name: String,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    market_cap_rank: Option<i32>,
    total_volume: Option<f64>,
    high_24h: Option<f64>,
    low_24h: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    circulating_supply: Option<f64>,
    total_supply: Option<f64>,
    ath: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(f64, Option<f64>)>,
    #[serde(default)]
    market_caps: Vec<(f64, Option<f64>)>,
    #[serde(default)]
    total_volumes: Vec<(f64, Option<f64>)>,
}

/// CoinGecko 클라이언트.
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.api_key {
            Some(key) => request.header("x-cg-demo-api-key", key),
            None => request,
        }
    }

    /// 시가총액 상위 `top_n`개 코인의 시장 스냅샷.
    #[instrument(skip(self))]
    pub async fn top_markets(&self, top_n: usize) -> Result<Vec<CryptoMarket>> {
        let url = format!("{}/coins/markets", self.base_url);
        let per_page = top_n.clamp(1, MAX_PER_PAGE);
        let today = Utc::now().date_naive();
        let mut markets = Vec::with_capacity(top_n);
        let mut page = 1usize;

        while markets.len() < top_n {
            let response = self
                .get(&url)
                .query(&[
                    ("vs_currency", "usd".to_string()),
                    ("order", "market_cap_desc".to_string()),
                    ("per_page", per_page.to_string()),
                    ("page", page.to_string()),
                    ("sparkline", "false".to_string()),
                ])
                .send()
                .await?;
            let entries: Vec<MarketEntry> = ensure_success(response, "CoinGecko markets")?.json().await?;
            let fetched = entries.len();

            markets.extend(entries.into_iter().map(|e| CryptoMarket {
                coin_id: e.id,
                date: today,
                symbol: e.symbol.to_uppercase(),
                name: e.name,
                current_price: e.current_price,
                market_cap: e.market_cap,
                market_cap_rank: e.market_cap_rank,
                total_volume: e.total_volume,
                high_24h: e.high_24h,
                low_24h: e.low_24h,
                price_change_24h_pct: e.price_change_percentage_24h,
                circulating_supply: e.circulating_supply,
                total_supply: e.total_supply,
                ath: e.ath,
            }));

            if fetched < per_page {
                break;
            }
            page += 1;
        }

        markets.truncate(top_n);
        debug!(count = markets.len(), "CoinGecko 시장 스냅샷 조회 완료");
        Ok(markets)
    }

    /// 코인의 일별 가격 이력.
    #[instrument(skip(self))]
    pub async fn daily_prices(&self, coin_id: &str, days: u32) -> Result<Vec<CryptoPricePoint>> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, coin_id);
        let response = self
            .get(&url)
            .query(&[
                ("vs_currency", "usd".to_string()),
                ("days", days.to_string()),
                ("interval", "daily".to_string()),
            ])
            .send()
            .await?;
        let chart: MarketChart =
            ensure_success(response, &format!("CoinGecko market_chart {}", coin_id))?.json().await?;

        Ok(chart_to_daily(coin_id, &chart))
    }
}

/// 시계열 점들을 UTC 일 단위로 묶습니다. 같은 날의 점이 여러 개면 마지막 값이 남습니다.
fn chart_to_daily(coin_id: &str, chart: &MarketChart) -> Vec<CryptoPricePoint> {
    let by_day = |points: &[(f64, Option<f64>)]| -> BTreeMap<NaiveDate, f64> {
        let mut map = BTreeMap::new();
        for (ts, value) in points {
            if let (Some(date), Some(v)) = (date_from_millis(*ts as i64), value) {
                if v.is_finite() {
                    map.insert(date, *v);
                }
            }
        }
        map
    };

    let prices = by_day(&chart.prices);
    let caps = by_day(&chart.market_caps);
    let volumes = by_day(&chart.total_volumes);

    prices
        .into_iter()
        .filter(|(_, price)| *price > 0.0)
        .map(|(date, price)| CryptoPricePoint {
            coin_id: coin_id.to_string(),
            date,
            price,
            market_cap: caps.get(&date).copied(),
            volume: volumes.get(&date).copied(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_to_daily_last_point_wins() {
        let chart = MarketChart {
            prices: vec![
                (1_704_067_200_000.0, Some(42_000.0)),
                (1_704_110_400_000.0, Some(42_500.0)),
                (1_704_153_600_000.0, Some(45_000.0)),
                (1_704_240_000_000.0, None),
            ],
            market_caps: vec![(1_704_067_200_000.0, Some(8.2e11))],
            total_volumes: vec![],
        };

        let points = chart_to_daily("bitcoin", &chart);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(points[0].price, 42_500.0);
        assert_eq!(points[0].market_cap, Some(8.2e11));
        assert_eq!(points[1].volume, None);
    }
}
