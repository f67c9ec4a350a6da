//! 암호화폐 시장 데이터 (CoinGecko).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 코인별 시장 스냅샷 (`/coins/markets`의 한 항목).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoMarket {
    /// CoinGecko 코인 ID (예: "bitcoin")
    pub coin_id: String,
    /// 스냅샷 날짜 (UTC)
    pub date: NaiveDate,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<i32>,
    pub total_volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub price_change_24h_pct: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub ath: Option<f64>,
}

/// 코인 일별 가격.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoPricePoint {
    pub coin_id: String,
    pub date: NaiveDate,
    pub price: f64,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
}
