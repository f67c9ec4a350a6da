//! 외부 데이터 제공자와 PostgreSQL 저장소.
//!
//! 이 crate는 다음을 제공합니다:
//! - Yahoo Finance / Alpaca 가격 데이터 제공자
//! - Yahoo 재무제표 및 주요 통계 클라이언트
//! - CoinGecko 암호화폐 시세, FRED 거시경제 시리즈
//! - 멱등 upsert 기반 저장소
//! - 고정 지연 재시도

pub mod error;
pub mod provider;
pub mod retry;
pub mod storage;

pub use error::{DataError, Result};
pub use retry::{retry_fixed, RetryPolicy};

pub use provider::{
    AlpacaAsset, AlpacaClient, AlpacaCredentials, CoinGeckoClient, FredClient, PriceProvider,
    YahooFundamentalsClient, YahooPriceProvider,
};

pub use storage::{
    price_table, technical_table, CryptoRepository, Database, FundamentalRepository,
    MacroRepository, MetricsRepository, PatternRepository, PriceRepository, ScoreRepository,
    SymbolRepository, TechnicalRepository,
};
