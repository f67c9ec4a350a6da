//! 상장 종목 마스터.

use crate::types::MarketType;
use serde::{Deserialize, Serialize};

/// `stock_symbols` 테이블의 한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub market_type: MarketType,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub is_active: bool,
}

impl SymbolInfo {
    pub fn new(symbol: impl Into<String>, market_type: MarketType) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            name: None,
            exchange: None,
            market_type,
            sector: None,
            industry: None,
            is_active: true,
        }
    }

    pub fn is_etf(&self) -> bool {
        self.market_type == MarketType::Etf
    }
}
