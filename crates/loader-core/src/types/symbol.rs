//! 심볼 및 시장 유형 정의.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 시장 유형 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    /// 미국 보통주
    Stock,
    /// 상장지수펀드
    Etf,
    /// 암호화폐
    Crypto,
    /// 지수
    Index,
    /// 거시경제 시리즈
    Economic,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Stock => "stock",
            MarketType::Etf => "etf",
            MarketType::Crypto => "crypto",
            MarketType::Index => "index",
            MarketType::Economic => "economic",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stock" | "us_equity" | "equity" => Ok(MarketType::Stock),
            "etf" => Ok(MarketType::Etf),
            "crypto" => Ok(MarketType::Crypto),
            "index" => Ok(MarketType::Index),
            "economic" => Ok(MarketType::Economic),
            _ => Err(format!("Unknown market type: {}", s)),
        }
    }
}

/// 티커 심볼.
///
/// 티커는 항상 대문자로 정규화됩니다. Yahoo는 클래스 주식을 `BRK-B`로,
/// Alpaca는 `BRK.B`로 표기하므로 제공자별 변환 메서드를 둡니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub ticker: String,
    pub market_type: MarketType,
}

impl Symbol {
    pub fn new(ticker: impl Into<String>, market_type: MarketType) -> Self {
        Self {
            ticker: ticker.into().trim().to_uppercase(),
            market_type,
        }
    }

    pub fn stock(ticker: impl Into<String>) -> Self {
        Self::new(ticker, MarketType::Stock)
    }

    /// Yahoo Finance 표기 (`.` → `-`).
    pub fn yahoo_ticker(&self) -> String {
        self.ticker.replace('.', "-")
    }

    /// Alpaca 표기 (`-` → `.`).
    pub fn alpaca_ticker(&self) -> String {
        self.ticker.replace('-', ".")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ticker)
    }
}

/// 쉼표로 구분된 티커 목록을 파싱합니다. 빈 항목과 중복은 제거됩니다.
pub fn parse_ticker_list(input: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let ticker = raw.trim().to_uppercase();
        if !ticker.is_empty() && !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_normalization() {
        let symbol = Symbol::stock(" brk.b ");
        assert_eq!(symbol.ticker, "BRK.B");
        assert_eq!(symbol.yahoo_ticker(), "BRK-B");
        assert_eq!(Symbol::stock("BF-B").alpaca_ticker(), "BF.B");
    }

    #[test]
    fn test_market_type_parse() {
        assert_eq!("us_equity".parse::<MarketType>().unwrap(), MarketType::Stock);
        assert_eq!(MarketType::Etf.to_string(), "etf");
        assert!("forex".parse::<MarketType>().is_err());
    }

    #[test]
    fn test_parse_ticker_list() {
        assert_eq!(
            parse_ticker_list("aapl, MSFT,,aapl ,nvda"),
            vec!["AAPL", "MSFT", "NVDA"]
        );
        assert!(parse_ticker_list(" , ").is_empty());
    }
}
