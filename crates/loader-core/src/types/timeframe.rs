//! 가격 테이블 단위의 타임프레임 정의.
//!
//! 가격/기술지표 테이블은 일봉, 주봉, 월봉 세 가지로만 나뉩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 캔들 타임프레임.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// 일봉
    D1,
    /// 주봉
    W1,
    /// 월봉
    MN1,
}

impl Timeframe {
    /// 지원하는 모든 타임프레임.
    pub const ALL: [Timeframe; 3] = [Timeframe::D1, Timeframe::W1, Timeframe::MN1];

    /// 테이블 이름 접미사 (`price_daily` 등).
    pub fn table_suffix(&self) -> &'static str {
        match self {
            Timeframe::D1 => "daily",
            Timeframe::W1 => "weekly",
            Timeframe::MN1 => "monthly",
        }
    }

    /// Yahoo Finance 간격 문자열.
    pub fn yahoo_interval(&self) -> &'static str {
        match self {
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1wk",
            Timeframe::MN1 => "1mo",
        }
    }

    /// Alpaca 바 타임프레임 문자열.
    pub fn alpaca_timeframe(&self) -> &'static str {
        match self {
            Timeframe::D1 => "1Day",
            Timeframe::W1 => "1Week",
            Timeframe::MN1 => "1Month",
        }
    }

    /// 1년 동안의 대략적인 봉 개수.
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Timeframe::D1 => 252.0,
            Timeframe::W1 => 52.0,
            Timeframe::MN1 => 12.0,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_suffix())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "1d" | "d1" | "day" => Ok(Timeframe::D1),
            "weekly" | "1wk" | "1w" | "w1" | "week" => Ok(Timeframe::W1),
            "monthly" | "1mo" | "1m" | "mn1" | "month" => Ok(Timeframe::MN1),
            _ => Err(format!("Invalid timeframe: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("daily".parse::<Timeframe>().unwrap(), Timeframe::D1);
        assert_eq!("1wk".parse::<Timeframe>().unwrap(), Timeframe::W1);
        assert_eq!("Monthly".parse::<Timeframe>().unwrap(), Timeframe::MN1);
        assert!("4h".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_vendor_strings() {
        assert_eq!(Timeframe::W1.yahoo_interval(), "1wk");
        assert_eq!(Timeframe::MN1.alpaca_timeframe(), "1Month");
        assert_eq!(Timeframe::D1.to_string(), "daily");
    }
}
