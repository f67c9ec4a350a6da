//! 종합 점수 행 (`stock_scores`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 점수 산출 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMethod {
    /// 전체 유니버스 대비 z-score
    ZScore,
    /// 섹터 내 백분위
    Sector,
}

impl ScoreMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreMethod::ZScore => "zscore",
            ScoreMethod::Sector => "sector",
        }
    }
}

impl fmt::Display for ScoreMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zscore" | "z-score" | "z" => Ok(ScoreMethod::ZScore),
            "sector" | "sector-relative" | "percentile" => Ok(ScoreMethod::Sector),
            _ => Err(format!("Unknown score method: {}", s)),
        }
    }
}

/// 종목별 종합/팩터 점수 (0~100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockScore {
    pub symbol: String,
    pub date: NaiveDate,
    pub method: ScoreMethod,
    pub sector: Option<String>,
    pub composite_score: f64,
    pub quality_score: Option<f64>,
    pub growth_score: Option<f64>,
    pub value_score: Option<f64>,
    pub momentum_score: Option<f64>,
    pub stability_score: Option<f64>,
    pub positioning_score: Option<f64>,
    /// 종합 점수에 반영된 팩터 수
    pub factor_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_method_parse() {
        assert_eq!("zscore".parse::<ScoreMethod>().unwrap(), ScoreMethod::ZScore);
        assert_eq!("SECTOR".parse::<ScoreMethod>().unwrap(), ScoreMethod::Sector);
        assert!("rank".parse::<ScoreMethod>().is_err());
        assert_eq!(ScoreMethod::Sector.to_string(), "sector");
    }
}
