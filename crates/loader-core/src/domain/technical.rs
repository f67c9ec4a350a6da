//! 기술적 지표 행 (`technical_data_{daily,weekly,monthly}`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 한 봉 시점의 기술적 지표 값. 워밍업 기간에는 `None`입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub atr: Option<f64>,
    pub roc: Option<f64>,
    pub mom: Option<f64>,
    pub obv: Option<f64>,
    /// 이 봉이 확정된 고점 피벗이면 고가
    pub pivot_high: Option<f64>,
    /// 이 봉이 확정된 저점 피벗이면 저가
    pub pivot_low: Option<f64>,
}

impl TechnicalRow {
    /// 키를 제외한 컬럼 이름 (`values()`와 같은 순서).
    pub const COLUMNS: &'static [&'static str] = &[
        "rsi",
        "macd",
        "macd_signal",
        "macd_hist",
        "sma_20",
        "sma_50",
        "sma_200",
        "ema_12",
        "ema_26",
        "bb_upper",
        "bb_middle",
        "bb_lower",
        "atr",
        "roc",
        "mom",
        "obv",
        "pivot_high",
        "pivot_low",
    ];

    pub fn new(symbol: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            ..Default::default()
        }
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        vec![
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.sma_20,
            self.sma_50,
            self.sma_200,
            self.ema_12,
            self.ema_26,
            self.bb_upper,
            self.bb_middle,
            self.bb_lower,
            self.atr,
            self.roc,
            self.mom,
            self.obv,
            self.pivot_high,
            self.pivot_low,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_match_values() {
        let row = TechnicalRow::new("SPY", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(row.values().len(), TechnicalRow::COLUMNS.len());
    }
}
