//! 거시경제 시리즈 (FRED).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 시리즈 메타데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicSeries {
    pub series_id: String,
    pub title: String,
    pub frequency: Option<String>,
    pub units: Option<String>,
    pub seasonal_adjustment: Option<String>,
}

/// 시리즈 관측치. FRED가 "."으로 보고한 결측값은 `None`입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroObservation {
    pub series_id: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
}
