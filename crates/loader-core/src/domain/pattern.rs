//! 차트 패턴 감지 결과 (`pattern_detections`).

use crate::types::Timeframe;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 패턴이 암시하는 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternDirection {
    Bullish,
    Bearish,
    Neutral,
}

impl PatternDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternDirection::Bullish => "bullish",
            PatternDirection::Bearish => "bearish",
            PatternDirection::Neutral => "neutral",
        }
    }
}

/// 저장 가능한 패턴 감지 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDetection {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// 감지를 수행한 날짜 (분석 구간의 마지막 봉)
    pub detected_on: NaiveDate,
    /// 패턴 이름 (예: "head_and_shoulders", "bullish_gartley")
    pub pattern_type: String,
    pub direction: PatternDirection,
    /// 0~1
    pub confidence: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_target: Option<f64>,
    /// 패턴별 세부 정보 (핵심 가격, 비율 등)
    pub details: serde_json::Value,
}
