//! 차트 패턴 인식.
//!
//! 오름차순 가격 바에서 스윙 포인트를 찾고, 그 위에서 다음을 감지합니다:
//!
//! - 플로어 피벗 포인트, 피보나치 되돌림/확장 레벨
//! - 헤드앤숄더 / 역헤드앤숄더
//! - 이중 천장 / 이중 바닥
//! - 상승/하락/대칭 삼각형
//! - 하모닉 XABCD 패턴 (Gartley, Butterfly, Bat, Crab)
//!
//! 모든 감지기는 상태가 없으며 호출마다 독립적으로 동작합니다.

pub mod chart;
pub mod harmonic;
pub mod levels;
pub mod pivots;
pub mod recognizer;

use loader_core::{PatternDirection, PatternSettings};
use serde::Serialize;
use std::fmt;

pub use levels::{FibonacciLevel, FibonacciLevels, PivotPoints};
pub use pivots::{find_peaks, find_troughs, swing_points, SwingKind, SwingPoint};
pub use recognizer::{PatternRecognizer, PatternReport};

/// 감지 가능한 패턴 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    HeadAndShoulders,
    InverseHeadAndShoulders,
    DoubleTop,
    DoubleBottom,
    AscendingTriangle,
    DescendingTriangle,
    SymmetricalTriangle,
    Gartley,
    Butterfly,
    Bat,
    Crab,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::HeadAndShoulders => "head_and_shoulders",
            PatternKind::InverseHeadAndShoulders => "inverse_head_and_shoulders",
            PatternKind::DoubleTop => "double_top",
            PatternKind::DoubleBottom => "double_bottom",
            PatternKind::AscendingTriangle => "ascending_triangle",
            PatternKind::DescendingTriangle => "descending_triangle",
            PatternKind::SymmetricalTriangle => "symmetrical_triangle",
            PatternKind::Gartley => "gartley",
            PatternKind::Butterfly => "butterfly",
            PatternKind::Bat => "bat",
            PatternKind::Crab => "crab",
        }
    }

    pub fn is_harmonic(&self) -> bool {
        matches!(
            self,
            PatternKind::Gartley | PatternKind::Butterfly | PatternKind::Bat | PatternKind::Crab
        )
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 패턴을 구성하는 이름 붙은 스윙 포인트.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyPoint {
    pub label: &'static str,
    pub point: SwingPoint,
}

impl KeyPoint {
    pub fn new(label: &'static str, point: SwingPoint) -> Self {
        Self { label, point }
    }
}

/// 감지된 패턴 (봉 인덱스 기준).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedPattern {
    pub kind: PatternKind,
    pub direction: PatternDirection,
    /// 0~1
    pub confidence: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub price_target: Option<f64>,
    pub points: Vec<KeyPoint>,
    /// 패턴별 수치 (넥라인, 기울기, 피보나치 비율 등)
    pub details: serde_json::Value,
}

impl DetectedPattern {
    /// 저장용 이름. 하모닉 패턴은 방향을 앞에 붙입니다 (예: `bullish_gartley`).
    pub fn name(&self) -> String {
        if self.kind.is_harmonic() {
            format!("{}_{}", self.direction.as_str(), self.kind.as_str())
        } else {
            self.kind.as_str().to_string()
        }
    }
}

/// 패턴 감지 파라미터.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternConfig {
    /// 피벗 판정 시 좌우 비교 봉 수
    pub order: usize,
    /// 가격 유사 판정 허용 오차 (비율)
    pub tolerance: f64,
    /// 이중 천장/바닥의 최소 골 깊이 (비율)
    pub min_depth: f64,
    /// 평균 가격 대비 최소 돌출도 (비율)
    pub min_prominence: f64,
    /// 봉당 평탄 판정 기울기 (평균 가격 대비 비율)
    pub flat_slope: f64,
    /// 피보나치 스윙 탐색 구간 (봉 수)
    pub fib_lookback: usize,
    /// 최소 신뢰도 (0~1)
    pub min_confidence: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            order: 5,
            tolerance: 0.03,
            min_depth: 0.03,
            min_prominence: 0.0,
            flat_slope: 0.0005,
            fib_lookback: 120,
            min_confidence: 0.5,
        }
    }
}

impl From<&PatternSettings> for PatternConfig {
    fn from(settings: &PatternSettings) -> Self {
        Self {
            order: settings.pivot_order.max(1),
            tolerance: settings.tolerance,
            min_confidence: settings.min_confidence,
            ..Self::default()
        }
    }
}

pub(crate) fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
