//! 통계, 기술적 지표, 팩터 지표, 스코어링, 차트 패턴 인식.
//!
//! 이 크레이트는 데이터베이스나 네트워크에 의존하지 않는 순수 계산만 제공합니다:
//! - [`stats`]: z-score, 윈저라이징, 백분위, 수익률/변동성 등 기본 통계
//! - [`indicators`]: `technical_data_*` 테이블용 기술적 지표
//! - [`metrics`]: 성장/품질/가치/모멘텀/안정성/수급 지표 계산기
//! - [`scoring`]: z-score 및 섹터 백분위 종합 점수
//! - [`patterns`]: 피벗, 피보나치, 헤드앤숄더, 삼각형, 하모닉 패턴

pub mod indicators;
pub mod metrics;
pub mod patterns;
pub mod scoring;
pub mod stats;

pub use indicators::{IndicatorError, IndicatorResult, TechnicalSnapshot};
pub use metrics::{MetricInput, MetricSet};
pub use patterns::{PatternConfig, PatternRecognizer, PatternReport};
pub use scoring::{scorer_for, FactorScorer, ScoringError, ScoringResult, SectorScorer, ZScoreScorer};
