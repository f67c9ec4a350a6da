//! 기술적 지표 모듈.
//!
//! 저장된 가격 바(오름차순)로 `technical_data_*` 테이블의 지표를 계산합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균
//! - **EMA**: 지수 이동평균 (SMA로 시작)
//! - **MACD**: 12/26/9
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Wilder 평활, 14)
//! - **ROC / Momentum**: 10기간
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger Bands**: 20, 2σ
//! - **ATR**: 평균 실제 범위 (14)
//!
//! ## 거래량 지표
//! - **OBV**: 누적 거래량 균형
//!
//! # 사용 예시
//!
//! ```ignore
//! use loader_analytics::indicators::TechnicalSnapshot;
//!
//! let rows = TechnicalSnapshot::compute(&bars);
//! ```

pub mod momentum;
pub mod snapshot;
pub mod trend;
pub mod volatility;
pub mod volume;

use thiserror::Error;

pub use momentum::{MomentumCalculator, RocParams, RsiParams};
pub use snapshot::TechnicalSnapshot;
pub use trend::{EmaParams, MacdParams, MacdResult, SmaParams, TrendIndicators};
pub use volatility::{AtrParams, BollingerBandsParams, BollingerBandsResult, VolatilityIndicators};
pub use volume::ObvIndicator;

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;
