//! # Loader Core
//!
//! 시장 데이터 로더의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 로더/계산기/스코어러 전반에서 사용되는 기본 타입을 제공합니다:
//! - 심볼, 시장 유형, 타임프레임
//! - 가격 바(OHLCV), 재무제표, 거시경제 관측치, 암호화폐 스냅샷
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
