//! 시장 데이터 배치 작업.
//!
//! 이 crate는 cron에서 독립적으로 실행되는 작업을 제공합니다:
//! - 종목 마스터 동기화 (Alpaca)
//! - 가격 바 증분 적재 (Yahoo Finance, Alpaca)
//! - 기술적 지표, 재무제표, 암호화폐, 거시경제 적재
//! - 팩터 지표 계산, 종합 점수 산출, 차트 패턴 감지

pub mod error;
pub mod modules;
pub mod stats;

pub use error::{CollectorError, Result};
pub use stats::{CollectionStats, ItemOutcome, ItemResult};
