//! 에러 타입 정의.

use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 데이터베이스 에러
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 데이터 소스/저장소 에러
    #[error("Data error: {0}")]
    Data(#[from] loader_data::DataError),

    /// 스코어링 설정 에러
    #[error("Scoring error: {0}")]
    Scoring(#[from] loader_analytics::ScoringError),

    /// 잘못된 명령 인자
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_converts() {
        let err: CollectorError = loader_data::DataError::FetchError("HTTP 403".into()).into();
        assert!(matches!(err, CollectorError::Data(_)));
        assert!(err.to_string().contains("HTTP 403"));
    }
}
