//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 중복 레코드
    #[error("Duplicate record: {0}")]
    DuplicateError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 설정 오류 (API 키 누락 등)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 데이터 삽입 오류
    #[error("Insert error: {0}")]
    InsertError(String),

    /// 네트워크 오류 (연결 실패, 5xx)
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 한도 초과 (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// 데이터 가져오기 오류 (외부 소스, 재시도 불가)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl DataError {
    /// 같은 요청을 다시 보내면 성공할 수 있는 오류인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataError::Network(_)
                | DataError::RateLimited(_)
                | DataError::Timeout(_)
                | DataError::PoolExhausted
        )
    }

    /// HTTP 상태 코드를 오류로 분류합니다.
    pub fn from_status(status: reqwest::StatusCode, context: impl std::fmt::Display) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            DataError::RateLimited(format!("{}: HTTP {}", context, status))
        } else if status.is_server_error() || status == reqwest::StatusCode::REQUEST_TIMEOUT {
            DataError::Network(format!("{}: HTTP {}", context, status))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            DataError::NotFound(format!("{}: HTTP {}", context, status))
        } else {
            DataError::FetchError(format!("{}: HTTP {}", context, status))
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // PostgreSQL 고유 제약 조건 위반
                    DataError::DuplicateError(db_err.message().to_string())
                } else {
                    DataError::QueryError(db_err.message().to_string())
                }
            }
            sqlx::Error::Io(e) => DataError::ConnectionError(e.to_string()),
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else if err.is_decode() {
            DataError::ParseError(err.to_string())
        } else if let Some(status) = err.status() {
            DataError::from_status(status, "HTTP request failed")
        } else {
            DataError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            DataError::from_status(StatusCode::TOO_MANY_REQUESTS, "fred"),
            DataError::RateLimited(_)
        ));
        assert!(matches!(
            DataError::from_status(StatusCode::BAD_GATEWAY, "fred"),
            DataError::Network(_)
        ));
        assert!(matches!(
            DataError::from_status(StatusCode::NOT_FOUND, "fred"),
            DataError::NotFound(_)
        ));
        assert!(matches!(
            DataError::from_status(StatusCode::UNAUTHORIZED, "fred"),
            DataError::FetchError(_)
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(DataError::Network("reset".into()).is_retryable());
        assert!(DataError::RateLimited("429".into()).is_retryable());
        assert!(DataError::Timeout("30s".into()).is_retryable());
        assert!(!DataError::FetchError("401".into()).is_retryable());
        assert!(!DataError::ParseError("json".into()).is_retryable());
        assert!(!DataError::NotFound("x".into()).is_retryable());
    }

    #[test]
    fn test_sqlx_row_not_found() {
        let err: DataError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DataError::NotFound(_)));
    }
}
