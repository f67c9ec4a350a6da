//! PostgreSQL 연결 풀.
//!
//! 모든 로더 작업은 하나의 [`Database`] 풀을 공유합니다. 동시에 실행되는
//! 심볼 작업들은 풀에서 연결을 빌려 쓰고 바로 반납합니다.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use loader_core::DatabaseConfig;

use crate::error::{DataError, Result};

/// 공유 연결 풀.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// 풀 사용 현황.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: usize,
}

impl Database {
    /// 설정대로 풀을 열고 `SELECT 1`로 연결을 확인합니다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(
            target_db = %redact_url(&config.url),
            max_connections = config.max_connections,
            "데이터베이스 연결 중"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .min_connections(config.min_connections.min(config.max_connections))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let db = Self { pool };
        db.ping().await?;
        info!("데이터베이스 연결 완료");
        Ok(db)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }

    /// `migrations/`의 스키마를 적용합니다. 이미 적용된 버전은 건너뜁니다.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DataError::MigrationError(e.to_string()))?;

        info!("스키마 마이그레이션 완료");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;
        Ok(())
    }

    /// 풀을 닫습니다. 진행 중인 연결은 반납될 때 닫힙니다.
    pub async fn close(&self) {
        let status = self.status();
        debug!(size = status.size, idle = status.idle, "연결 풀 종료");
        self.pool.close().await;
    }
}

/// 로그용으로 URL의 비밀번호를 가립니다.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.rsplit_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or("");
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}
