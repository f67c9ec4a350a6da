//! 워크플로우 체크포인트 관리 모듈.
//!
//! 장시간 실행되는 심볼 단위 작업의 중단/재개를 지원합니다.
//! 일정 개수(`loader.checkpoint_interval`)를 처리할 때마다 마지막 티커를 저장하고,
//! `--resume`으로 실행하면 그 다음 티커부터 이어서 처리합니다.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::Result;

/// 체크포인트 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointStatus {
    /// 실행 중
    Running,
    /// 중단됨 (재개 가능)
    Interrupted,
    /// 완료됨
    Completed,
    /// 유휴 상태
    Idle,
}

impl CheckpointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Interrupted => "interrupted",
            Self::Completed => "completed",
            Self::Idle => "idle",
        }
    }

    /// 재개 가능한 상태인지. 비정상 종료로 `running`이 남은 경우도 포함합니다.
    pub fn is_resumable(&self) -> bool {
        matches!(self, Self::Running | Self::Interrupted)
    }
}

impl std::str::FromStr for CheckpointStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "interrupted" => Ok(Self::Interrupted),
            "completed" => Ok(Self::Completed),
            "idle" => Ok(Self::Idle),
            _ => Err(format!("Unknown checkpoint status: {}", s)),
        }
    }
}

/// 체크포인트 저장.
///
/// * `ticker` - 마지막으로 처리한 티커 (완료 시 `None`)
pub async fn save_checkpoint(
    pool: &PgPool,
    workflow: &str,
    ticker: Option<&str>,
    total_processed: i32,
    status: CheckpointStatus,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sync_checkpoint (workflow_name, last_ticker, last_processed_at, total_processed, status, updated_at)
        VALUES ($1, $2, NOW(), $3, $4, NOW())
        ON CONFLICT (workflow_name)
        DO UPDATE SET
            last_ticker = EXCLUDED.last_ticker,
            last_processed_at = NOW(),
            total_processed = EXCLUDED.total_processed,
            status = EXCLUDED.status,
            updated_at = NOW()
        "#,
    )
    .bind(workflow)
    .bind(ticker)
    .bind(total_processed)
    .bind(status.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

/// 중단된 워크플로우의 마지막 티커.
///
/// 완료되었거나 체크포인트가 없으면 `None`입니다.
pub async fn load_checkpoint(pool: &PgPool, workflow: &str) -> Result<Option<String>> {
    let row: Option<(Option<String>, String)> = sqlx::query_as(
        "SELECT last_ticker, status FROM sync_checkpoint WHERE workflow_name = $1",
    )
    .bind(workflow)
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(|(ticker, status)| {
        let resumable = status
            .parse::<CheckpointStatus>()
            .map(|s| s.is_resumable())
            .unwrap_or(false);
        if resumable {
            ticker.filter(|t| !t.is_empty())
        } else {
            None
        }
    }))
}

/// 실행 중인 모든 워크플로우를 `interrupted`로 표시합니다.
///
/// 종료 신호를 받았을 때 호출하여 다음 실행에서 재개할 수 있게 합니다.
pub async fn mark_interrupted(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE sync_checkpoint
        SET status = 'interrupted', updated_at = NOW()
        WHERE status = 'running'
        "#,
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// 워크플로우 체크포인트 삭제 (완전 초기화).
pub async fn clear_checkpoint(pool: &PgPool, workflow: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sync_checkpoint WHERE workflow_name = $1")
        .bind(workflow)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// 체크포인트 정보
#[derive(Debug, sqlx::FromRow)]
pub struct CheckpointInfo {
    pub workflow_name: String,
    pub last_ticker: Option<String>,
    pub last_processed_at: Option<DateTime<Utc>>,
    pub total_processed: i32,
    pub status: String,
}

/// 모든 워크플로우의 체크포인트 상태 조회.
pub async fn list_checkpoints(pool: &PgPool) -> Result<Vec<CheckpointInfo>> {
    let rows = sqlx::query_as::<_, CheckpointInfo>(
        r#"
        SELECT workflow_name, last_ticker, last_processed_at, total_processed, status
        FROM sync_checkpoint
        ORDER BY workflow_name
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// 체크포인트 이후에 처리할 심볼.
///
/// `last`가 목록에 있으면 그 다음부터, 없으면 전체를 반환합니다.
/// 두 번째 값은 건너뛴 심볼 수입니다.
pub fn remaining_after(symbols: Vec<String>, last: Option<&str>) -> (Vec<String>, usize) {
    let Some(last) = last else {
        return (symbols, 0);
    };
    match symbols.iter().position(|s| s == last) {
        Some(pos) => {
            let skipped = pos + 1;
            (symbols.into_iter().skip(skipped).collect(), skipped)
        }
        None => (symbols, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            CheckpointStatus::Running,
            CheckpointStatus::Interrupted,
            CheckpointStatus::Completed,
            CheckpointStatus::Idle,
        ] {
            assert_eq!(status.as_str().parse::<CheckpointStatus>(), Ok(status));
        }
        assert!("paused".parse::<CheckpointStatus>().is_err());
    }

    #[test]
    fn test_resumable_states() {
        assert!(CheckpointStatus::Interrupted.is_resumable());
        assert!(CheckpointStatus::Running.is_resumable());
        assert!(!CheckpointStatus::Completed.is_resumable());
        assert!(!CheckpointStatus::Idle.is_resumable());
    }

    #[test]
    fn test_remaining_after_checkpoint() {
        let (rest, skipped) = remaining_after(tickers(&["AAPL", "MSFT", "NVDA", "TSLA"]), Some("MSFT"));
        assert_eq!(rest, tickers(&["NVDA", "TSLA"]));
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_remaining_after_unknown_or_missing() {
        let all = tickers(&["AAPL", "MSFT"]);
        assert_eq!(remaining_after(all.clone(), Some("ZZZZ")), (all.clone(), 0));
        assert_eq!(remaining_after(all.clone(), None), (all, 0));
    }

    #[test]
    fn test_remaining_after_last_symbol() {
        let (rest, skipped) = remaining_after(tickers(&["AAPL", "MSFT"]), Some("MSFT"));
        assert!(rest.is_empty());
        assert_eq!(skipped, 2);
    }
}
