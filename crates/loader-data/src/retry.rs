//! 고정 간격 재시도.
//!
//! 외부 API 호출은 일시적 오류(네트워크, 429, 5xx, 타임아웃)에 한해
//! 고정된 대기 시간 후 다시 시도합니다. 대기 시간은 늘어나지 않습니다.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Result;

/// 재시도 정책.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (첫 시도 포함, 최소 1)
    pub max_attempts: u32,
    /// 시도 사이 대기 시간
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// 재시도하지 않는 정책.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// `op`을 실행하고, 재시도 가능한 오류면 `policy.delay`만큼 쉰 뒤 다시 실행합니다.
///
/// 재시도 불가능한 오류나 마지막 시도의 오류는 그대로 반환합니다.
pub async fn retry_fixed<T, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                warn!(
                    label = label,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    error = %e,
                    "일시적 오류, 재시도 대기"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_errors_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_fixed(RetryPolicy::new(3, Duration::from_secs(5)), "test", || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(DataError::Network("reset".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_retry_permanent_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> = retry_fixed(RetryPolicy::default(), "test", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DataError::FetchError("HTTP 401".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(DataError::FetchError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> = retry_fixed(RetryPolicy::new(2, Duration::from_millis(10)), "test", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DataError::RateLimited("429".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(DataError::RateLimited(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
