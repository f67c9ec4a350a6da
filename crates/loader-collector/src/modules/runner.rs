//! 심볼 단위 작업 실행기.
//!
//! 심볼 목록을 `checkpoint_interval` 크기의 묶음으로 나누고, 묶음 안에서는
//! `buffer_unordered(concurrency)`로 동시에 처리합니다. 한 심볼의 실패는
//! 통계에만 반영되고 나머지 심볼 처리를 멈추지 않습니다.

use std::future::Future;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use loader_core::LoaderConfig;
use sqlx::PgPool;

use super::checkpoint::{load_checkpoint, remaining_after, save_checkpoint, CheckpointStatus};
use crate::stats::{CollectionStats, ItemOutcome, ItemResult};
use crate::Result;

/// 심볼 단위 작업 실행기.
pub struct SymbolRunner<'a> {
    pool: &'a PgPool,
    workflow: String,
    concurrency: usize,
    checkpoint_interval: usize,
    resume: bool,
}

impl<'a> SymbolRunner<'a> {
    pub fn new(pool: &'a PgPool, workflow: impl Into<String>, loader: &LoaderConfig) -> Self {
        Self {
            pool,
            workflow: workflow.into(),
            concurrency: loader.concurrency.max(1),
            checkpoint_interval: loader.checkpoint_interval.max(1),
            resume: false,
        }
    }

    /// 체크포인트 이후부터 재개합니다.
    pub fn resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// 동시 처리 수를 덮어씁니다 (CPU 작업 등).
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// 모든 심볼에 `op`를 실행하고 통계를 반환합니다.
    pub async fn run<F, Fut>(&self, symbols: Vec<String>, op: F) -> Result<CollectionStats>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = ItemResult>,
    {
        let started = Instant::now();
        let mut stats = CollectionStats::new();

        let last = if self.resume {
            load_checkpoint(self.pool, &self.workflow).await?
        } else {
            None
        };
        let (pending, skipped) = remaining_after(symbols, last.as_deref());
        if skipped > 0 {
            tracing::info!(
                workflow = %self.workflow,
                last_ticker = last.as_deref().unwrap_or(""),
                skipped = skipped,
                "체크포인트에서 재개"
            );
        }
        stats.skipped += skipped;

        let total = pending.len();
        tracing::info!(
            workflow = %self.workflow,
            symbols = total,
            concurrency = self.concurrency,
            "작업 시작"
        );

        let mut processed = skipped;
        for chunk in pending.chunks(self.checkpoint_interval) {
            for (_, outcome) in run_chunk(chunk, self.concurrency, &op).await {
                stats.record(&outcome);
            }

            processed += chunk.len();
            if let Some(last) = chunk.last() {
                save_checkpoint(
                    self.pool,
                    &self.workflow,
                    Some(last),
                    processed as i32,
                    CheckpointStatus::Running,
                )
                .await?;
            }
            tracing::info!(
                workflow = %self.workflow,
                progress = format!("{}/{}", processed, total + skipped),
                errors = stats.errors,
                "진행 상황"
            );
        }

        save_checkpoint(
            self.pool,
            &self.workflow,
            None,
            processed as i32,
            CheckpointStatus::Completed,
        )
        .await?;

        stats.elapsed = started.elapsed();
        Ok(stats)
    }
}

/// 한 묶음의 심볼을 `concurrency`개씩 동시에 처리합니다.
///
/// 실패한 심볼은 [`ItemOutcome::Failed`]로 바뀌고 나머지 심볼은 계속 처리됩니다.
/// 결과 순서는 완료 순서입니다.
pub(crate) async fn run_chunk<F, Fut>(
    chunk: &[String],
    concurrency: usize,
    op: &F,
) -> Vec<(String, ItemOutcome)>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = ItemResult>,
{
    let outcomes: Vec<(String, ItemResult)> = stream::iter(chunk.iter().cloned())
        .map(|symbol| {
            let fut = op(symbol.clone());
            async move { (symbol, fut.await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    outcomes
        .into_iter()
        .map(|(symbol, result)| {
            let outcome = result.unwrap_or_else(|e| ItemOutcome::Failed(e.to_string()));
            match &outcome {
                ItemOutcome::Saved(rows) => {
                    tracing::debug!(symbol = %symbol, rows = rows, "저장 완료")
                }
                ItemOutcome::Empty => tracing::debug!(symbol = %symbol, "데이터 없음"),
                ItemOutcome::Skipped => tracing::debug!(symbol = %symbol, "건너뜀"),
                ItemOutcome::Failed(error) => {
                    tracing::warn!(symbol = %symbol, error = %error, "처리 실패")
                }
            }
            (symbol, outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollectorError;

    fn symbols(tickers: &[&str]) -> Vec<String> {
        tickers.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failed_symbol_does_not_stop_chunk() {
        let chunk = symbols(&["AAPL", "MSFT", "BAD", "NVDA", "AMZN"]);
        let op = |symbol: String| async move {
            if symbol == "BAD" {
                return Err(CollectorError::InvalidArgument(format!("{} 조회 실패", symbol)));
            }
            ItemResult::Ok(ItemOutcome::Saved(10))
        };

        let outcomes = run_chunk(&chunk, 2, &op).await;
        assert_eq!(outcomes.len(), 5);

        let mut stats = CollectionStats::new();
        for (_, outcome) in &outcomes {
            stats.record(outcome);
        }
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.success, 4);
        assert_eq!(stats.rows, 40);

        for (symbol, outcome) in &outcomes {
            if symbol == "BAD" {
                assert!(matches!(outcome, ItemOutcome::Failed(e) if e.contains("BAD 조회 실패")));
            } else {
                assert_eq!(outcome, &ItemOutcome::Saved(10));
            }
        }
    }

    #[tokio::test]
    async fn test_run_chunk_keeps_empty_and_skipped() {
        let chunk = symbols(&["A", "B", "C"]);
        let op = |symbol: String| async move {
            ItemResult::Ok(match symbol.as_str() {
                "A" => ItemOutcome::Empty,
                "B" => ItemOutcome::Skipped,
                _ => ItemOutcome::Saved(1),
            })
        };

        let mut outcomes = run_chunk(&chunk, 0, &op).await;
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        let kinds: Vec<ItemOutcome> = outcomes.into_iter().map(|(_, o)| o).collect();
        assert_eq!(
            kinds,
            vec![ItemOutcome::Empty, ItemOutcome::Skipped, ItemOutcome::Saved(1)]
        );
    }
}
