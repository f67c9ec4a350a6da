//! 작업 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// 총 시도 횟수
    pub total: usize,
    /// 성공 횟수
    pub success: usize,
    /// 에러 횟수
    pub errors: usize,
    /// 건너뛴 횟수 (이미 최신 데이터, 체크포인트 이전)
    pub skipped: usize,
    /// 빈 데이터 (조회 성공, 데이터 없음)
    pub empty: usize,
    /// 저장된 총 행 수
    pub rows: u64,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

/// 심볼 하나의 처리 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// 저장한 행 수
    Saved(u64),
    /// 조회는 성공했지만 데이터가 없음
    Empty,
    /// 처리할 필요가 없음
    Skipped,
    /// 실패 (메시지)
    Failed(String),
}

/// 심볼 하나의 처리 결과 타입.
pub type ItemResult = crate::Result<ItemOutcome>;

impl CollectionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 처리 결과 하나를 집계합니다.
    pub fn record(&mut self, outcome: &ItemOutcome) {
        self.total += 1;
        match outcome {
            ItemOutcome::Saved(rows) => {
                self.success += 1;
                self.rows += rows;
            }
            ItemOutcome::Empty => self.empty += 1,
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Failed(_) => self.errors += 1,
        }
    }

    /// 다른 통계를 합산합니다 (여러 타임프레임, 여러 단계).
    pub fn merge(&mut self, other: &CollectionStats) {
        self.total += other.total;
        self.success += other.success;
        self.errors += other.errors;
        self.skipped += other.skipped;
        self.empty += other.empty;
        self.rows += other.rows;
        self.elapsed += other.elapsed;
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            skipped = self.skipped,
            empty = self.empty,
            rows = self.rows,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "작업 완료"
        );
    }
}
