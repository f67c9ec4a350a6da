//! 전체 워크플로우와 데몬 모드.

use std::future::Future;
use std::time::Duration;

use loader_core::{AppConfig, MetricKind, ScoreMethod, Timeframe};
use sqlx::PgPool;

use super::price_load::{PriceLoadOptions, PriceSource};
use super::{
    calc_metrics, calc_scores, detect_patterns, load_crypto, load_economic, load_fundamentals,
    load_prices, load_technicals, mark_interrupted, sync_symbols,
};
use crate::{CollectionStats, Result};

/// 전체 워크플로우 결과.
#[derive(Debug, Default)]
pub struct WorkflowReport {
    /// 성공한 단계 수
    pub succeeded: usize,
    /// 실패한 단계 이름
    pub failed: Vec<String>,
    /// 모든 단계의 합산 통계
    pub totals: CollectionStats,
}

impl WorkflowReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// 한 단계를 실행하고 결과를 기록합니다. 실패해도 다음 단계는 실행됩니다.
    async fn step<F>(&mut self, index: usize, count: usize, name: &str, job: F)
    where
        F: Future<Output = Result<CollectionStats>>,
    {
        tracing::info!("Step {}/{}: {}", index, count, name);
        match job.await {
            Ok(stats) => {
                stats.log_summary(name);
                self.totals.merge(&stats);
                self.succeeded += 1;
            }
            Err(e) => {
                tracing::error!(step = name, error = %e, "단계 실패");
                self.failed.push(name.to_string());
            }
        }
    }
}

/// 단계 수: 심볼, 가격 3, 지표 3, 재무, 팩터, 점수 2, 패턴, 암호화폐, 거시경제.
const STEP_COUNT: usize = 14;

/// 심볼 → 가격 → 기술적 지표 → 재무 → 팩터 → 점수 → 패턴 → 암호화폐 → 거시경제.
pub async fn run_all(pool: &PgPool, config: &AppConfig) -> WorkflowReport {
    tracing::info!("=== 전체 워크플로우 시작 ===");
    let mut report = WorkflowReport::default();
    let mut index = 0;
    let mut next = || {
        index += 1;
        index
    };

    report
        .step(next(), STEP_COUNT, "심볼 동기화", sync_symbols(pool, config))
        .await;

    for timeframe in Timeframe::ALL {
        let options = PriceLoadOptions {
            timeframe,
            symbols: None,
            source: PriceSource::Yahoo,
            resume: false,
        };
        let name = format!("가격 적재 ({})", timeframe.table_suffix());
        report
            .step(next(), STEP_COUNT, &name, load_prices(pool, config, &options))
            .await;
    }

    for timeframe in Timeframe::ALL {
        let name = format!("기술적 지표 ({})", timeframe.table_suffix());
        report
            .step(
                next(),
                STEP_COUNT,
                &name,
                load_technicals(pool, config, timeframe, None, false),
            )
            .await;
    }

    report
        .step(next(), STEP_COUNT, "재무 데이터", load_fundamentals(pool, config, None, false))
        .await;
    report
        .step(
            next(),
            STEP_COUNT,
            "팩터 지표",
            calc_metrics(pool, config, &MetricKind::ALL, None, false),
        )
        .await;

    for method in [ScoreMethod::ZScore, ScoreMethod::Sector] {
        let name = format!("종합 점수 ({})", method);
        report
            .step(next(), STEP_COUNT, &name, calc_scores(pool, config, method))
            .await;
    }

    report
        .step(
            next(),
            STEP_COUNT,
            "패턴 감지",
            detect_patterns(pool, config, Timeframe::D1, None, false),
        )
        .await;
    report
        .step(next(), STEP_COUNT, "암호화폐", load_crypto(pool, config))
        .await;
    report
        .step(next(), STEP_COUNT, "거시경제", load_economic(pool, config, None))
        .await;

    report.totals.log_summary("전체 워크플로우");
    tracing::info!(
        succeeded = report.succeeded,
        failed = ?report.failed,
        "=== 전체 워크플로우 완료 ==="
    );
    report
}

/// 데몬 모드: `daemon.interval_minutes`마다 전체 워크플로우를 실행합니다.
///
/// 종료 신호를 받으면 실행 중인 체크포인트를 `interrupted`로 표시하고 끝냅니다.
pub async fn run_daemon(pool: &PgPool, config: &AppConfig) -> Result<()> {
    let minutes = config.daemon.interval_minutes.max(1);
    tracing::info!("=== 데몬 모드 시작 (주기: {}분) ===", minutes);

    let mut interval = tokio::time::interval(Duration::from_secs(minutes * 60));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("종료 신호 수신, 데몬 종료 중...");
                break;
            }
            _ = interval.tick() => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        let marked = mark_interrupted(pool).await?;
                        tracing::info!(checkpoints = marked, "워크플로우 중단, 체크포인트 보존");
                        break;
                    }
                    report = run_all(pool, config) => {
                        if !report.is_success() {
                            tracing::warn!(failed = ?report.failed, "일부 단계 실패");
                        }
                        tracing::info!("=== 워크플로우 완료, 다음 실행: {}분 후 ===", minutes);
                    }
                }
            }
        }
    }

    Ok(())
}
