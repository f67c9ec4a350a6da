//! 차트 패턴 감지 모듈.
//!
//! 종목마다 최근 `patterns.lookback_bars`개 바로 패턴을 찾아, 마지막 봉 날짜의
//! 감지 결과를 `pattern_detections`에서 교체합니다.

use loader_analytics::{PatternConfig, PatternRecognizer};
use loader_core::{AppConfig, Timeframe};
use loader_data::{PatternRepository, PriceRepository};
use sqlx::PgPool;

use super::{target_symbols, SymbolRunner, SymbolScope};
use crate::{CollectionStats, ItemOutcome, ItemResult, Result};

/// 차트 패턴을 감지합니다.
pub async fn detect_patterns(
    pool: &PgPool,
    config: &AppConfig,
    timeframe: Timeframe,
    symbols: Option<&str>,
    resume: bool,
) -> Result<CollectionStats> {
    let loader = &config.loader;
    let lookback = config.patterns.lookback_bars.max(1);
    let recognizer = PatternRecognizer::new(PatternConfig::from(&config.patterns));
    let prices = PriceRepository::new(pool.clone());
    let patterns = PatternRepository::new(pool.clone());
    let symbols = target_symbols(pool, loader, symbols, SymbolScope::Listed).await?;

    tracing::info!(timeframe = %timeframe, lookback = lookback, "패턴 감지 시작");

    let workflow = format!("detect_patterns_{}", timeframe.table_suffix());
    let runner = SymbolRunner::new(pool, workflow, loader).resume(resume);

    let recognizer = &recognizer;
    let prices = &prices;
    let patterns = &patterns;
    runner
        .run(symbols, move |symbol| async move {
            let bars = prices.recent_bars(&symbol, timeframe, lookback).await?;
            let Some(last) = bars.last() else {
                return Ok(ItemOutcome::Empty);
            };
            let detected_on = last.date;

            let report = recognizer.analyze(&bars);
            let detections = report.to_detections(timeframe);
            // 감지 결과가 없어도 같은 날짜의 이전 결과는 지웁니다
            let saved = patterns
                .replace_for(&symbol, timeframe, detected_on, &detections)
                .await?;

            if detections.is_empty() {
                ItemResult::Ok(ItemOutcome::Empty)
            } else {
                ItemResult::Ok(ItemOutcome::Saved(saved))
            }
        })
        .await
}
