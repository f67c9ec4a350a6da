//! 팩터 지표 계산 모듈.
//!
//! 저장된 재무제표, 핵심 지표, 일봉으로 성장/품질/가치/모멘텀/안정성/수급
//! 지표를 계산해 `*_metrics` 테이블에 upsert합니다. 행의 날짜는 계산 기준일입니다.

use chrono::{NaiveDate, Utc};
use loader_analytics::{MetricInput, MetricSet};
use loader_core::{AppConfig, MetricKind, PriceSeries, Timeframe};
use loader_data::{FundamentalRepository, MetricsRepository, PriceRepository};
use sqlx::PgPool;

use super::{target_symbols, SymbolRunner, SymbolScope};
use crate::{CollectionStats, CollectorError, ItemOutcome, ItemResult, Result};

/// 지표 계산에 사용할 최근 일봉 수 (52주 + SMA 200 여유분).
pub const METRIC_LOOKBACK: i64 = 300;

/// `--kind` 인자를 계산할 지표 종류로 바꿉니다. `all`이면 여섯 종류 모두.
pub fn parse_kinds(kind: &str) -> Result<Vec<MetricKind>> {
    if kind.eq_ignore_ascii_case("all") {
        return Ok(MetricKind::ALL.to_vec());
    }
    let mut kinds = Vec::new();
    for part in kind.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let parsed: MetricKind = part.parse().map_err(CollectorError::InvalidArgument)?;
        if !kinds.contains(&parsed) {
            kinds.push(parsed);
        }
    }
    if kinds.is_empty() {
        return Err(CollectorError::InvalidArgument("empty --kind".to_string()));
    }
    Ok(kinds)
}

/// 지표 묶음을 종류별 테이블에 저장합니다.
async fn save_metric_set(repo: &MetricsRepository, set: &MetricSet) -> Result<u64> {
    let mut rows = 0;
    if let Some(row) = &set.growth {
        rows += repo.upsert(std::slice::from_ref(row)).await?;
    }
    if let Some(row) = &set.quality {
        rows += repo.upsert(std::slice::from_ref(row)).await?;
    }
    if let Some(row) = &set.value {
        rows += repo.upsert(std::slice::from_ref(row)).await?;
    }
    if let Some(row) = &set.momentum {
        rows += repo.upsert(std::slice::from_ref(row)).await?;
    }
    if let Some(row) = &set.stability {
        rows += repo.upsert(std::slice::from_ref(row)).await?;
    }
    if let Some(row) = &set.positioning {
        rows += repo.upsert(std::slice::from_ref(row)).await?;
    }
    Ok(rows)
}

/// 팩터 지표를 계산합니다.
pub async fn calc_metrics(
    pool: &PgPool,
    config: &AppConfig,
    kinds: &[MetricKind],
    symbols: Option<&str>,
    resume: bool,
) -> Result<CollectionStats> {
    let as_of: NaiveDate = Utc::now().date_naive();
    let loader = &config.loader;
    let prices = PriceRepository::new(pool.clone());
    let fundamentals = FundamentalRepository::new(pool.clone());
    let metrics = MetricsRepository::new(pool.clone());

    let benchmark_symbol = &config.providers.benchmark_symbol;
    let benchmark_bars = prices
        .recent_bars(benchmark_symbol, Timeframe::D1, METRIC_LOOKBACK)
        .await?;
    let benchmark = if benchmark_bars.is_empty() {
        tracing::warn!(benchmark = %benchmark_symbol, "벤치마크 가격 없음, 베타 생략");
        None
    } else {
        Some(PriceSeries::from_bars(&benchmark_bars))
    };

    let symbols = target_symbols(pool, loader, symbols, SymbolScope::Stocks).await?;
    tracing::info!(
        as_of = %as_of,
        kinds = ?kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
        "팩터 지표 계산 시작"
    );

    let runner = SymbolRunner::new(pool, "calc_metrics", loader).resume(resume);
    let prices = &prices;
    let fundamentals = &fundamentals;
    let metrics = &metrics;
    let benchmark = benchmark.as_ref();
    runner
        .run(symbols, move |symbol| async move {
            let statements = fundamentals.financials(&symbol).await?;
            let key_stats = fundamentals.key_statistics(&symbol).await?;
            let bars = prices
                .recent_bars(&symbol, Timeframe::D1, METRIC_LOOKBACK)
                .await?;
            let series = PriceSeries::from_bars(&bars);

            let input = MetricInput {
                symbol: &symbol,
                as_of,
                statements: &statements,
                key_stats: key_stats.as_ref(),
                prices: &series,
                benchmark,
            };
            let set = MetricSet::calculate(&input, kinds);
            if set.is_empty() {
                return Ok(ItemOutcome::Empty);
            }
            ItemResult::Ok(ItemOutcome::Saved(save_metric_set(metrics, &set).await?))
        })
        .await
}
