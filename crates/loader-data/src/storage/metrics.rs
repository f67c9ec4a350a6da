//! 팩터 지표 저장소 (`growth_metrics` 등 여섯 테이블).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use loader_core::{
    GrowthMetrics, MetricKind, MetricRow, MetricsSnapshot, MomentumMetrics, PositioningMetrics,
    QualityMetrics, StabilityMetrics, ValueMetrics,
};

use super::{upsert_keyed_rows, KeyedRow, DEFAULT_BATCH_SIZE};
use crate::error::Result;

/// 팩터 지표 저장소.
#[derive(Clone)]
pub struct MetricsRepository {
    pool: PgPool,
}

impl MetricsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 지표 행을 해당 테이블에 upsert합니다. 값이 하나도 없는 행은 건너뜁니다.
    #[instrument(skip(self, rows), fields(kind = %M::KIND, count = rows.len()))]
    pub async fn upsert<M: MetricRow>(&self, rows: &[M]) -> Result<u64> {
        let keyed: Vec<KeyedRow> = rows
            .iter()
            .filter(|r| r.has_values())
            .map(|r| KeyedRow {
                symbol: r.symbol().to_string(),
                date: r.date(),
                values: r.values(),
            })
            .collect();
        if keyed.is_empty() {
            return Ok(0);
        }

        upsert_keyed_rows(
            &self.pool,
            M::KIND.table_name(),
            M::COLUMNS,
            &keyed,
            DEFAULT_BATCH_SIZE,
        )
        .await
    }

    /// `as_of` 이전(포함)의 종목별 최신 행.
    async fn latest<M: MetricRow>(&self, as_of: NaiveDate) -> Result<Vec<M>> {
        let sql = format!(
            r#"
            SELECT DISTINCT ON (symbol) symbol, date, {}
            FROM {}
            WHERE date <= $1
            ORDER BY symbol, date DESC
            "#,
            M::COLUMNS.join(", "),
            M::KIND.table_name()
        );

        let rows = sqlx::query(&sql).bind(as_of).fetch_all(&self.pool).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let symbol: String = row.try_get("symbol")?;
            let date: NaiveDate = row.try_get("date")?;
            let mut values = Vec::with_capacity(M::COLUMNS.len());
            for column in M::COLUMNS {
                values.push(row.try_get::<Option<f64>, _>(*column)?);
            }
            out.push(M::from_values(symbol, date, &values));
        }
        Ok(out)
    }

    /// 활성 보통주마다 여섯 종류의 최신 지표와 섹터를 묶어 반환합니다.
    #[instrument(skip(self))]
    pub async fn load_snapshot(&self, as_of: NaiveDate) -> Result<Vec<MetricsSnapshot>> {
        let universe: Vec<(String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT symbol, sector FROM stock_symbols
            WHERE is_active AND asset_class = 'stock' AND NOT is_etf
            ORDER BY symbol
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut snapshots: BTreeMap<String, MetricsSnapshot> = universe
            .into_iter()
            .map(|(symbol, sector)| {
                let mut snapshot = MetricsSnapshot::new(symbol.clone());
                snapshot.sector = sector.filter(|s| !s.trim().is_empty());
                (symbol, snapshot)
            })
            .collect();

        for row in self.latest::<GrowthMetrics>(as_of).await? {
            if let Some(s) = snapshots.get_mut(&row.symbol) {
                s.growth = Some(row);
            }
        }
        for row in self.latest::<QualityMetrics>(as_of).await? {
            if let Some(s) = snapshots.get_mut(&row.symbol) {
                s.quality = Some(row);
            }
        }
        for row in self.latest::<ValueMetrics>(as_of).await? {
            if let Some(s) = snapshots.get_mut(&row.symbol) {
                s.value = Some(row);
            }
        }
        for row in self.latest::<MomentumMetrics>(as_of).await? {
            if let Some(s) = snapshots.get_mut(&row.symbol) {
                s.momentum = Some(row);
            }
        }
        for row in self.latest::<StabilityMetrics>(as_of).await? {
            if let Some(s) = snapshots.get_mut(&row.symbol) {
                s.stability = Some(row);
            }
        }
        for row in self.latest::<PositioningMetrics>(as_of).await? {
            if let Some(s) = snapshots.get_mut(&row.symbol) {
                s.positioning = Some(row);
            }
        }

        let result: Vec<MetricsSnapshot> = snapshots.into_values().collect();
        debug!(
            symbols = result.len(),
            kinds = MetricKind::ALL.len(),
            "지표 스냅샷 로드 완료"
        );
        Ok(result)
    }
}
