//! 팩터별 구성 지표와 방향.

use loader_core::MetricKind::{Growth, Momentum, Positioning, Quality, Stability};
use loader_core::{MetricKind, MetricsSnapshot};

/// 지표 값이 클수록 좋은지 여부.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// 팩터를 구성하는 지표 하나.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDef {
    pub kind: MetricKind,
    pub column: &'static str,
    pub direction: Direction,
    /// 0 이하 값을 결측으로 취급 (PER 등 배수 지표)
    pub positive_only: bool,
}

impl MetricDef {
    const fn higher(kind: MetricKind, column: &'static str) -> Self {
        Self {
            kind,
            column,
            direction: Direction::HigherIsBetter,
            positive_only: false,
        }
    }

    const fn lower(kind: MetricKind, column: &'static str) -> Self {
        Self {
            kind,
            column,
            direction: Direction::LowerIsBetter,
            positive_only: false,
        }
    }

    const fn multiple(column: &'static str) -> Self {
        Self {
            kind: MetricKind::Value,
            column,
            direction: Direction::LowerIsBetter,
            positive_only: true,
        }
    }

    /// 스냅샷에서 이 지표의 값을 꺼냅니다. 결측이면 NaN.
    pub fn value_in(&self, snapshot: &MetricsSnapshot) -> f64 {
        snapshot
            .metric(self.kind, self.column)
            .filter(|v| !self.positive_only || *v > 0.0)
            .unwrap_or(f64::NAN)
    }

    /// 유니버스 전체의 값 벡터.
    pub fn values(&self, snapshots: &[MetricsSnapshot]) -> Vec<f64> {
        snapshots.iter().map(|s| self.value_in(s)).collect()
    }
}

const GROWTH: &[MetricDef] = &[
    MetricDef::higher(Growth, "revenue_growth_yoy"),
    MetricDef::higher(Growth, "net_income_growth_yoy"),
    MetricDef::higher(Growth, "eps_growth_yoy"),
    MetricDef::higher(Growth, "operating_income_growth_yoy"),
    MetricDef::higher(Growth, "fcf_growth_yoy"),
    MetricDef::higher(Growth, "revenue_cagr_3y"),
    MetricDef::higher(Growth, "eps_cagr_3y"),
];

const QUALITY: &[MetricDef] = &[
    MetricDef::higher(Quality, "roe"),
    MetricDef::higher(Quality, "roa"),
    MetricDef::higher(Quality, "gross_margin"),
    MetricDef::higher(Quality, "operating_margin"),
    MetricDef::higher(Quality, "net_margin"),
    MetricDef::lower(Quality, "debt_to_equity"),
    MetricDef::higher(Quality, "current_ratio"),
    MetricDef::lower(Quality, "accruals_ratio"),
    MetricDef::higher(Quality, "fcf_margin"),
];

const VALUE: &[MetricDef] = &[
    MetricDef::multiple("pe_ratio"),
    MetricDef::multiple("forward_pe"),
    MetricDef::multiple("pb_ratio"),
    MetricDef::multiple("ps_ratio"),
    MetricDef::multiple("ev_to_ebitda"),
    MetricDef::higher(MetricKind::Value, "fcf_yield"),
    MetricDef::higher(MetricKind::Value, "earnings_yield"),
    MetricDef::higher(MetricKind::Value, "dividend_yield"),
];

const MOMENTUM: &[MetricDef] = &[
    MetricDef::higher(Momentum, "return_1m"),
    MetricDef::higher(Momentum, "return_3m"),
    MetricDef::higher(Momentum, "return_6m"),
    MetricDef::higher(Momentum, "return_12m"),
    MetricDef::higher(Momentum, "momentum_12_1"),
    MetricDef::higher(Momentum, "pct_from_52w_high"),
    MetricDef::higher(Momentum, "price_vs_sma50"),
    MetricDef::higher(Momentum, "price_vs_sma200"),
    MetricDef::higher(Momentum, "rsi_14"),
];

const STABILITY: &[MetricDef] = &[
    MetricDef::lower(Stability, "volatility_1y"),
    MetricDef::lower(Stability, "beta"),
    // 낙폭은 0 이하이므로 0에 가까울수록 좋음
    MetricDef::higher(Stability, "max_drawdown_1y"),
    MetricDef::lower(Stability, "downside_deviation"),
    MetricDef::lower(Stability, "earnings_variability"),
];

const POSITIONING: &[MetricDef] = &[
    MetricDef::higher(Positioning, "institutional_ownership"),
    MetricDef::higher(Positioning, "insider_ownership"),
    MetricDef::lower(Positioning, "short_percent_float"),
    MetricDef::lower(Positioning, "short_ratio"),
    MetricDef::higher(Positioning, "relative_volume"),
    MetricDef::higher(Positioning, "obv_slope"),
];

/// 팩터를 구성하는 지표 목록.
pub fn factor_metrics(kind: MetricKind) -> &'static [MetricDef] {
    match kind {
        MetricKind::Growth => GROWTH,
        MetricKind::Quality => QUALITY,
        MetricKind::Value => VALUE,
        MetricKind::Momentum => MOMENTUM,
        MetricKind::Stability => STABILITY,
        MetricKind::Positioning => POSITIONING,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use loader_core::{MetricRow, ValueMetrics};

    #[test]
    fn test_every_column_is_defined_once() {
        for kind in MetricKind::ALL {
            let defs = factor_metrics(kind);
            assert_eq!(defs.len(), kind.columns().len(), "{}", kind);
            for column in kind.columns() {
                assert_eq!(defs.iter().filter(|d| d.column == *column).count(), 1);
            }
            assert!(defs.iter().all(|d| d.kind == kind));
        }
    }

    #[test]
    fn test_non_positive_multiples_are_missing() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let mut snapshot = MetricsSnapshot::new("LOSS");
        let mut value = ValueMetrics::new("LOSS", date);
        value.pe_ratio = Some(-12.0);
        value.earnings_yield = Some(-0.08);
        snapshot.value = Some(value);

        let pe = MetricDef::multiple("pe_ratio");
        assert!(pe.value_in(&snapshot).is_nan());
        let ey = MetricDef::higher(MetricKind::Value, "earnings_yield");
        assert_eq!(ey.value_in(&snapshot), -0.08);
        assert_eq!(ValueMetrics::COLUMNS.len(), VALUE.len());
    }
}
