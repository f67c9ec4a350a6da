//! 팩터 지표 계산기.
//!
//! 저장된 원천 데이터(재무제표, 핵심 지표, 일봉)로 여섯 개 지표 테이블의 행을
//! 계산합니다. 모든 계산기는 순수 함수이며, 계산할 수 없는 값은 `None`입니다.
//!
//! | 계산기 | 입력 | 테이블 |
//! |--------|------|--------|
//! | [`GrowthCalculator`] | 연간 재무제표 | `growth_metrics` |
//! | [`QualityCalculator`] | 연간 재무제표 | `quality_metrics` |
//! | [`ValueCalculator`] | 재무제표 + 핵심 지표 + 종가 | `value_metrics` |
//! | [`PriceMomentumCalculator`] | 일봉 | `momentum_metrics` |
//! | [`StabilityCalculator`] | 일봉 + 벤치마크 + 재무제표 | `stability_metrics` |
//! | [`PositioningCalculator`] | 핵심 지표 + 일봉 | `positioning_metrics` |

pub mod growth;
pub mod momentum;
pub mod positioning;
pub mod quality;
pub mod stability;
pub mod value;

use chrono::NaiveDate;
use loader_core::{
    AnnualFinancials, GrowthMetrics, KeyStatistics, MetricKind, MetricRow, MomentumMetrics,
    PositioningMetrics, PriceSeries, QualityMetrics, StabilityMetrics, ValueMetrics,
};

pub use growth::GrowthCalculator;
pub use momentum::PriceMomentumCalculator;
pub use positioning::PositioningCalculator;
pub use quality::QualityCalculator;
pub use stability::StabilityCalculator;
pub use value::ValueCalculator;

/// 연간 거래일 수.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// 한 종목의 지표 계산 입력.
#[derive(Debug, Clone, Copy)]
pub struct MetricInput<'a> {
    pub symbol: &'a str,
    /// 지표 행의 날짜
    pub as_of: NaiveDate,
    /// 연간 재무제표 (순서 무관)
    pub statements: &'a [AnnualFinancials],
    pub key_stats: Option<&'a KeyStatistics>,
    /// 일봉 (날짜 오름차순)
    pub prices: &'a PriceSeries,
    /// 벤치마크 일봉 (날짜 오름차순)
    pub benchmark: Option<&'a PriceSeries>,
}

impl<'a> MetricInput<'a> {
    /// 회계연도 오름차순, 값이 있는 재무제표만.
    pub fn sorted_statements(&self) -> Vec<&'a AnnualFinancials> {
        let mut statements: Vec<&AnnualFinancials> =
            self.statements.iter().filter(|s| s.has_data()).collect();
        statements.sort_by_key(|s| s.fiscal_date);
        statements
    }

    /// 가장 최근 재무제표.
    pub fn latest_statement(&self) -> Option<&'a AnnualFinancials> {
        self.sorted_statements().last().copied()
    }

    /// 마지막 유한 종가.
    pub fn last_close(&self) -> Option<f64> {
        self.prices
            .close
            .iter()
            .rev()
            .copied()
            .find(|c| c.is_finite() && *c > 0.0)
    }
}

/// 한 종목에 대해 계산된 지표 묶음. 값이 하나도 없는 행은 `None`입니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSet {
    pub growth: Option<GrowthMetrics>,
    pub quality: Option<QualityMetrics>,
    pub value: Option<ValueMetrics>,
    pub momentum: Option<MomentumMetrics>,
    pub stability: Option<StabilityMetrics>,
    pub positioning: Option<PositioningMetrics>,
}

impl MetricSet {
    /// 요청한 종류만 계산합니다.
    pub fn calculate(input: &MetricInput<'_>, kinds: &[MetricKind]) -> Self {
        let mut set = Self::default();
        for kind in kinds {
            match kind {
                MetricKind::Growth => set.growth = non_empty(GrowthCalculator::calculate(input)),
                MetricKind::Quality => set.quality = non_empty(QualityCalculator::calculate(input)),
                MetricKind::Value => set.value = non_empty(ValueCalculator::calculate(input)),
                MetricKind::Momentum => {
                    set.momentum = non_empty(PriceMomentumCalculator::calculate(input))
                }
                MetricKind::Stability => {
                    set.stability = non_empty(StabilityCalculator::calculate(input))
                }
                MetricKind::Positioning => {
                    set.positioning = non_empty(PositioningCalculator::calculate(input))
                }
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.growth.is_none()
            && self.quality.is_none()
            && self.value.is_none()
            && self.momentum.is_none()
            && self.stability.is_none()
            && self.positioning.is_none()
    }
}

fn non_empty<M: MetricRow>(row: M) -> Option<M> {
    row.has_values().then_some(row)
}

/// 유한한 값만 통과시킵니다.
pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 매년 매출 10% / 순이익 20% 성장하는 4개년 재무제표.
    pub fn statements(symbol: &str) -> Vec<AnnualFinancials> {
        (0..4)
            .map(|i| {
                let mut s = AnnualFinancials::new(symbol, date(2020 + i, 12, 31));
                let g = 1.1_f64.powi(i);
                let e = 1.2_f64.powi(i);
                s.revenue = Some(1000.0 * g);
                s.gross_profit = Some(400.0 * g);
                s.operating_income = Some(200.0 * g);
                s.net_income = Some(100.0 * e);
                s.eps_diluted = Some(1.0 * e);
                s.ebitda = Some(250.0 * g);
                s.total_assets = Some(2000.0);
                s.total_equity = Some(1000.0);
                s.total_debt = Some(500.0);
                s.current_assets = Some(600.0);
                s.current_liabilities = Some(300.0);
                s.cash = Some(100.0);
                s.operating_cash_flow = Some(150.0 * g);
                s.capital_expenditure = Some(-50.0);
                s.dividends_paid = Some(-20.0);
                s.shares_outstanding = Some(100.0);
                s
            })
            .collect()
    }

    /// 일정 비율로 움직이는 종가 시계열.
    pub fn series(len: usize, start: f64, daily: f64) -> PriceSeries {
        let mut series = PriceSeries::default();
        let first = date(2022, 1, 3);
        for i in 0..len {
            let close = start * (1.0 + daily).powi(i as i32);
            series.dates.push(first + chrono::Duration::days(i as i64));
            series.open.push(close);
            series.high.push(close * 1.01);
            series.low.push(close * 0.99);
            series.close.push(close);
            series.adj_close.push(close);
            series.volume.push(1_000.0);
        }
        series
    }

    pub fn input<'a>(
        statements: &'a [AnnualFinancials],
        key_stats: Option<&'a KeyStatistics>,
        prices: &'a PriceSeries,
        benchmark: Option<&'a PriceSeries>,
    ) -> MetricInput<'a> {
        MetricInput {
            symbol: "TEST",
            as_of: date(2024, 6, 28),
            statements,
            key_stats,
            prices,
            benchmark,
        }
    }
}
