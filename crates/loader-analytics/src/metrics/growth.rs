//! 성장성 지표.

use loader_core::{AnnualFinancials, GrowthMetrics};

use super::MetricInput;
use crate::stats::{cagr, growth_rate};

/// 연간 재무제표 기반 성장성 계산기.
pub struct GrowthCalculator;

impl GrowthCalculator {
    /// CAGR 계산 기간 (년). 회계연도 `CAGR_YEARS + 1`개가 필요합니다.
    pub const CAGR_YEARS: usize = 3;

    pub fn calculate(input: &MetricInput<'_>) -> GrowthMetrics {
        let statements = input.sorted_statements();
        let mut row = GrowthMetrics::new(input.symbol, input.as_of);

        let n = statements.len();
        if n < 2 {
            return row;
        }
        let curr = statements[n - 1];
        let prev = statements[n - 2];

        let yoy = |f: fn(&AnnualFinancials) -> Option<f64>| growth_rate(f(prev)?, f(curr)?);
        row.revenue_growth_yoy = yoy(|s| s.revenue);
        row.net_income_growth_yoy = yoy(|s| s.net_income);
        row.eps_growth_yoy = yoy(|s| s.eps_diluted);
        row.operating_income_growth_yoy = yoy(|s| s.operating_income);
        row.fcf_growth_yoy = yoy(AnnualFinancials::free_cash_flow);

        if n > Self::CAGR_YEARS {
            let base = statements[n - 1 - Self::CAGR_YEARS];
            let years = Self::CAGR_YEARS as f64;
            row.revenue_cagr_3y = base
                .revenue
                .zip(curr.revenue)
                .and_then(|(start, end)| cagr(start, end, years));
            row.eps_cagr_3y = base
                .eps_diluted
                .zip(curr.eps_diluted)
                .and_then(|(start, end)| cagr(start, end, years));
        }

        row
    }
}
