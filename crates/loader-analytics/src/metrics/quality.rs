//! 수익성 / 재무 건전성 지표.

use loader_core::QualityMetrics;

use super::MetricInput;
use crate::stats::safe_div;

/// 최근 회계연도 재무제표 기반 품질 계산기.
pub struct QualityCalculator;

impl QualityCalculator {
    pub fn calculate(input: &MetricInput<'_>) -> QualityMetrics {
        let mut row = QualityMetrics::new(input.symbol, input.as_of);
        let Some(s) = input.latest_statement() else {
            return row;
        };

        // 자본잠식 상태의 ROE, 부채비율은 계산하지 않음
        let equity = s.total_equity.filter(|e| *e > 0.0);

        row.roe = safe_div(s.net_income, equity);
        row.roa = safe_div(s.net_income, s.total_assets);
        row.gross_margin = safe_div(s.gross_profit, s.revenue);
        row.operating_margin = safe_div(s.operating_income, s.revenue);
        row.net_margin = safe_div(s.net_income, s.revenue);
        row.debt_to_equity = safe_div(s.total_debt, equity);
        row.current_ratio = safe_div(s.current_assets, s.current_liabilities);
        row.accruals_ratio = match (s.net_income, s.operating_cash_flow) {
            (Some(ni), Some(ocf)) => safe_div(Some(ni - ocf), s.total_assets),
            _ => None,
        };
        row.fcf_margin = safe_div(s.free_cash_flow(), s.revenue);

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{input, series, statements};

    #[test]
    fn test_ratios_from_latest_year() {
        let stmts = statements("TEST");
        let prices = series(0, 1.0, 0.0);
        let row = QualityCalculator::calculate(&input(&stmts, None, &prices, None));

        let latest = &stmts[3];
        let ni = latest.net_income.unwrap();
        assert!((row.roe.unwrap() - ni / 1000.0).abs() < 1e-12);
        assert!((row.roa.unwrap() - ni / 2000.0).abs() < 1e-12);
        assert!((row.gross_margin.unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(row.debt_to_equity, Some(0.5));
        assert_eq!(row.current_ratio, Some(2.0));

        let ocf = latest.operating_cash_flow.unwrap();
        assert!((row.accruals_ratio.unwrap() - (ni - ocf) / 2000.0).abs() < 1e-12);
        let fcf = ocf - 50.0;
        assert!((row.fcf_margin.unwrap() - fcf / latest.revenue.unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominators_are_missing() {
        let mut stmts = statements("TEST");
        stmts[3].revenue = Some(0.0);
        stmts[3].total_equity = Some(-10.0);
        stmts[3].current_liabilities = None;
        let prices = series(0, 1.0, 0.0);
        let row = QualityCalculator::calculate(&input(&stmts, None, &prices, None));

        assert_eq!(row.gross_margin, None);
        assert_eq!(row.net_margin, None);
        assert_eq!(row.roe, None);
        assert_eq!(row.debt_to_equity, None);
        assert_eq!(row.current_ratio, None);
        assert!(row.roa.is_some());
    }

    #[test]
    fn test_no_statements() {
        let prices = series(0, 1.0, 0.0);
        let row = QualityCalculator::calculate(&input(&[], None, &prices, None));
        assert_eq!(row.roe, None);
    }
}
