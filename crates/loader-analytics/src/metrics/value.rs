//! 밸류에이션 지표.
//!
//! 재무제표와 최근 종가로 직접 계산하고, 계산할 수 없으면 핵심 지표
//! (quoteSummary) 값을 사용합니다.

use loader_core::ValueMetrics;

use super::{finite, MetricInput};
use crate::stats::safe_div;

pub struct ValueCalculator;

impl ValueCalculator {
    pub fn calculate(input: &MetricInput<'_>) -> ValueMetrics {
        let mut row = ValueMetrics::new(input.symbol, input.as_of);
        let stmt = input.latest_statement();
        let stats = input.key_stats;
        let price = input.last_close();

        let stat = |f: fn(&loader_core::KeyStatistics) -> Option<f64>| finite(stats.and_then(f));
        let fin = |f: fn(&loader_core::AnnualFinancials) -> Option<f64>| finite(stmt.and_then(f));

        let shares = stat(|k| k.shares_outstanding).or_else(|| fin(|s| s.shares_outstanding));
        let market_cap = stat(|k| k.market_cap).or_else(|| price.zip(shares).map(|(p, n)| p * n));
        let enterprise_value = stat(|k| k.enterprise_value).or_else(|| {
            let debt = fin(|s| s.total_debt).unwrap_or(0.0);
            let cash = fin(|s| s.cash).unwrap_or(0.0);
            market_cap.map(|mc| mc + debt - cash)
        });

        row.pe_ratio = safe_div(price, fin(|s| s.eps_diluted)).or_else(|| stat(|k| k.trailing_pe));
        row.forward_pe = stat(|k| k.forward_pe);
        row.pb_ratio = safe_div(market_cap, fin(|s| s.total_equity)).or_else(|| stat(|k| k.price_to_book));
        row.ps_ratio = safe_div(market_cap, fin(|s| s.revenue)).or_else(|| stat(|k| k.price_to_sales));
        row.ev_to_ebitda =
            safe_div(enterprise_value, fin(|s| s.ebitda)).or_else(|| stat(|k| k.enterprise_to_ebitda));
        row.fcf_yield = safe_div(stmt.and_then(|s| s.free_cash_flow()), market_cap);
        row.earnings_yield = safe_div(fin(|s| s.net_income), market_cap)
            .or_else(|| safe_div(Some(1.0), row.pe_ratio));
        row.dividend_yield = stat(|k| k.dividend_yield).or_else(|| {
            let paid = fin(|s| s.dividends_paid).map(f64::abs);
            safe_div(paid, market_cap)
        });

        row
    }
}
