//! 재무제표 및 핵심 지표.
//!
//! 재무 수치는 규모가 크고 비율 계산에만 쓰이므로 `f64`로 보관합니다.
//! 값이 없으면 `None`이며, 0과 구분됩니다.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 연간 재무제표 한 회계연도 분.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualFinancials {
    pub symbol: String,
    /// 회계연도 종료일
    pub fiscal_date: NaiveDate,

    // 손익계산서
    pub revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub eps_diluted: Option<f64>,
    pub ebitda: Option<f64>,

    // 재무상태표
    pub total_assets: Option<f64>,
    pub total_equity: Option<f64>,
    pub total_debt: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub cash: Option<f64>,

    // 현금흐름표
    pub operating_cash_flow: Option<f64>,
    /// 자본적 지출 (Yahoo는 음수로 보고)
    pub capital_expenditure: Option<f64>,
    pub dividends_paid: Option<f64>,

    pub shares_outstanding: Option<f64>,
}

impl AnnualFinancials {
    pub fn new(symbol: impl Into<String>, fiscal_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            fiscal_date,
            ..Default::default()
        }
    }

    /// 잉여현금흐름 = 영업현금흐름 - |자본적 지출|.
    ///
    /// 자본적 지출이 없으면 영업현금흐름을 그대로 사용합니다.
    pub fn free_cash_flow(&self) -> Option<f64> {
        let ocf = self.operating_cash_flow?;
        Some(ocf - self.capital_expenditure.map(f64::abs).unwrap_or(0.0))
    }

    /// 값이 하나라도 채워져 있는지 확인합니다.
    pub fn has_data(&self) -> bool {
        [
            self.revenue,
            self.net_income,
            self.total_assets,
            self.operating_cash_flow,
            self.eps_diluted,
        ]
        .iter()
        .any(Option::is_some)
    }
}

/// 시세 기반 핵심 지표 스냅샷 (quoteSummary).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStatistics {
    pub symbol: String,

    // 밸류에이션
    pub market_cap: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub enterprise_to_ebitda: Option<f64>,
    /// 배당수익률 (비율, 0.02 = 2%)
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,

    // 주식 수
    pub shares_outstanding: Option<f64>,
    pub float_shares: Option<f64>,

    // 보유 구조 (비율)
    pub held_percent_insiders: Option<f64>,
    pub held_percent_institutions: Option<f64>,
    pub short_percent_of_float: Option<f64>,
    pub short_ratio: Option<f64>,

    // 분류
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub long_name: Option<String>,

    pub fetched_at: DateTime<Utc>,
}

impl KeyStatistics {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            fetched_at: Utc::now(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_cash_flow() {
        let mut fin = AnnualFinancials::new("AAPL", NaiveDate::from_ymd_opt(2023, 9, 30).unwrap());
        assert_eq!(fin.free_cash_flow(), None);
        assert!(!fin.has_data());

        fin.operating_cash_flow = Some(110.0);
        assert_eq!(fin.free_cash_flow(), Some(110.0));

        fin.capital_expenditure = Some(-11.0);
        assert_eq!(fin.free_cash_flow(), Some(99.0));
        assert!(fin.has_data());
    }
}
