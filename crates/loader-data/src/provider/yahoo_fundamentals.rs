//! Yahoo Finance 재무제표 및 핵심 지표 클라이언트.
//!
//! - 연간 재무제표: `ws/fundamentals-timeseries` (항목별 시계열을 회계연도 기준으로 병합)
//! - 핵심 지표: `v10/finance/quoteSummary` (`{"raw": ..}` 값)
//!
//! quoteSummary는 crumb 인증을 요구할 수 있으므로 `YAHOO_COOKIE`/`YAHOO_CRUMB`
//! 환경 변수가 있으면 함께 보냅니다.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, instrument};

use loader_core::{AnnualFinancials, KeyStatistics};

use super::{build_http_client, ensure_success};
use crate::error::{DataError, Result};

/// fundamentals-timeseries 항목 → 재무제표 필드.
const ANNUAL_TYPES: &[&str] = &[
    "annualTotalRevenue",
    "annualGrossProfit",
    "annualOperatingIncome",
    "annualNetIncome",
    "annualDilutedEPS",
    "annualEBITDA",
    "annualTotalAssets",
    "annualStockholdersEquity",
    "annualTotalDebt",
    "annualCurrentAssets",
    "annualCurrentLiabilities",
    "annualCashAndCashEquivalents",
    "annualOperatingCashFlow",
    "annualCapitalExpenditure",
    "annualCashDividendsPaid",
    "annualOrdinarySharesNumber",
];

const SUMMARY_MODULES: &str = "defaultKeyStatistics,summaryDetail,price,assetProfile";

/// Yahoo Finance 재무 데이터 클라이언트.
pub struct YahooFundamentalsClient {
    client: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
    crumb: Option<String>,
}

impl YahooFundamentalsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie: std::env::var("YAHOO_COOKIE").ok().filter(|s| !s.is_empty()),
            crumb: std::env::var("YAHOO_CRUMB").ok().filter(|s| !s.is_empty()),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(crumb) = &self.crumb {
            request = request.query(&[("crumb", crumb)]);
        }
        request
    }

    /// 연간 재무제표 (회계연도 오름차순).
    #[instrument(skip(self))]
    pub async fn annual_financials(&self, symbol: &str) -> Result<Vec<AnnualFinancials>> {
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            self.base_url, symbol
        );
        let period2 = Utc::now().timestamp();
        let response = self
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("type", ANNUAL_TYPES.join(",")),
                ("period1", "493590046".to_string()),
                ("period2", period2.to_string()),
            ])
            .send()
            .await?;
        let body: Value = ensure_success(response, &format!("Yahoo timeseries {}", symbol))?
            .json()
            .await?;

        let rows = parse_timeseries(symbol, &body)?;
        debug!(symbol = symbol, years = rows.len(), "연간 재무제표 조회 완료");
        Ok(rows)
    }

    /// 핵심 지표 스냅샷.
    #[instrument(skip(self))]
    pub async fn key_statistics(&self, symbol: &str) -> Result<KeyStatistics> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let response = self
            .get(&url)
            .query(&[("modules", SUMMARY_MODULES)])
            .send()
            .await?;
        let body: Value = ensure_success(response, &format!("Yahoo quoteSummary {}", symbol))?
            .json()
            .await?;

        parse_quote_summary(symbol, &body)
    }
}

fn raw_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map.get("raw").and_then(Value::as_f64),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn set_field(row: &mut AnnualFinancials, kind: &str, value: f64) {
    let slot = match kind {
        "annualTotalRevenue" => &mut row.revenue,
        "annualGrossProfit" => &mut row.gross_profit,
        "annualOperatingIncome" => &mut row.operating_income,
        "annualNetIncome" => &mut row.net_income,
        "annualDilutedEPS" => &mut row.eps_diluted,
        "annualEBITDA" => &mut row.ebitda,
        "annualTotalAssets" => &mut row.total_assets,
        "annualStockholdersEquity" => &mut row.total_equity,
        "annualTotalDebt" => &mut row.total_debt,
        "annualCurrentAssets" => &mut row.current_assets,
        "annualCurrentLiabilities" => &mut row.current_liabilities,
        "annualCashAndCashEquivalents" => &mut row.cash,
        "annualOperatingCashFlow" => &mut row.operating_cash_flow,
        "annualCapitalExpenditure" => &mut row.capital_expenditure,
        "annualCashDividendsPaid" => &mut row.dividends_paid,
        "annualOrdinarySharesNumber" => &mut row.shares_outstanding,
        _ => return,
    };
    *slot = Some(value);
}

/// 항목별 시계열을 `asOfDate` 기준으로 병합합니다.
pub(crate) fn parse_timeseries(symbol: &str, body: &Value) -> Result<Vec<AnnualFinancials>> {
    let results = body
        .pointer("/timeseries/result")
        .and_then(Value::as_array)
        .ok_or_else(|| DataError::ParseError(format!("timeseries.result 없음 ({})", symbol)))?;

    let mut by_date: BTreeMap<NaiveDate, AnnualFinancials> = BTreeMap::new();

    for result in results {
        let Some(kind) = result.pointer("/meta/type/0").and_then(Value::as_str) else {
            continue;
        };
        let Some(entries) = result.get(kind).and_then(Value::as_array) else {
            continue;
        };

        for entry in entries.iter().filter(|e| !e.is_null()) {
            let Some(date) = entry
                .get("asOfDate")
                .and_then(Value::as_str)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            else {
                continue;
            };
            let Some(value) = entry.get("reportedValue").and_then(raw_number) else {
                continue;
            };

            let row = by_date
                .entry(date)
                .or_insert_with(|| AnnualFinancials::new(symbol, date));
            set_field(row, kind, value);
        }
    }

    Ok(by_date.into_values().filter(AnnualFinancials::has_data).collect())
}

/// quoteSummary 응답을 핵심 지표로 변환합니다.
pub(crate) fn parse_quote_summary(symbol: &str, body: &Value) -> Result<KeyStatistics> {
    let result = body
        .pointer("/quoteSummary/result/0")
        .ok_or_else(|| {
            let description = body
                .pointer("/quoteSummary/error/description")
                .and_then(Value::as_str)
                .unwrap_or("result 없음");
            DataError::NotFound(format!("quoteSummary {}: {}", symbol, description))
        })?;

    let num = |module: &str, field: &str| -> Option<f64> {
        result.get(module).and_then(|m| m.get(field)).and_then(raw_number)
    };
    let text = |module: &str, field: &str| -> Option<String> {
        result
            .get(module)
            .and_then(|m| m.get(field))
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|s| !s.is_empty())
    };

    let mut stats = KeyStatistics::new(symbol);
    stats.market_cap = num("price", "marketCap").or_else(|| num("summaryDetail", "marketCap"));
    stats.enterprise_value = num("defaultKeyStatistics", "enterpriseValue");
    stats.trailing_pe = num("summaryDetail", "trailingPE");
    stats.forward_pe = num("defaultKeyStatistics", "forwardPE").or_else(|| num("summaryDetail", "forwardPE"));
    stats.price_to_book = num("defaultKeyStatistics", "priceToBook");
    stats.price_to_sales = num("summaryDetail", "priceToSalesTrailing12Months");
    stats.enterprise_to_ebitda = num("defaultKeyStatistics", "enterpriseToEbitda");
    stats.dividend_yield = num("summaryDetail", "dividendYield");
    stats.beta = num("defaultKeyStatistics", "beta").or_else(|| num("summaryDetail", "beta"));
    stats.shares_outstanding = num("defaultKeyStatistics", "sharesOutstanding");
    stats.float_shares = num("defaultKeyStatistics", "floatShares");
    stats.held_percent_insiders = num("defaultKeyStatistics", "heldPercentInsiders");
    stats.held_percent_institutions = num("defaultKeyStatistics", "heldPercentInstitutions");
    stats.short_percent_of_float = num("defaultKeyStatistics", "shortPercentOfFloat");
    stats.short_ratio = num("defaultKeyStatistics", "shortRatio");
    stats.sector = text("assetProfile", "sector");
    stats.industry = text("assetProfile", "industry");
    stats.long_name = text("price", "longName").or_else(|| text("price", "shortName"));

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_timeseries_merges_by_date() {
        let body = json!({
            "timeseries": {
                "result": [
                    {
                        "meta": {"symbol": ["AAPL"], "type": ["annualTotalRevenue"]},
                        "annualTotalRevenue": [
                            {"asOfDate": "2022-09-30", "reportedValue": {"raw": 394328000000.0, "fmt": "394.33B"}},
                            null,
                            {"asOfDate": "2023-09-30", "reportedValue": {"raw": 383285000000.0}}
                        ]
                    },
                    {
                        "meta": {"symbol": ["AAPL"], "type": ["annualNetIncome"]},
                        "annualNetIncome": [
                            {"asOfDate": "2023-09-30", "reportedValue": {"raw": 96995000000.0}}
                        ]
                    },
                    {
                        "meta": {"symbol": ["AAPL"], "type": ["annualDilutedEPS"]}
                    }
                ],
                "error": null
            }
        });

        let rows = parse_timeseries("AAPL", &body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fiscal_date, NaiveDate::from_ymd_opt(2022, 9, 30).unwrap());
        assert_eq!(rows[0].net_income, None);
        assert_eq!(rows[1].revenue, Some(383285000000.0));
        assert_eq!(rows[1].net_income, Some(96995000000.0));
    }

    #[test]
    fn test_parse_quote_summary() {
        let body = json!({
            "quoteSummary": {
                "result": [{
                    "defaultKeyStatistics": {
                        "forwardPE": {"raw": 28.5},
                        "heldPercentInstitutions": {"raw": 0.61},
                        "shortPercentOfFloat": {"raw": 0.007},
                        "enterpriseValue": {}
                    },
                    "summaryDetail": {
                        "trailingPE": {"raw": 31.2},
                        "dividendYield": {"raw": 0.0052}
                    },
                    "price": {"marketCap": {"raw": 2.9e12}, "longName": "Apple Inc."},
                    "assetProfile": {"sector": "Technology", "industry": "Consumer Electronics"}
                }],
                "error": null
            }
        });

        let stats = parse_quote_summary("AAPL", &body).unwrap();
        assert_eq!(stats.trailing_pe, Some(31.2));
        assert_eq!(stats.forward_pe, Some(28.5));
        assert_eq!(stats.market_cap, Some(2.9e12));
        assert_eq!(stats.enterprise_value, None);
        assert_eq!(stats.sector.as_deref(), Some("Technology"));
        assert_eq!(stats.long_name.as_deref(), Some("Apple Inc."));
    }

    #[test]
    fn test_quote_summary_error() {
        let body = json!({
            "quoteSummary": {
                "result": null,
                "error": {"code": "Not Found", "description": "Quote not found for ticker symbol: ZZZZ"}
            }
        });
        assert!(matches!(
            parse_quote_summary("ZZZZ", &body),
            Err(DataError::NotFound(_))
        ));
    }
}
