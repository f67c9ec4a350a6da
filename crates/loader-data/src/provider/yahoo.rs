//! Yahoo Finance 가격 바 제공자.
//!
//! `yahoo_finance_api` 크레이트로 chart API를 호출합니다. 종가가 비어 있거나
//! 0 이하인 바(상장 전/거래 정지 구간)는 버립니다.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::debug;

use loader_core::{PriceBar, Timeframe};

use super::{date_from_secs, PriceProvider};
use crate::error::{DataError, Result};

/// Yahoo Finance 가격 제공자.
pub struct YahooPriceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooPriceProvider {
    pub fn new() -> Result<Self> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| DataError::ConnectionError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl PriceProvider for YahooPriceProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let interval = timeframe.yahoo_interval();
        // 종료일 당일 바를 포함하도록 하루를 더합니다.
        let start_dt = naive_date_to_offset_datetime(start)?;
        let end_dt = naive_date_to_offset_datetime(end.succ_opt().unwrap_or(end))?;

        debug!(symbol = symbol, interval = interval, start = %start, end = %end, "Yahoo Finance API 호출");

        let response = self
            .connector
            .get_quote_history_interval(symbol, start_dt, end_dt, interval)
            .await
            .map_err(|e| classify_yahoo_error(symbol, e.to_string()))?;

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            // 구간 내 데이터가 없으면 Yahoo는 빈 indicators를 돌려줍니다.
            Err(e) if e.to_string().to_lowercase().contains("empty") => return Ok(Vec::new()),
            Err(e) => return Err(DataError::ParseError(format!("Quote 파싱 오류 ({}): {}", symbol, e))),
        };

        let raw: Vec<RawQuote> = quotes
            .iter()
            .map(|q| RawQuote {
                timestamp: q.timestamp as i64,
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                adjclose: q.adjclose,
                volume: q.volume as i64,
            })
            .collect();

        let bars = quotes_to_bars(symbol, timeframe, &raw)
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        Ok(bars)
    }
}

/// 제공자 응답을 크레이트 타입과 분리한 중간 표현.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawQuote {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjclose: f64,
    pub volume: i64,
}

fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64_retain(value).map(|d| d.round_dp(6))
}

/// Yahoo 시세를 가격 바로 변환합니다.
///
/// 날짜 오름차순으로 정렬하고, 같은 날짜가 여러 번 나오면 마지막 값을 씁니다.
pub(crate) fn quotes_to_bars(symbol: &str, timeframe: Timeframe, quotes: &[RawQuote]) -> Vec<PriceBar> {
    let mut bars: Vec<PriceBar> = Vec::with_capacity(quotes.len());

    for q in quotes {
        if !q.close.is_finite() || q.close <= 0.0 {
            continue;
        }
        let Some(date) = date_from_secs(q.timestamp) else {
            continue;
        };
        let Some(close) = to_decimal(q.close) else {
            continue;
        };
        let open = to_decimal(q.open).filter(|v| !v.is_zero()).unwrap_or(close);
        let high = to_decimal(q.high).filter(|v| !v.is_zero()).unwrap_or(close);
        let low = to_decimal(q.low).filter(|v| !v.is_zero()).unwrap_or(close);

        let mut bar = PriceBar::new(
            symbol,
            timeframe,
            date,
            open,
            high.max(open).max(close),
            low.min(open).min(close),
            close,
            q.volume.max(0),
        );
        bar.adj_close = to_decimal(q.adjclose).filter(|v| v.is_sign_positive() && !v.is_zero());
        bars.push(bar);
    }

    bars.sort_by_key(|b| b.date);
    bars.reverse();
    bars.dedup_by_key(|b| b.date);
    bars.reverse();
    bars
}

fn classify_yahoo_error(symbol: &str, message: String) -> DataError {
    let lower = message.to_lowercase();
    if lower.contains("429") || lower.contains("too many") {
        DataError::RateLimited(format!("Yahoo Finance ({}): {}", symbol, message))
    } else if lower.contains("timed out")
        || lower.contains("connection")
        || ["500", "502", "503", "504"].iter().any(|code| lower.contains(code))
    {
        DataError::Network(format!("Yahoo Finance ({}): {}", symbol, message))
    } else {
        DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", symbol, message))
    }
}

fn naive_date_to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime> {
    let month = time::Month::try_from(date.month() as u8)
        .map_err(|e| DataError::InvalidData(format!("잘못된 월: {}", e)))?;
    let day = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
        .map_err(|e| DataError::InvalidData(format!("잘못된 날짜 {}: {}", date, e)))?;
    Ok(day.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(timestamp: i64, close: f64) -> RawQuote {
        RawQuote {
            timestamp,
            open: close - 1.0,
            high: close + 2.0,
            low: close - 2.0,
            close,
            adjclose: close * 0.9,
            volume: 1_000,
        }
    }

    #[test]
    fn test_quotes_sorted_and_filtered() {
        // 2024-01-03, 2024-01-02, 그리고 종가가 NaN인 바
        let quotes = vec![
            quote(1_704_288_600, 101.0),
            quote(1_704_202_200, 100.0),
            RawQuote {
                close: f64::NAN,
                ..quote(1_704_375_000, 0.0)
            },
        ];

        let bars = quotes_to_bars("AAPL", Timeframe::D1, &quotes);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, dec!(101));
        assert_eq!(bars[1].adj_close, Some(dec!(90.9)));
        assert!(bars.iter().all(|b| b.is_consistent()));
    }

    #[test]
    fn test_duplicate_dates_keep_last() {
        let quotes = vec![quote(1_704_202_200, 100.0), quote(1_704_225_600, 100.5)];
        let bars = quotes_to_bars("MSFT", Timeframe::D1, &quotes);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, dec!(100.5));
    }

    #[test]
    fn test_offset_datetime_conversion() {
        let dt = naive_date_to_offset_datetime(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.day(), 29);
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_error_classification() {
        assert!(classify_yahoo_error("X", "HTTP 429 Too Many Requests".into()).is_retryable());
        assert!(!classify_yahoo_error("X", "No data found, symbol may be delisted".into()).is_retryable());
    }
}
