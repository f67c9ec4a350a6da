//! 가격 바 (OHLCV).

use crate::types::Timeframe;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 일/주/월 단위 OHLCV 바.
///
/// `date`는 바가 시작하는 거래일(UTC 기준 달력 날짜)입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 티커
    pub symbol: String,
    /// 타임프레임
    pub timeframe: Timeframe,
    /// 바 날짜
    pub date: NaiveDate,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 수정 종가 (배당/분할 반영)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<Decimal>,
    /// 거래량
    pub volume: i64,
}

impl PriceBar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: i64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            date,
            open,
            high,
            low,
            close,
            adj_close: None,
            volume,
        }
    }

    /// 고가 - 저가.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 대표가 (고가 + 저가 + 종가) / 3.
    pub fn typical_price(&self) -> Decimal {
        (self.high + self.low + self.close) / Decimal::from(3)
    }

    /// 수정 종가가 있으면 수정 종가, 없으면 종가.
    pub fn effective_close(&self) -> Decimal {
        self.adj_close.unwrap_or(self.close)
    }

    /// OHLC가 서로 일관적인지 확인합니다 (저가 ≤ 시가/종가 ≤ 고가, 양수 가격).
    pub fn is_consistent(&self) -> bool {
        self.low > Decimal::ZERO
            && self.low <= self.high
            && self.open >= self.low
            && self.open <= self.high
            && self.close >= self.low
            && self.close <= self.high
            && self.volume >= 0
    }
}

/// 분석용 f64 시계열.
///
/// 지표/패턴 계산은 `f64`로 수행하므로 바 목록을 열 단위 벡터로 변환합니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    pub dates: Vec<NaiveDate>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    /// 수정 종가 (없으면 종가)
    pub adj_close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl PriceSeries {
    /// 바 목록(오름차순)을 시계열로 변환합니다.
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        let mut series = Self::default();
        for bar in bars {
            series.dates.push(bar.date);
            series.open.push(bar.open.to_f64().unwrap_or(f64::NAN));
            series.high.push(bar.high.to_f64().unwrap_or(f64::NAN));
            series.low.push(bar.low.to_f64().unwrap_or(f64::NAN));
            series.close.push(bar.close.to_f64().unwrap_or(f64::NAN));
            series
                .adj_close
                .push(bar.effective_close().to_f64().unwrap_or(f64::NAN));
            series.volume.push(bar.volume as f64);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}
