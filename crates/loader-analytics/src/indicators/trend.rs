//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<f64>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<f64>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<f64>,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// # 반환
    /// 각 시점의 SMA 값 (처음 period-1개는 None)
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_period(period)?;
        check_len(prices, period)?;

        let mut result = Vec::with_capacity(prices.len());
        for i in 0..prices.len() {
            if i + 1 < period {
                result.push(None);
            } else {
                let sum: f64 = prices[i + 1 - period..=i].iter().sum();
                let value = sum / period as f64;
                result.push(value.is_finite().then_some(value));
            }
        }

        Ok(result)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = (현재가 × k) + (이전 EMA × (1 - k)), k = 2 / (period + 1).
    /// 첫 값은 처음 period개의 SMA입니다.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_period(period)?;
        check_len(prices, period)?;

        Ok(ema_from(prices, 0, period))
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA
    /// 시그널 라인 = MACD 라인의 EMA
    /// 히스토그램 = MACD 라인 - 시그널 라인
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        if params.fast_period == 0 || params.signal_period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if params.fast_period >= params.slow_period {
            return Err(IndicatorError::InvalidParameter(
                "단기 기간은 장기 기간보다 짧아야 합니다".to_string(),
            ));
        }

        let min_required = params.slow_period + params.signal_period - 1;
        check_len(prices, min_required)?;

        let fast = ema_from(prices, 0, params.fast_period);
        let slow = ema_from(prices, 0, params.slow_period);

        let macd_line: Vec<f64> = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| match (f, s) {
                (Some(f), Some(s)) => f - s,
                _ => f64::NAN,
            })
            .collect();

        // MACD 라인은 slow_period-1 부터 존재
        let signal = ema_from(&macd_line, params.slow_period - 1, params.signal_period);

        Ok(macd_line
            .iter()
            .zip(signal)
            .map(|(&m, s)| {
                let macd = m.is_finite().then_some(m);
                MacdResult {
                    macd,
                    signal: s,
                    histogram: macd.zip(s).map(|(m, s)| m - s),
                }
            })
            .collect())
    }
}

/// `offset`부터 시작하는 구간에 대해 SMA로 시작하는 EMA를 계산합니다.
fn ema_from(values: &[f64], offset: usize, period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    let seed_end = offset + period;
    if period == 0 || values.len() < seed_end {
        return result;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = values[offset..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = Some(prev);

    for (i, value) in values.iter().enumerate().skip(seed_end) {
        prev = value * k + prev * (1.0 - k);
        result[i] = Some(prev);
    }
    result
}

pub(crate) fn check_period(period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_len(values: &[f64], required: usize) -> IndicatorResult<()> {
    if values.len() < required {
        return Err(IndicatorError::InsufficientData {
            required,
            provided: values.len(),
        });
    }
    Ok(())
}
