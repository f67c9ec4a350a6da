//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger Bands (모표준편차)
//! - ATR (Average True Range, Wilder 평활)

use serde::{Deserialize, Serialize};

use super::trend::{check_len, check_period};
use super::{IndicatorError, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: f64,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

/// 볼린저 밴드 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 상단 밴드.
    pub upper: Option<f64>,
    /// 중간 밴드 (SMA).
    pub middle: Option<f64>,
    /// 하단 밴드.
    pub lower: Option<f64>,
    /// 밴드 폭 ((상단 - 하단) / 중간).
    pub bandwidth: Option<f64>,
    /// %B ((가격 - 하단) / (상단 - 하단)).
    pub percent_b: Option<f64>,
}

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 중간 = SMA(period), 상단/하단 = 중간 ± k × σ (창 내 모표준편차).
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        let period = params.period;
        check_period(period)?;
        check_len(prices, period)?;
        if !(params.std_dev_multiplier.is_finite() && params.std_dev_multiplier > 0.0) {
            return Err(IndicatorError::InvalidParameter(
                "표준편차 배수는 0보다 커야 합니다".to_string(),
            ));
        }

        let n = period as f64;
        Ok((0..prices.len())
            .map(|i| {
                if i + 1 < period {
                    return BollingerBandsResult::default();
                }
                let window = &prices[i + 1 - period..=i];
                let middle = window.iter().sum::<f64>() / n;
                let variance = window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / n;
                let band = params.std_dev_multiplier * variance.sqrt();
                if !(middle.is_finite() && band.is_finite()) {
                    return BollingerBandsResult::default();
                }

                let upper = middle + band;
                let lower = middle - band;
                BollingerBandsResult {
                    upper: Some(upper),
                    middle: Some(middle),
                    lower: Some(lower),
                    bandwidth: (middle != 0.0).then(|| (upper - lower) / middle),
                    percent_b: (upper != lower).then(|| (prices[i] - lower) / (upper - lower)),
                }
            })
            .collect())
    }

    /// ATR 계산.
    ///
    /// TR = max(고가 - 저가, |고가 - 전일 종가|, |저가 - 전일 종가|).
    /// 첫 ATR은 인덱스 1..=period의 TR 평균이며 이후 Wilder 평활을 적용합니다.
    pub fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_period(period)?;
        if high.len() != low.len() || low.len() != close.len() {
            return Err(IndicatorError::InvalidParameter(
                "고가/저가/종가 길이가 다릅니다".to_string(),
            ));
        }
        check_len(close, period + 1)?;

        let tr: Vec<f64> = (0..close.len())
            .map(|i| {
                if i == 0 {
                    high[0] - low[0]
                } else {
                    let prev = close[i - 1];
                    (high[i] - low[i])
                        .max((high[i] - prev).abs())
                        .max((low[i] - prev).abs())
                }
            })
            .collect();

        let p = period as f64;
        let mut result = vec![None; close.len()];
        let mut atr = tr[1..=period].iter().sum::<f64>() / p;
        result[period] = atr.is_finite().then_some(atr);

        for i in (period + 1)..close.len() {
            atr = (atr * (p - 1.0) + tr[i]) / p;
            result[i] = atr.is_finite().then_some(atr);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bollinger_constant_series() {
        let vol = VolatilityIndicators::new();
        let prices = vec![10.0; 25];
        let bb = vol.bollinger_bands(&prices, BollingerBandsParams::default()).unwrap();

        assert!(bb[18].middle.is_none());
        assert_eq!(bb[19].middle, Some(10.0));
        assert_eq!(bb[19].upper, Some(10.0));
        assert_eq!(bb[19].percent_b, None);
    }

    #[test]
    fn test_bollinger_band_width() {
        let vol = VolatilityIndicators::new();
        // 창 [1, 3]: 평균 2, 모표준편차 1
        let bb = vol
            .bollinger_bands(
                &[1.0, 3.0],
                BollingerBandsParams {
                    period: 2,
                    std_dev_multiplier: 2.0,
                },
            )
            .unwrap();
        assert_eq!(bb[1].upper, Some(4.0));
        assert_eq!(bb[1].lower, Some(0.0));
        assert_eq!(bb[1].percent_b, Some(0.75));
    }

    #[test]
    fn test_atr_constant_range() {
        let vol = VolatilityIndicators::new();
        let close: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();

        let atr = vol.atr(&high, &low, &close, AtrParams { period: 5 }).unwrap();
        assert!(atr[4].is_none());
        // TR = max(2, |c+1 - (c-1)|=2, |c-1-(c-1)|=0) = 2
        assert!((atr[5].unwrap() - 2.0).abs() < 1e-12);
        assert!((atr[19].unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_atr_length_mismatch() {
        let vol = VolatilityIndicators::new();
        assert!(vol
            .atr(&[1.0, 2.0], &[1.0], &[1.0, 2.0], AtrParams { period: 1 })
            .is_err());
    }
}
