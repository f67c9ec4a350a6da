//! 모멘텀 지표 (Momentum Indicators).
//!
//! - RSI (Wilder 평활)
//! - ROC (Rate of Change, %)
//! - Momentum (n기간 가격 차이)

use serde::{Deserialize, Serialize};

use super::trend::{check_len, check_period};
use super::IndicatorResult;

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// ROC / Momentum 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RocParams {
    /// 비교 기간 (기본: 10).
    pub period: usize,
}

impl Default for RocParams {
    fn default() -> Self {
        Self { period: 10 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// 첫 평균 상승/하락폭은 처음 `period`개 변화의 단순 평균이고, 이후에는
    /// `avg = (prev × (period - 1) + 현재) / period`로 평활합니다.
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들 (처음 `period`개는 None)
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_period(period)?;
        check_len(prices, period + 1)?;

        let mut result = vec![None; prices.len()];
        let p = period as f64;

        let (mut avg_gain, mut avg_loss) = (0.0, 0.0);
        for i in 1..=period {
            let delta = prices[i] - prices[i - 1];
            avg_gain += delta.max(0.0);
            avg_loss += (-delta).max(0.0);
        }
        avg_gain /= p;
        avg_loss /= p;
        result[period] = rsi_value(avg_gain, avg_loss);

        for i in (period + 1)..prices.len() {
            let delta = prices[i] - prices[i - 1];
            avg_gain = (avg_gain * (p - 1.0) + delta.max(0.0)) / p;
            avg_loss = (avg_loss * (p - 1.0) + (-delta).max(0.0)) / p;
            result[i] = rsi_value(avg_gain, avg_loss);
        }

        Ok(result)
    }

    /// ROC = (현재가 / n기간 전 가격 - 1) × 100.
    pub fn roc(&self, prices: &[f64], params: RocParams) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_period(period)?;
        check_len(prices, period + 1)?;

        Ok((0..prices.len())
            .map(|i| {
                if i < period || prices[i - period] == 0.0 {
                    return None;
                }
                let v = (prices[i] / prices[i - period] - 1.0) * 100.0;
                v.is_finite().then_some(v)
            })
            .collect())
    }

    /// Momentum = 현재가 - n기간 전 가격.
    pub fn momentum(&self, prices: &[f64], params: RocParams) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_period(period)?;
        check_len(prices, period + 1)?;

        Ok((0..prices.len())
            .map(|i| {
                if i < period {
                    return None;
                }
                let v = prices[i] - prices[i - period];
                v.is_finite().then_some(v)
            })
            .collect())
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if !(avg_gain.is_finite() && avg_loss.is_finite()) {
        return None;
    }
    if avg_loss == 0.0 {
        // 변화가 전혀 없으면 중립
        return Some(if avg_gain == 0.0 { 50.0 } else { 100.0 });
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorError;

    #[test]
    fn test_rsi_bounds_and_warmup() {
        let calc = MomentumCalculator::new();
        let prices: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();

        assert!(rsi[13].is_none());
        assert!(rsi[14].is_some());
        for v in rsi.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn test_rsi_monotonic_series() {
        let calc = MomentumCalculator::new();
        let up: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let rsi = calc.rsi(&up, RsiParams { period: 5 }).unwrap();
        assert_eq!(rsi[19], Some(100.0));

        let flat = vec![50.0; 10];
        let rsi = calc.rsi(&flat, RsiParams { period: 5 }).unwrap();
        assert_eq!(rsi[9], Some(50.0));
    }

    #[test]
    fn test_rsi_known_value() {
        // 상승 +1, 하락 -1 교대: 첫 평균 gain = 2/4, loss = 2/4 → RSI 50
        let calc = MomentumCalculator::new();
        let prices = [10.0, 11.0, 10.0, 11.0, 10.0];
        let rsi = calc.rsi(&prices, RsiParams { period: 4 }).unwrap();
        assert!((rsi[4].unwrap() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_roc_and_momentum() {
        let calc = MomentumCalculator::new();
        let prices = [100.0, 101.0, 102.0, 110.0];
        let roc = calc.roc(&prices, RocParams { period: 3 }).unwrap();
        let mom = calc.momentum(&prices, RocParams { period: 3 }).unwrap();

        assert!(roc[2].is_none());
        assert!((roc[3].unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(mom[3], Some(10.0));
        assert!(matches!(
            calc.roc(&prices, RocParams { period: 4 }),
            Err(IndicatorError::InsufficientData { .. })
        ));
    }
}
