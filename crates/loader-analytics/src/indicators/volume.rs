//! 거래량 지표.

use super::{IndicatorError, IndicatorResult};

/// OBV (On-Balance Volume) 계산기.
#[derive(Debug, Default)]
pub struct ObvIndicator;

impl ObvIndicator {
    pub fn new() -> Self {
        Self
    }

    /// 누적 OBV. 종가 상승일은 거래량을 더하고, 하락일은 빼며, 보합은 유지합니다.
    /// 첫 값은 0입니다.
    pub fn calculate(&self, close: &[f64], volume: &[f64]) -> IndicatorResult<Vec<f64>> {
        if close.len() != volume.len() {
            return Err(IndicatorError::InvalidParameter(
                "종가/거래량 길이가 다릅니다".to_string(),
            ));
        }

        let mut obv = Vec::with_capacity(close.len());
        let mut acc = 0.0;
        for i in 0..close.len() {
            if i > 0 {
                let vol = if volume[i].is_finite() { volume[i] } else { 0.0 };
                if close[i] > close[i - 1] {
                    acc += vol;
                } else if close[i] < close[i - 1] {
                    acc -= vol;
                }
            }
            obv.push(acc);
        }
        Ok(obv)
    }
}
