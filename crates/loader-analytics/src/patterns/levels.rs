//! 지지/저항 레벨: 플로어 피벗 포인트와 피보나치 되돌림/확장.

use serde::{Deserialize, Serialize};

use super::pivots::SwingKind;

/// 피보나치 되돌림 비율.
pub const RETRACEMENT_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];

/// 피보나치 확장 비율.
pub const EXTENSION_RATIOS: [f64; 2] = [1.272, 1.618];

/// 클래식 플로어 피벗 포인트.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl PivotPoints {
    /// 한 봉의 고가/저가/종가로 피벗 레벨을 계산합니다.
    pub fn from_bar(high: f64, low: f64, close: f64) -> Option<Self> {
        if !(high.is_finite() && low.is_finite() && close.is_finite()) || high < low {
            return None;
        }
        let pivot = (high + low + close) / 3.0;
        let range = high - low;
        Some(Self {
            pivot,
            r1: 2.0 * pivot - low,
            r2: pivot + range,
            r3: high + 2.0 * (pivot - low),
            s1: 2.0 * pivot - high,
            s2: pivot - range,
            s3: low - 2.0 * (high - pivot),
        })
    }
}

/// 비율과 가격 한 쌍.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevel {
    pub ratio: f64,
    pub price: f64,
}

/// 주요 스윙 기준 피보나치 레벨.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub swing_high: f64,
    pub swing_low: f64,
    pub high_index: usize,
    pub low_index: usize,
    /// 마지막 극값 종류. `Peak`이면 상승 스윙 후의 되돌림입니다.
    pub last_extreme: SwingKind,
    pub retracements: Vec<FibonacciLevel>,
    pub extensions: Vec<FibonacciLevel>,
}

impl FibonacciLevels {
    /// 최근 `lookback`봉의 최고가/최저가로 레벨을 계산합니다.
    ///
    /// 저점이 고점보다 먼저면 상승 스윙으로 보고 고점에서 아래로 되돌림을,
    /// 저점 위로 확장을 계산합니다. 반대면 방향을 뒤집습니다.
    pub fn from_range(high: &[f64], low: &[f64], lookback: usize) -> Option<Self> {
        let n = high.len().min(low.len());
        if n < 2 || lookback < 2 {
            return None;
        }
        let start = n.saturating_sub(lookback);

        let (high_index, swing_high) = extreme(&high[start..n], |a, b| a > b)?;
        let (low_index, swing_low) = extreme(&low[start..n], |a, b| a < b)?;
        let diff = swing_high - swing_low;
        if diff <= 0.0 {
            return None;
        }

        let uptrend = low_index < high_index;
        let retracements = RETRACEMENT_RATIOS
            .iter()
            .map(|&ratio| FibonacciLevel {
                ratio,
                price: if uptrend {
                    swing_high - diff * ratio
                } else {
                    swing_low + diff * ratio
                },
            })
            .collect();
        let extensions = EXTENSION_RATIOS
            .iter()
            .map(|&ratio| FibonacciLevel {
                ratio,
                price: if uptrend {
                    swing_low + diff * ratio
                } else {
                    swing_high - diff * ratio
                },
            })
            .collect();

        Some(Self {
            swing_high,
            swing_low,
            high_index: start + high_index,
            low_index: start + low_index,
            last_extreme: if uptrend {
                SwingKind::Peak
            } else {
                SwingKind::Trough
            },
            retracements,
            extensions,
        })
    }
}

fn extreme(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<(usize, f64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if !better(v, b) => best,
            _ => Some((i, v)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_floor_pivots() {
        let p = PivotPoints::from_bar(110.0, 90.0, 100.0).unwrap();
        assert!(approx(p.pivot, 100.0));
        assert!(approx(p.r1, 110.0));
        assert!(approx(p.s1, 90.0));
        assert!(approx(p.r2, 120.0));
        assert!(approx(p.s2, 80.0));
        assert!(approx(p.r3, 130.0));
        assert!(approx(p.s3, 70.0));
        assert!(p.s3 < p.s2 && p.s2 < p.s1 && p.s1 < p.pivot && p.pivot < p.r1);
    }

    #[test]
    fn test_pivots_reject_inverted_bar() {
        assert!(PivotPoints::from_bar(90.0, 110.0, 100.0).is_none());
    }

    #[test]
    fn test_fibonacci_uptrend() {
        let high = [10.0, 12.0, 15.0, 20.0, 18.0];
        let low = [5.0, 9.0, 13.0, 17.0, 16.0];
        let fib = FibonacciLevels::from_range(&high, &low, 10).unwrap();

        assert_eq!(fib.low_index, 0);
        assert_eq!(fib.high_index, 3);
        assert_eq!(fib.last_extreme, SwingKind::Peak);
        // 20 - 15 × 0.5
        assert!(approx(fib.retracements[2].price, 12.5));
        // 5 + 15 × 1.618
        assert!(approx(fib.extensions[1].price, 29.27));
    }

    #[test]
    fn test_fibonacci_downtrend_and_lookback() {
        let high = [50.0, 30.0, 20.0, 18.0, 12.0];
        let low = [1.0, 25.0, 15.0, 10.0, 8.0];
        // 최근 4봉만 사용: 고점 30 (1), 저점 8 (4)
        let fib = FibonacciLevels::from_range(&high, &low, 4).unwrap();
        assert_eq!(fib.high_index, 1);
        assert_eq!(fib.low_index, 4);
        assert_eq!(fib.last_extreme, SwingKind::Trough);
        assert!(approx(fib.retracements[0].price, 8.0 + 22.0 * 0.236));
    }

    #[test]
    fn test_fibonacci_flat_range() {
        assert!(FibonacciLevels::from_range(&[5.0; 10], &[5.0; 10], 10).is_none());
    }
}
