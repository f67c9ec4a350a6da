//! 고점/저점(스윙 포인트) 탐지.

use serde::{Deserialize, Serialize};

/// 스윙 포인트 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingKind {
    Peak,
    Trough,
}

/// 확정된 고점 또는 저점.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
    pub kind: SwingKind,
}

impl SwingPoint {
    pub fn peak(index: usize, price: f64) -> Self {
        Self {
            index,
            price,
            kind: SwingKind::Peak,
        }
    }

    pub fn trough(index: usize, price: f64) -> Self {
        Self {
            index,
            price,
            kind: SwingKind::Trough,
        }
    }

    pub fn is_peak(&self) -> bool {
        self.kind == SwingKind::Peak
    }
}

/// 엄격한 국소 최댓값의 인덱스.
///
/// `values[i]`가 좌우 `order`개 이웃보다 모두 커야 하며, 양쪽 창이 모두 있어야
/// 확정됩니다. 돌출도(prominence)가 `min_prominence` 미만인 봉우리는 버립니다.
pub fn find_peaks(values: &[f64], order: usize, min_prominence: f64) -> Vec<usize> {
    let order = order.max(1);
    if values.len() < 2 * order + 1 {
        return Vec::new();
    }

    (order..values.len() - order)
        .filter(|&i| {
            let v = values[i];
            v.is_finite()
                && values[i - order..i].iter().all(|&x| x < v)
                && values[i + 1..=i + order].iter().all(|&x| x < v)
        })
        .filter(|&i| min_prominence <= 0.0 || prominence(values, i) >= min_prominence)
        .collect()
}

/// 엄격한 국소 최솟값의 인덱스 (부호를 뒤집은 시계열의 봉우리).
pub fn find_troughs(values: &[f64], order: usize, min_prominence: f64) -> Vec<usize> {
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();
    find_peaks(&negated, order, min_prominence)
}

/// 봉우리의 돌출도.
///
/// 양쪽으로 더 높은 값을 만나기 전까지의 최솟값을 각각 구하고, 둘 중 높은 쪽을
/// 기준선으로 삼아 봉우리 높이와의 차이를 반환합니다.
pub fn prominence(values: &[f64], peak: usize) -> f64 {
    let height = values[peak];

    let mut left_min = height;
    for &v in values[..peak].iter().rev() {
        if v > height {
            break;
        }
        if v.is_finite() {
            left_min = left_min.min(v);
        }
    }

    let mut right_min = height;
    for &v in &values[peak + 1..] {
        if v > height {
            break;
        }
        if v.is_finite() {
            right_min = right_min.min(v);
        }
    }

    height - left_min.max(right_min)
}

/// 고가의 봉우리와 저가의 골을 합쳐 고점/저점이 번갈아 나오는 지그재그를 만듭니다.
///
/// 같은 종류가 연속되면 더 극단적인 점만 남깁니다.
pub fn swing_points(high: &[f64], low: &[f64], order: usize, min_prominence: f64) -> Vec<SwingPoint> {
    let mut points: Vec<SwingPoint> = find_peaks(high, order, min_prominence)
        .into_iter()
        .map(|i| SwingPoint::peak(i, high[i]))
        .chain(
            find_troughs(low, order, min_prominence)
                .into_iter()
                .map(|i| SwingPoint::trough(i, low[i])),
        )
        .collect();
    points.sort_by_key(|p| p.index);

    let mut zigzag: Vec<SwingPoint> = Vec::with_capacity(points.len());
    for point in points {
        match zigzag.last_mut() {
            Some(last) if last.kind == point.kind => {
                let more_extreme = match point.kind {
                    SwingKind::Peak => point.price > last.price,
                    SwingKind::Trough => point.price < last.price,
                };
                if more_extreme {
                    *last = point;
                }
            }
            // 같은 봉이 고점이자 저점이면 앞선 점을 유지
            Some(last) if last.index == point.index => {}
            _ => zigzag.push(point),
        }
    }
    zigzag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_peaks_strict() {
        let v = [1.0, 3.0, 2.0, 5.0, 4.0, 4.0, 6.0, 1.0];
        assert_eq!(find_peaks(&v, 1, 0.0), vec![1, 3, 6]);
        // 양옆 2개보다 커야 함
        assert_eq!(find_peaks(&v, 2, 0.0), vec![3]);
        // 평탄한 구간은 봉우리가 아님
        assert!(find_peaks(&[2.0, 2.0, 2.0, 2.0], 1, 0.0).is_empty());
    }

    #[test]
    fn test_prominence_filter() {
        let v = [0.0, 10.0, 9.0, 9.5, 0.0, 5.0, 0.0];
        // 9.5의 돌출도 = 9.5 - max(9.0, 0.0) = 0.5
        assert!((prominence(&v, 3) - 0.5).abs() < 1e-12);
        assert!((prominence(&v, 1) - 10.0).abs() < 1e-12);
        assert_eq!(find_peaks(&v, 1, 1.0), vec![1, 5]);
    }

    #[test]
    fn test_troughs() {
        let v = [5.0, 1.0, 4.0, 0.5, 6.0];
        assert_eq!(find_troughs(&v, 1, 0.0), vec![1, 3]);
    }

    #[test]
    fn test_swing_points_alternate() {
        let high = [1.0, 5.0, 2.0, 6.0, 3.0, 2.5, 3.5, 1.0, 4.0, 2.0];
        let low = [0.5, 4.0, 1.0, 5.0, 2.0, 1.5, 3.0, 0.2, 3.0, 1.5];
        let swings = swing_points(&high, &low, 1, 0.0);

        for pair in swings.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
            assert!(pair[0].index < pair[1].index);
        }
        assert!(swings.iter().any(|s| s.is_peak() && s.index == 3));
    }
}
