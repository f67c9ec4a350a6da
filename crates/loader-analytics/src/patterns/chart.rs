//! 클래식 차트 패턴: 헤드앤숄더, 이중 천장/바닥, 삼각형.
//!
//! 입력은 고점/저점이 번갈아 나오는 스윙 포인트 목록입니다
//! ([`swing_points`](super::pivots::swing_points)).

use loader_core::PatternDirection;
use serde_json::json;

use super::pivots::{SwingKind, SwingPoint};
use super::{clamp_confidence, DetectedPattern, KeyPoint, PatternConfig, PatternKind};
use crate::stats::slope_of;

/// 헤드앤숄더와 역헤드앤숄더를 모두 찾습니다.
pub fn head_and_shoulders(swings: &[SwingPoint], config: &PatternConfig) -> Vec<DetectedPattern> {
    swings
        .windows(5)
        .filter_map(|w| match_head_and_shoulders(w, config))
        .collect()
}

fn match_head_and_shoulders(w: &[SwingPoint], config: &PatternConfig) -> Option<DetectedPattern> {
    let (ls, t1, head, t2, rs) = (w[0], w[1], w[2], w[3], w[4]);
    // 천장형은 +1, 역형은 -1로 가격 비교 방향을 뒤집음
    let sign = match ls.kind {
        SwingKind::Peak => 1.0,
        SwingKind::Trough => -1.0,
    };

    if !(sign * head.price > sign * ls.price && sign * head.price > sign * rs.price) {
        return None;
    }

    let shoulder_avg = (ls.price + rs.price) / 2.0;
    if shoulder_avg <= 0.0 {
        return None;
    }
    let shoulder_diff = (ls.price - rs.price).abs() / shoulder_avg;
    if shoulder_diff > config.tolerance {
        return None;
    }

    let neck_slope = (t2.price - t1.price) / (t2.index as f64 - t1.index as f64);
    let neck_at = |i: usize| t1.price + neck_slope * (i as f64 - t1.index as f64);

    // 넥라인은 양 어깨 안쪽에 있어야 함
    if sign * (ls.price - neck_at(ls.index)) <= 0.0 || sign * (rs.price - neck_at(rs.index)) <= 0.0 {
        return None;
    }

    let height = head.price - neck_at(head.index);
    let neckline_break = neck_at(rs.index);
    let target = neckline_break - height;

    let symmetry = 1.0 - shoulder_diff / config.tolerance.max(f64::EPSILON);
    let left_span = (head.index - ls.index) as f64;
    let right_span = (rs.index - head.index) as f64;
    let time_balance = left_span.min(right_span) / left_span.max(right_span);
    let confidence = clamp_confidence(0.4 + 0.4 * symmetry + 0.2 * time_balance);

    let (kind, direction) = if sign > 0.0 {
        (PatternKind::HeadAndShoulders, PatternDirection::Bearish)
    } else {
        (PatternKind::InverseHeadAndShoulders, PatternDirection::Bullish)
    };

    Some(DetectedPattern {
        kind,
        direction,
        confidence,
        start_index: ls.index,
        end_index: rs.index,
        price_target: Some(target),
        points: vec![
            KeyPoint::new("left_shoulder", ls),
            KeyPoint::new("left_neck", t1),
            KeyPoint::new("head", head),
            KeyPoint::new("right_neck", t2),
            KeyPoint::new("right_shoulder", rs),
        ],
        details: json!({
            "neckline": neckline_break,
            "neckline_slope": neck_slope,
            "height": height.abs(),
            "shoulder_diff": shoulder_diff,
        }),
    })
}

/// 이중 천장과 이중 바닥을 찾습니다.
pub fn double_tops_bottoms(swings: &[SwingPoint], config: &PatternConfig) -> Vec<DetectedPattern> {
    swings
        .windows(3)
        .filter_map(|w| match_double(w, config))
        .collect()
}

fn match_double(w: &[SwingPoint], config: &PatternConfig) -> Option<DetectedPattern> {
    let (first, middle, second) = (w[0], w[1], w[2]);
    if second.index - first.index < config.order {
        return None;
    }

    let avg = (first.price + second.price) / 2.0;
    if avg <= 0.0 {
        return None;
    }
    let diff = (first.price - second.price).abs() / avg;
    if diff > config.tolerance {
        return None;
    }

    // 천장은 골이 아래, 바닥은 봉우리가 위
    let height = avg - middle.price;
    let depth = height.abs() / avg;
    if depth < config.min_depth {
        return None;
    }

    let similarity = 1.0 - diff / config.tolerance.max(f64::EPSILON);
    let depth_score = (depth / (2.0 * config.min_depth.max(f64::EPSILON))).min(1.0);
    let confidence = clamp_confidence(0.5 + 0.3 * similarity + 0.2 * depth_score);

    let (kind, direction, labels) = match first.kind {
        SwingKind::Peak => (
            PatternKind::DoubleTop,
            PatternDirection::Bearish,
            ["first_top", "valley", "second_top"],
        ),
        SwingKind::Trough => (
            PatternKind::DoubleBottom,
            PatternDirection::Bullish,
            ["first_bottom", "peak", "second_bottom"],
        ),
    };

    Some(DetectedPattern {
        kind,
        direction,
        confidence,
        start_index: first.index,
        end_index: second.index,
        price_target: Some(middle.price - height),
        points: vec![
            KeyPoint::new(labels[0], first),
            KeyPoint::new(labels[1], middle),
            KeyPoint::new(labels[2], second),
        ],
        details: json!({
            "confirmation_level": middle.price,
            "depth": depth,
            "price_diff": diff,
        }),
    })
}

/// 최근 스윙 포인트로 삼각형을 판정합니다.
///
/// 마지막 최대 3개의 고점과 저점에 각각 최소제곱 직선을 맞추고, 기울기를
/// 평균 가격으로 나눠 봉당 비율로 비교합니다.
pub fn triangle(swings: &[SwingPoint], config: &PatternConfig) -> Option<DetectedPattern> {
    let recent = |kind: SwingKind| -> Vec<SwingPoint> {
        let mut points: Vec<SwingPoint> = swings
            .iter()
            .rev()
            .filter(|s| s.kind == kind)
            .take(3)
            .copied()
            .collect();
        points.reverse();
        points
    };
    let peaks = recent(SwingKind::Peak);
    let troughs = recent(SwingKind::Trough);
    if peaks.len() < 2 || troughs.len() < 2 {
        return None;
    }

    let (upper_slope, upper_icpt) = fit_line(&peaks)?;
    let (lower_slope, lower_icpt) = fit_line(&troughs)?;

    let all: Vec<&SwingPoint> = peaks.iter().chain(troughs.iter()).collect();
    let avg_price = all.iter().map(|p| p.price).sum::<f64>() / all.len() as f64;
    if avg_price <= 0.0 {
        return None;
    }
    let upper_norm = upper_slope / avg_price;
    let lower_norm = lower_slope / avg_price;
    let flat = config.flat_slope;

    let start_index = peaks[0].index.min(troughs[0].index);
    let end_index = all.iter().map(|p| p.index).max()?;

    // 끝 지점에서 상단선이 하단선 위에 있어야 함
    let x_end = end_index as f64;
    let width_end = (upper_slope * x_end + upper_icpt) - (lower_slope * x_end + lower_icpt);
    if width_end <= 0.0 {
        return None;
    }
    let x_start = start_index as f64;
    let width_start = (upper_slope * x_start + upper_icpt) - (lower_slope * x_start + lower_icpt);
    if width_end >= width_start {
        return None;
    }

    let resistance = peaks.iter().map(|p| p.price).sum::<f64>() / peaks.len() as f64;
    let support = troughs.iter().map(|p| p.price).sum::<f64>() / troughs.len() as f64;
    let height = (peaks[0].price - troughs[0].price).abs();

    let (kind, direction, target) = if upper_norm.abs() <= flat && lower_norm > flat {
        (
            PatternKind::AscendingTriangle,
            PatternDirection::Bullish,
            Some(resistance + height),
        )
    } else if upper_norm < -flat && lower_norm.abs() <= flat {
        (
            PatternKind::DescendingTriangle,
            PatternDirection::Bearish,
            Some(support - height),
        )
    } else if upper_norm < -flat && lower_norm > flat {
        (PatternKind::SymmetricalTriangle, PatternDirection::Neutral, None)
    } else {
        return None;
    };

    let touches = peaks.len() + troughs.len();
    let confidence = clamp_confidence(0.6 + 0.1 * (touches as f64 - 4.0));

    let mut points: Vec<KeyPoint> = peaks
        .iter()
        .map(|p| KeyPoint::new("upper", *p))
        .chain(troughs.iter().map(|p| KeyPoint::new("lower", *p)))
        .collect();
    points.sort_by_key(|k| k.point.index);

    Some(DetectedPattern {
        kind,
        direction,
        confidence,
        start_index,
        end_index,
        price_target: target,
        points,
        details: json!({
            "upper_slope": upper_norm,
            "lower_slope": lower_norm,
            "resistance": resistance,
            "support": support,
            "touches": touches,
        }),
    })
}

fn fit_line(points: &[SwingPoint]) -> Option<(f64, f64)> {
    let xy: Vec<(f64, f64)> = points.iter().map(|p| (p.index as f64, p.price)).collect();
    let slope = slope_of(&xy)?;
    let n = xy.len() as f64;
    let mx = xy.iter().map(|p| p.0).sum::<f64>() / n;
    let my = xy.iter().map(|p| p.1).sum::<f64>() / n;
    Some((slope, my - slope * mx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(index: usize, price: f64) -> SwingPoint {
        SwingPoint::peak(index, price)
    }

    fn t(index: usize, price: f64) -> SwingPoint {
        SwingPoint::trough(index, price)
    }

    #[test]
    fn test_head_and_shoulders() {
        let swings = [p(10, 110.0), t(20, 100.0), p(30, 120.0), t(40, 100.0), p(50, 111.0)];
        let found = head_and_shoulders(&swings, &PatternConfig::default());

        assert_eq!(found.len(), 1);
        let hs = &found[0];
        assert_eq!(hs.kind, PatternKind::HeadAndShoulders);
        assert_eq!(hs.direction, PatternDirection::Bearish);
        // 넥라인 100, 높이 20
        assert!((hs.price_target.unwrap() - 80.0).abs() < 1e-9);
        assert!(hs.confidence > 0.5);
    }

    #[test]
    fn test_inverse_head_and_shoulders() {
        let swings = [t(5, 90.0), p(10, 100.0), t(15, 80.0), p(20, 100.0), t(25, 90.5)];
        let found = head_and_shoulders(&swings, &PatternConfig::default());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::InverseHeadAndShoulders);
        assert!((found[0].price_target.unwrap() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_head_and_shoulders_rejects_uneven_shoulders() {
        let swings = [p(10, 100.0), t(20, 95.0), p(30, 120.0), t(40, 95.0), p(50, 110.0)];
        assert!(head_and_shoulders(&swings, &PatternConfig::default()).is_empty());
    }

    #[test]
    fn test_double_top_and_bottom() {
        let config = PatternConfig::default();
        let top = double_tops_bottoms(&[p(10, 100.0), t(20, 90.0), p(30, 100.5)], &config);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].kind, PatternKind::DoubleTop);
        assert!(top[0].price_target.unwrap() < 90.0);

        let bottom = double_tops_bottoms(&[t(10, 50.0), p(20, 55.0), t(30, 50.2)], &config);
        assert_eq!(bottom.len(), 1);
        assert_eq!(bottom[0].kind, PatternKind::DoubleBottom);
        assert!(bottom[0].price_target.unwrap() > 55.0);
    }

    #[test]
    fn test_double_top_requires_depth_and_spacing() {
        let config = PatternConfig::default();
        // 골 깊이 1% 미만
        assert!(double_tops_bottoms(&[p(10, 100.0), t(20, 99.0), p(30, 100.0)], &config).is_empty());
        // 간격이 order보다 짧음
        assert!(double_tops_bottoms(&[p(10, 100.0), t(12, 90.0), p(14, 100.0)], &config).is_empty());
    }

    #[test]
    fn test_ascending_triangle() {
        let swings = [
            p(0, 110.0),
            t(5, 95.0),
            p(10, 110.2),
            t(15, 99.0),
            p(20, 110.1),
            t(25, 103.0),
        ];
        let tri = triangle(&swings, &PatternConfig::default()).unwrap();
        assert_eq!(tri.kind, PatternKind::AscendingTriangle);
        assert_eq!(tri.direction, PatternDirection::Bullish);
        assert!((tri.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_symmetrical_and_descending_triangle() {
        let config = PatternConfig::default();
        let sym = [p(0, 120.0), t(5, 90.0), p(10, 115.0), t(15, 95.0), p(20, 110.0), t(25, 100.0)];
        assert_eq!(
            triangle(&sym, &config).unwrap().kind,
            PatternKind::SymmetricalTriangle
        );

        let desc = [t(0, 90.0), p(5, 120.0), t(10, 90.1), p(15, 112.0), t(20, 89.9), p(25, 104.0)];
        let tri = triangle(&desc, &config).unwrap();
        assert_eq!(tri.kind, PatternKind::DescendingTriangle);
        assert!(tri.price_target.unwrap() < 90.0);
    }

    #[test]
    fn test_diverging_lines_are_not_triangles() {
        let swings = [p(0, 105.0), t(5, 95.0), p(10, 110.0), t(15, 90.0), p(20, 115.0), t(25, 85.0)];
        assert!(triangle(&swings, &PatternConfig::default()).is_none());
    }
}
