//! 하모닉 XABCD 패턴 (Gartley, Butterfly, Bat, Crab).

use loader_core::PatternDirection;
use serde_json::json;

use super::pivots::{SwingKind, SwingPoint};
use super::{clamp_confidence, DetectedPattern, KeyPoint, PatternKind};

/// 비율 허용 구간과 이상값.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioWindow {
    pub min: f64,
    pub ideal: f64,
    pub max: f64,
}

impl RatioWindow {
    const fn new(min: f64, ideal: f64, max: f64) -> Self {
        Self { min, ideal, max }
    }

    pub fn contains(&self, ratio: f64) -> bool {
        ratio >= self.min && ratio <= self.max
    }

    /// 이상값과의 근접도 (구간 끝에서 0, 이상값에서 1).
    pub fn closeness(&self, ratio: f64) -> f64 {
        let half = (self.ideal - self.min).max(self.max - self.ideal);
        if half <= 0.0 {
            return 1.0;
        }
        (1.0 - (ratio - self.ideal).abs() / half).max(0.0)
    }
}

/// 하모닉 패턴 정의.
#[derive(Debug, Clone, Copy)]
pub struct HarmonicDef {
    pub kind: PatternKind,
    pub ab_xa: RatioWindow,
    pub bc_ab: RatioWindow,
    pub cd_bc: RatioWindow,
    pub ad_xa: RatioWindow,
}

const BC_AB: RatioWindow = RatioWindow::new(0.382, 0.618, 0.886);

pub const HARMONIC_DEFS: [HarmonicDef; 4] = [
    HarmonicDef {
        kind: PatternKind::Gartley,
        ab_xa: RatioWindow::new(0.568, 0.618, 0.668),
        bc_ab: BC_AB,
        cd_bc: RatioWindow::new(1.13, 1.272, 1.618),
        ad_xa: RatioWindow::new(0.736, 0.786, 0.836),
    },
    HarmonicDef {
        kind: PatternKind::Butterfly,
        ab_xa: RatioWindow::new(0.736, 0.786, 0.836),
        bc_ab: BC_AB,
        cd_bc: RatioWindow::new(1.618, 2.0, 2.618),
        ad_xa: RatioWindow::new(1.27, 1.27, 1.618),
    },
    HarmonicDef {
        kind: PatternKind::Bat,
        ab_xa: RatioWindow::new(0.382, 0.441, 0.5),
        bc_ab: BC_AB,
        cd_bc: RatioWindow::new(1.618, 2.0, 2.618),
        ad_xa: RatioWindow::new(0.836, 0.886, 0.936),
    },
    HarmonicDef {
        kind: PatternKind::Crab,
        ab_xa: RatioWindow::new(0.382, 0.5, 0.618),
        bc_ab: BC_AB,
        cd_bc: RatioWindow::new(2.24, 3.14, 3.618),
        ad_xa: RatioWindow::new(1.568, 1.618, 1.668),
    },
];

/// XABCD 다리 비율.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegRatios {
    pub ab_xa: f64,
    pub bc_ab: f64,
    pub cd_bc: f64,
    pub ad_xa: f64,
}

impl LegRatios {
    pub fn from_points(x: f64, a: f64, b: f64, c: f64, d: f64) -> Option<Self> {
        let xa = (a - x).abs();
        let ab = (b - a).abs();
        let bc = (c - b).abs();
        if xa == 0.0 || ab == 0.0 || bc == 0.0 {
            return None;
        }
        Some(Self {
            ab_xa: ab / xa,
            bc_ab: bc / ab,
            cd_bc: (d - c).abs() / bc,
            ad_xa: (a - d).abs() / xa,
        })
    }
}

/// 연속된 다섯 스윙 포인트마다 가장 잘 맞는 하모닉 패턴을 찾습니다.
pub fn harmonic_patterns(swings: &[SwingPoint]) -> Vec<DetectedPattern> {
    swings.windows(5).filter_map(match_window).collect()
}

fn match_window(w: &[SwingPoint]) -> Option<DetectedPattern> {
    let (x, a, b, c, d) = (w[0], w[1], w[2], w[3], w[4]);
    let ratios = LegRatios::from_points(x.price, a.price, b.price, c.price, d.price)?;

    let (def, confidence) = HARMONIC_DEFS
        .iter()
        .filter_map(|def| score(def, &ratios).map(|c| (def, c)))
        .max_by(|l, r| l.1.total_cmp(&r.1))?;

    // X가 저점이면 D도 저점이므로 상승 반전
    let direction = match x.kind {
        SwingKind::Trough => PatternDirection::Bullish,
        SwingKind::Peak => PatternDirection::Bearish,
    };
    let target = d.price + 0.618 * (a.price - d.price);

    Some(DetectedPattern {
        kind: def.kind,
        direction,
        confidence,
        start_index: x.index,
        end_index: d.index,
        price_target: Some(target),
        points: vec![
            KeyPoint::new("X", x),
            KeyPoint::new("A", a),
            KeyPoint::new("B", b),
            KeyPoint::new("C", c),
            KeyPoint::new("D", d),
        ],
        details: json!({
            "ab_xa": ratios.ab_xa,
            "bc_ab": ratios.bc_ab,
            "cd_bc": ratios.cd_bc,
            "ad_xa": ratios.ad_xa,
        }),
    })
}

/// 네 비율이 모두 구간 안이면 신뢰도를 반환합니다.
pub fn score(def: &HarmonicDef, ratios: &LegRatios) -> Option<f64> {
    let checks = [
        (def.ab_xa, ratios.ab_xa),
        (def.bc_ab, ratios.bc_ab),
        (def.cd_bc, ratios.cd_bc),
        (def.ad_xa, ratios.ad_xa),
    ];
    if !checks.iter().all(|(window, r)| window.contains(*r)) {
        return None;
    }
    let closeness = checks.iter().map(|(window, r)| window.closeness(*r)).sum::<f64>() / 4.0;
    Some(clamp_confidence(0.5 + 0.5 * closeness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullish_gartley() {
        let swings = [
            SwingPoint::trough(0, 100.0),
            SwingPoint::peak(10, 200.0),
            SwingPoint::trough(20, 138.2),
            SwingPoint::peak(30, 176.4),
            SwingPoint::trough(40, 121.4),
        ];
        let found = harmonic_patterns(&swings);

        assert_eq!(found.len(), 1);
        let g = &found[0];
        assert_eq!(g.kind, PatternKind::Gartley);
        assert_eq!(g.direction, PatternDirection::Bullish);
        assert_eq!(g.name(), "bullish_gartley");
        assert!(g.confidence > 0.8);
        assert!(g.price_target.unwrap() > 121.4);
    }

    #[test]
    fn test_bearish_crab() {
        // X=200, A=100, B=160 (0.6), C=115 (BC/AB 0.75), D=261.8 (AD/XA 1.618)
        let swings = [
            SwingPoint::peak(0, 200.0),
            SwingPoint::trough(10, 100.0),
            SwingPoint::peak(20, 160.0),
            SwingPoint::trough(30, 115.0),
            SwingPoint::peak(40, 261.8),
        ];
        let found = harmonic_patterns(&swings);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::Crab);
        assert_eq!(found[0].name(), "bearish_crab");
        assert!(found[0].price_target.unwrap() < 261.8);
    }

    #[test]
    fn test_ratios_outside_windows() {
        let swings = [
            SwingPoint::trough(0, 100.0),
            SwingPoint::peak(10, 200.0),
            SwingPoint::trough(20, 190.0),
            SwingPoint::peak(30, 195.0),
            SwingPoint::trough(40, 150.0),
        ];
        assert!(harmonic_patterns(&swings).is_empty());
    }

    #[test]
    fn test_closeness_decays() {
        let window = RatioWindow::new(0.5, 0.6, 0.7);
        assert!((window.closeness(0.6) - 1.0).abs() < 1e-12);
        assert!(window.closeness(0.65) < 1.0);
        assert!(window.closeness(0.7) < 1e-9);
    }
}
