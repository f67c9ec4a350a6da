//! 통계 유틸리티.
//!
//! 모든 함수는 `f64` 슬라이스를 받으며 NaN/무한대를 결측값으로 취급합니다.
//! 벡터를 반환하는 함수는 입력과 길이가 같고, 결측 위치는 NaN으로 유지됩니다.

use std::cmp::Ordering;

/// 유한한 값만 모읍니다.
fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut v = finite(values);
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    v
}

/// 산술 평균.
pub fn mean(values: &[f64]) -> Option<f64> {
    let v = finite(values);
    if v.is_empty() {
        return None;
    }
    Some(v.iter().sum::<f64>() / v.len() as f64)
}

/// 표준편차. `ddof = 0`이면 모표준편차, `1`이면 표본표준편차입니다.
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    let v = finite(values);
    if v.len() <= ddof {
        return None;
    }
    let m = v.iter().sum::<f64>() / v.len() as f64;
    let ss: f64 = v.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (v.len() - ddof) as f64).sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 0.5)
}

/// 분위수 (`q`는 0~1, 인접 순위 사이 선형 보간).
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let s = sorted_finite(values);
    if s.is_empty() || !q.is_finite() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (s.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(s[lo] + (s[hi] - s[lo]) * (pos - lo as f64))
}

/// z-점수 (모표준편차).
///
/// 유한한 값이 2개 미만이거나 표준편차가 0이면 유한한 항목은 모두 0이 됩니다.
/// 상수 계열의 표준편차는 반올림 오차로 0이 아닐 수 있으므로 평균 크기 대비
/// 기계 엡실론 수준 이하는 0으로 봅니다.
pub fn zscore(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    let sd = std_dev(values, 0).filter(|&sd| {
        let scale = m.map_or(1.0, |m| m.abs().max(1.0));
        sd.is_finite() && sd > f64::EPSILON * scale * 8.0 && !is_constant(values)
    });

    values
        .iter()
        .map(|&x| {
            if !x.is_finite() {
                return f64::NAN;
            }
            match (m, sd) {
                (Some(m), Some(sd)) => (x - m) / sd,
                _ => 0.0,
            }
        })
        .collect()
}

/// 유한한 값이 모두 같은지.
fn is_constant(values: &[f64]) -> bool {
    let mut it = values.iter().copied().filter(|v| v.is_finite());
    match it.next() {
        Some(first) => it.all(|v| v == first),
        None => true,
    }
}

/// 하위/상위 분위수로 극단값을 잘라냅니다.
pub fn winsorize(values: &[f64], lower_pct: f64, upper_pct: f64) -> Vec<f64> {
    let (Some(lo), Some(hi)) = (percentile(values, lower_pct), percentile(values, upper_pct)) else {
        return values.iter().map(|_| f64::NAN).collect();
    };
    values
        .iter()
        .map(|&x| if x.is_finite() { x.clamp(lo, hi) } else { f64::NAN })
        .collect()
}

/// z-점수를 `±limit`으로 제한합니다.
pub fn clip_zscores(values: &[f64], limit: f64) -> Vec<f64> {
    let limit = limit.abs();
    values
        .iter()
        .map(|&x| if x.is_finite() { x.clamp(-limit, limit) } else { f64::NAN })
        .collect()
}

/// 백분위 순위 (0, 1].
///
/// 동점은 평균 순위를 받고, 순위를 유한한 값의 개수로 나눕니다.
pub fn percentile_rank(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let n = indexed.len() as f64;
    let mut ranks = vec![f64::NAN; values.len()];
    let mut i = 0;
    while i < indexed.len() {
        let mut j = i;
        while j + 1 < indexed.len() && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        // 1-based 순위 i+1..=j+1의 평균
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for item in &indexed[i..=j] {
            ranks[item.0] = avg_rank / n;
        }
        i = j + 1;
    }
    ranks
}

/// 표준정규분포 누적분포함수.
pub fn norm_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// 오차함수 근사 (Abramowitz & Stegun 7.1.26, 절대오차 < 1.5e-7).
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

/// 연평균 성장률.
pub fn cagr(start: f64, end: f64, years: f64) -> Option<f64> {
    if !(start.is_finite() && end.is_finite() && years.is_finite()) {
        return None;
    }
    if start <= 0.0 || end < 0.0 || years <= 0.0 {
        return None;
    }
    Some((end / start).powf(1.0 / years) - 1.0)
}

/// 증가율 `(curr - prev) / |prev|`. 음수 기저에서도 개선이 양수가 됩니다.
pub fn growth_rate(prev: f64, curr: f64) -> Option<f64> {
    if !(prev.is_finite() && curr.is_finite()) || prev == 0.0 {
        return None;
    }
    Some((curr - prev) / prev.abs())
}

/// 분모가 0이거나 결측이면 `None`.
pub fn safe_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if !(n.is_finite() && d.is_finite()) || d == 0.0 {
        return None;
    }
    Some(n / d)
}

/// 단순 수익률. 길이는 `prices.len() - 1`이며 계산 불가 구간은 NaN입니다.
pub fn returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| {
            if w[0].is_finite() && w[1].is_finite() && w[0] != 0.0 {
                w[1] / w[0] - 1.0
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// 연율화 변동성 (표본표준편차 × √periods).
pub fn annualized_volatility(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    std_dev(returns, 1).map(|sd| sd * periods_per_year.sqrt())
}

/// 하방 편차 (음수 수익률만의 RMS, 연율화).
pub fn downside_deviation(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    let v = finite(returns);
    if v.len() < 2 {
        return None;
    }
    let ss: f64 = v.iter().map(|r| r.min(0.0).powi(2)).sum();
    Some((ss / v.len() as f64).sqrt() * periods_per_year.sqrt())
}

/// 최대 낙폭 (0 이하, 예: -0.35).
pub fn max_drawdown(prices: &[f64]) -> Option<f64> {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    let mut seen = false;

    for &p in prices.iter().filter(|p| p.is_finite() && **p > 0.0) {
        seen = true;
        peak = peak.max(p);
        worst = worst.min(p / peak - 1.0);
    }

    seen.then_some(worst)
}

/// 베타 = Cov(asset, benchmark) / Var(benchmark).
///
/// 두 시계열은 같은 시점끼리 정렬되어 있어야 하며, 둘 다 유한한 쌍만 사용합니다.
pub fn beta(asset: &[f64], benchmark: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = asset
        .iter()
        .zip(benchmark)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let ma = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mb = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let cov: f64 = pairs.iter().map(|(a, b)| (a - ma) * (b - mb)).sum();
    let var: f64 = pairs.iter().map(|(_, b)| (b - mb).powi(2)).sum();

    if var == 0.0 {
        None
    } else {
        Some(cov / var)
    }
}

/// 인덱스 대비 최소제곱 기울기.
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, v)| (i as f64, *v))
        .collect();
    slope_of(&points)
}

/// `(x, y)` 점들의 최소제곱 기울기.
pub fn slope_of(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.0).sum::<f64>() / n;
    let my = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|(x, _)| (x - mx).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = points.iter().map(|(x, y)| (x - mx) * (y - my)).sum();
    Some(sxy / sxx)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_mean_and_std_skip_missing() {
        let v = [1.0, 2.0, f64::NAN, 3.0, 4.0];
        assert!((mean(&v).unwrap() - 2.5).abs() < EPS);
        // 모표준편차 sqrt(1.25)
        assert!((std_dev(&v, 0).unwrap() - 1.25_f64.sqrt()).abs() < EPS);
        assert!((std_dev(&v, 1).unwrap() - (5.0_f64 / 3.0).sqrt()).abs() < EPS);
        assert_eq!(mean(&[f64::NAN]), None);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&v, 0.5).unwrap() - 2.5).abs() < EPS);
        assert!((percentile(&v, 0.25).unwrap() - 1.75).abs() < EPS);
        assert_eq!(percentile(&v, 1.0), Some(4.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
    }

    #[test]
    fn test_zscore_constant_series_is_zero() {
        let z = zscore(&[5.0, 5.0, f64::NAN, 5.0]);
        assert_eq!(z[0], 0.0);
        assert!(z[2].is_nan());
    }

    #[test]
    fn test_zscore_constant_series_with_rounding_is_zero() {
        // 평균이 0.44000000000000006, 표준편차가 5.55e-17로 계산되는 계열
        let z = zscore(&[0.44; 5]);
        assert!(z.iter().all(|v| *v == 0.0), "{:?}", z);

        let z = zscore(&[0.1, 0.1, 0.1, f64::NAN, 0.1, 0.1, 0.1, 0.1]);
        assert!(z.iter().filter(|v| v.is_finite()).all(|v| *v == 0.0));
    }

    #[test]
    fn test_zscore_values() {
        let z = zscore(&[1.0, 2.0, 3.0]);
        let sd = (2.0_f64 / 3.0).sqrt();
        assert!((z[0] + 1.0 / sd).abs() < EPS);
        assert!(z[1].abs() < EPS);
    }

    #[test]
    fn test_winsorize_clips_outliers() {
        let mut v: Vec<f64> = (1..=100).map(f64::from).collect();
        v.push(10_000.0);
        let w = winsorize(&v, 0.01, 0.99);
        let hi = percentile(&v, 0.99).unwrap();
        assert!((w[100] - hi).abs() < EPS);
        assert!(w[100] < 10_000.0);
        assert_eq!(w[50], 51.0);
    }

    #[test]
    fn test_percentile_rank_ties_average() {
        let r = percentile_rank(&[10.0, 20.0, 20.0, 40.0, f64::NAN]);
        assert!((r[0] - 0.25).abs() < EPS);
        assert!((r[1] - 0.625).abs() < EPS);
        assert!((r[2] - 0.625).abs() < EPS);
        assert!((r[3] - 1.0).abs() < EPS);
        assert!(r[4].is_nan());
    }

    #[test]
    fn test_norm_cdf_known_points() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((norm_cdf(1.96) - 0.975_002_1).abs() < 1e-6);
        assert!((norm_cdf(-1.0) - 0.158_655_3).abs() < 1e-6);
    }

    #[test]
    fn test_cagr_and_growth() {
        assert!((cagr(100.0, 121.0, 2.0).unwrap() - 0.1).abs() < EPS);
        assert_eq!(cagr(0.0, 10.0, 3.0), None);
        assert_eq!(cagr(10.0, -1.0, 3.0), None);
        assert!((growth_rate(-50.0, -25.0).unwrap() - 0.5).abs() < EPS);
        assert_eq!(growth_rate(0.0, 10.0), None);
        assert_eq!(safe_div(Some(1.0), Some(0.0)), None);
        assert_eq!(safe_div(Some(1.0), None), None);
    }

    #[test]
    fn test_drawdown_and_returns() {
        let prices = [100.0, 120.0, 90.0, 130.0, 104.0];
        assert!((max_drawdown(&prices).unwrap() + 0.25).abs() < EPS);
        let r = returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.1).abs() < EPS);
        assert!((r[1] + 0.1).abs() < EPS);
    }

    #[test]
    fn test_beta_of_scaled_series() {
        let bench = [0.01, -0.02, 0.015, 0.003, -0.007];
        let asset: Vec<f64> = bench.iter().map(|r| r * 1.5).collect();
        assert!((beta(&asset, &bench).unwrap() - 1.5).abs() < 1e-9);
        assert_eq!(beta(&[0.1, 0.2], &[0.0, 0.0]), None);
    }

    #[test]
    fn test_slope() {
        assert!((linear_slope(&[1.0, 3.0, 5.0, 7.0]).unwrap() - 2.0).abs() < EPS);
        assert_eq!(linear_slope(&[1.0]), None);
    }

    #[test]
    fn test_downside_deviation_ignores_gains() {
        let dd = downside_deviation(&[0.02, -0.02, 0.02, -0.02], 1.0).unwrap();
        assert!((dd - (0.0008_f64 / 4.0).sqrt()).abs() < EPS);
    }
}
