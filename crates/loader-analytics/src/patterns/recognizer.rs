//! 패턴 인식기: 한 종목의 바 전체에 모든 감지기를 적용합니다.

use chrono::NaiveDate;
use loader_core::{PatternDetection, PriceBar, PriceSeries, Timeframe};
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::chart::{double_tops_bottoms, head_and_shoulders, triangle};
use super::harmonic::harmonic_patterns;
use super::levels::{FibonacciLevels, PivotPoints};
use super::pivots::{swing_points, SwingPoint};
use super::{DetectedPattern, PatternConfig};
use crate::stats;

/// 한 종목의 분석 결과.
#[derive(Debug, Clone, Serialize)]
pub struct PatternReport {
    pub symbol: String,
    /// 분석 구간의 마지막 봉 날짜
    pub as_of: Option<NaiveDate>,
    pub pivot_points: Option<PivotPoints>,
    pub fibonacci: Option<FibonacciLevels>,
    pub swings: Vec<SwingPoint>,
    /// 최소 신뢰도 이상, 신뢰도 내림차순
    pub patterns: Vec<DetectedPattern>,
    #[serde(skip)]
    dates: Vec<NaiveDate>,
}

impl PatternReport {
    /// 저장용 감지 결과로 변환합니다. 봉 인덱스는 날짜로 바뀝니다.
    pub fn to_detections(&self, timeframe: Timeframe) -> Vec<PatternDetection> {
        let Some(detected_on) = self.as_of else {
            return Vec::new();
        };

        self.patterns
            .iter()
            .filter_map(|pattern| {
                let start_date = *self.dates.get(pattern.start_index)?;
                let end_date = *self.dates.get(pattern.end_index)?;

                let points: Vec<Value> = pattern
                    .points
                    .iter()
                    .filter_map(|kp| {
                        let date = self.dates.get(kp.point.index)?;
                        Some(json!({
                            "label": kp.label,
                            "date": date,
                            "price": kp.point.price,
                        }))
                    })
                    .collect();

                let mut details = match &pattern.details {
                    Value::Object(map) => map.clone(),
                    _ => Map::new(),
                };
                details.insert("points".to_string(), Value::Array(points));

                Some(PatternDetection {
                    symbol: self.symbol.clone(),
                    timeframe,
                    detected_on,
                    pattern_type: pattern.name(),
                    direction: pattern.direction,
                    confidence: pattern.confidence,
                    start_date,
                    end_date,
                    price_target: pattern.price_target.filter(|t| t.is_finite()),
                    details: Value::Object(details),
                })
            })
            .collect()
    }
}

/// 패턴 인식기.
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    config: PatternConfig,
}

impl PatternRecognizer {
    /// 새 패턴 인식기를 생성합니다.
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    /// 기본 설정으로 패턴 인식기를 생성합니다.
    pub fn with_defaults() -> Self {
        Self::new(PatternConfig::default())
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// 바(날짜 오름차순)에서 레벨과 패턴을 계산합니다.
    pub fn analyze(&self, bars: &[PriceBar]) -> PatternReport {
        let symbol = bars.first().map(|b| b.symbol.clone()).unwrap_or_default();
        let series = PriceSeries::from_bars(bars);
        self.analyze_series(symbol, &series)
    }

    /// 이미 변환된 시계열로 분석합니다.
    pub fn analyze_series(&self, symbol: String, series: &PriceSeries) -> PatternReport {
        let n = series.len();
        let as_of = series.dates.last().copied();

        let pivot_points = (n > 0)
            .then(|| PivotPoints::from_bar(series.high[n - 1], series.low[n - 1], series.close[n - 1]))
            .flatten();
        let fibonacci = FibonacciLevels::from_range(&series.high, &series.low, self.config.fib_lookback);

        // 돌출도는 평균 종가 대비 비율로 설정
        let min_prominence = stats::mean(&series.close)
            .map(|avg| avg * self.config.min_prominence)
            .unwrap_or(0.0);
        let swings = swing_points(&series.high, &series.low, self.config.order, min_prominence);

        let mut patterns = self.detect(&swings);
        patterns.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then(a.start_index.cmp(&b.start_index))
        });

        tracing::debug!(
            symbol = %symbol,
            bars = n,
            swings = swings.len(),
            patterns = patterns.len(),
            "패턴 분석 완료"
        );

        PatternReport {
            symbol,
            as_of,
            pivot_points,
            fibonacci,
            swings,
            patterns,
            dates: series.dates.clone(),
        }
    }

    /// 스윙 포인트에 모든 감지기를 적용하고 최소 신뢰도로 거릅니다.
    pub fn detect(&self, swings: &[SwingPoint]) -> Vec<DetectedPattern> {
        let mut patterns = Vec::new();

        patterns.extend(head_and_shoulders(swings, &self.config));
        patterns.extend(double_tops_bottoms(swings, &self.config));
        patterns.extend(triangle(swings, &self.config));
        patterns.extend(harmonic_patterns(swings));

        patterns
            .into_iter()
            .filter(|p| p.confidence >= self.config.min_confidence)
            .collect()
    }
}

impl Default for PatternRecognizer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternKind;
    use chrono::Duration;
    use loader_core::PatternDirection;
    use rust_decimal::Decimal;

    /// 꼭짓점 사이를 직선으로 잇는 종가 시계열. 고가/저가는 종가 ±0.2.
    fn bars_through(vertices: &[(usize, f64)]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut closes = Vec::new();
        for pair in vertices.windows(2) {
            let ((i0, p0), (i1, p1)) = (pair[0], pair[1]);
            for i in i0..i1 {
                let t = (i - i0) as f64 / (i1 - i0) as f64;
                closes.push(p0 + (p1 - p0) * t);
            }
        }
        if let Some(&(_, last)) = vertices.last() {
            closes.push(last);
        }

        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let d = |v: f64| Decimal::from_f64_retain(v).unwrap().round_dp(4);
                PriceBar::new(
                    "SYN",
                    Timeframe::D1,
                    start + Duration::days(i as i64),
                    d(c),
                    d(c + 0.2),
                    d(c - 0.2),
                    d(c),
                    1_000,
                )
            })
            .collect()
    }

    #[test]
    fn test_detects_head_and_shoulders_in_series() {
        let bars = bars_through(&[
            (0, 100.0),
            (10, 110.0),
            (20, 100.0),
            (30, 120.0),
            (40, 100.0),
            (50, 110.5),
            (60, 95.0),
        ]);
        let report = PatternRecognizer::with_defaults().analyze(&bars);

        assert_eq!(report.symbol, "SYN");
        assert_eq!(report.as_of, Some(bars[60].date));
        let hs = report
            .patterns
            .iter()
            .find(|p| p.kind == PatternKind::HeadAndShoulders)
            .expect("head and shoulders");
        assert_eq!(hs.direction, PatternDirection::Bearish);
        assert_eq!(hs.start_index, 10);
        assert_eq!(hs.end_index, 50);

        let detections = report.to_detections(Timeframe::D1);
        let stored = detections
            .iter()
            .find(|d| d.pattern_type == "head_and_shoulders")
            .unwrap();
        assert_eq!(stored.start_date, bars[10].date);
        assert_eq!(stored.detected_on, bars[60].date);
        assert_eq!(stored.details["points"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_flat_series_has_no_patterns() {
        let bars = bars_through(&[(0, 100.0), (80, 100.0)]);
        let report = PatternRecognizer::with_defaults().analyze(&bars);

        assert!(report.swings.is_empty());
        assert!(report.patterns.is_empty());
        assert!(report.to_detections(Timeframe::D1).is_empty());
        // 변동폭이 고가-저가뿐이라도 피벗 레벨은 계산됨
        assert!(report.pivot_points.is_some());
    }

    #[test]
    fn test_min_confidence_filters() {
        let bars = bars_through(&[
            (0, 100.0),
            (10, 110.0),
            (20, 100.0),
            (30, 120.0),
            (40, 100.0),
            (50, 110.5),
            (60, 95.0),
        ]);
        let strict = PatternRecognizer::new(PatternConfig {
            min_confidence: 1.01,
            ..PatternConfig::default()
        });
        assert!(strict.analyze(&bars).patterns.is_empty());
    }

    #[test]
    fn test_empty_bars() {
        let report = PatternRecognizer::with_defaults().analyze(&[]);
        assert!(report.as_of.is_none());
        assert!(report.pivot_points.is_none());
        assert!(report.fibonacci.is_none());
    }
}
