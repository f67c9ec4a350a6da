//! 팩터 지표 행.
//!
//! 여섯 개 지표 테이블(`growth_metrics` 등)은 모두 `(symbol, date)` 키와
//! `DOUBLE PRECISION` 컬럼들로 구성됩니다. [`MetricRow`]는 컬럼 목록과 값을
//! 같은 순서로 노출하여 저장소와 스코어링이 테이블별 코드를 중복하지 않게 합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 지표 종류 (= 팩터).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Growth,
    Quality,
    Value,
    Momentum,
    Stability,
    Positioning,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Growth,
        MetricKind::Quality,
        MetricKind::Value,
        MetricKind::Momentum,
        MetricKind::Stability,
        MetricKind::Positioning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Growth => "growth",
            MetricKind::Quality => "quality",
            MetricKind::Value => "value",
            MetricKind::Momentum => "momentum",
            MetricKind::Stability => "stability",
            MetricKind::Positioning => "positioning",
        }
    }

    /// 저장 테이블 이름.
    pub fn table_name(&self) -> &'static str {
        match self {
            MetricKind::Growth => "growth_metrics",
            MetricKind::Quality => "quality_metrics",
            MetricKind::Value => "value_metrics",
            MetricKind::Momentum => "momentum_metrics",
            MetricKind::Stability => "stability_metrics",
            MetricKind::Positioning => "positioning_metrics",
        }
    }

    /// 해당 테이블의 지표 컬럼 목록.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            MetricKind::Growth => GrowthMetrics::COLUMNS,
            MetricKind::Quality => QualityMetrics::COLUMNS,
            MetricKind::Value => ValueMetrics::COLUMNS,
            MetricKind::Momentum => MomentumMetrics::COLUMNS,
            MetricKind::Stability => StabilityMetrics::COLUMNS,
            MetricKind::Positioning => PositioningMetrics::COLUMNS,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "growth" => Ok(MetricKind::Growth),
            "quality" => Ok(MetricKind::Quality),
            "value" => Ok(MetricKind::Value),
            "momentum" => Ok(MetricKind::Momentum),
            "stability" => Ok(MetricKind::Stability),
            "positioning" => Ok(MetricKind::Positioning),
            _ => Err(format!("Unknown metric kind: {}", s)),
        }
    }
}

/// `(symbol, date)` 키와 f64 컬럼으로 구성된 지표 행.
pub trait MetricRow: Sized + Send + Sync {
    const KIND: MetricKind;
    /// 지표 컬럼 이름 (키 제외, 테이블 정의 순서)
    const COLUMNS: &'static [&'static str];

    fn symbol(&self) -> &str;
    fn date(&self) -> NaiveDate;
    /// `COLUMNS`와 같은 순서의 값 목록.
    fn values(&self) -> Vec<Option<f64>>;
    /// `COLUMNS` 순서의 값으로 행을 생성합니다. 부족한 값은 `None`입니다.
    fn from_values(symbol: String, date: NaiveDate, values: &[Option<f64>]) -> Self;

    /// 컬럼 이름으로 값을 조회합니다.
    fn get(&self, column: &str) -> Option<f64> {
        Self::COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.values().get(i).copied().flatten())
            .filter(|v| v.is_finite())
    }

    /// 계산된 값이 하나라도 있는지 확인합니다.
    fn has_values(&self) -> bool {
        self.values().iter().any(|v| v.map(f64::is_finite).unwrap_or(false))
    }
}

macro_rules! metric_row {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:expr, { $($(#[$fmeta:meta])* $field:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub symbol: String,
            pub date: NaiveDate,
            $($(#[$fmeta])* pub $field: Option<f64>,)+
        }

        impl $name {
            pub fn new(symbol: impl Into<String>, date: NaiveDate) -> Self {
                Self {
                    symbol: symbol.into(),
                    date,
                    ..Default::default()
                }
            }
        }

        impl MetricRow for $name {
            const KIND: MetricKind = $kind;
            const COLUMNS: &'static [&'static str] = &[$(stringify!($field)),+];

            fn symbol(&self) -> &str {
                &self.symbol
            }

            fn date(&self) -> NaiveDate {
                self.date
            }

            fn values(&self) -> Vec<Option<f64>> {
                vec![$(self.$field),+]
            }

            fn from_values(symbol: String, date: NaiveDate, values: &[Option<f64>]) -> Self {
                let mut iter = values.iter().copied();
                Self {
                    symbol,
                    date,
                    $($field: iter.next().flatten(),)+
                }
            }
        }
    };
}

metric_row!(
    /// 성장성 지표 (연간 재무제표 기반, 비율).
    GrowthMetrics, MetricKind::Growth, {
        revenue_growth_yoy,
        net_income_growth_yoy,
        eps_growth_yoy,
        operating_income_growth_yoy,
        fcf_growth_yoy,
        /// 3년 매출 CAGR
        revenue_cagr_3y,
        /// 3년 EPS CAGR
        eps_cagr_3y,
    }
);

metric_row!(
    /// 수익성/재무 건전성 지표.
    QualityMetrics, MetricKind::Quality, {
        roe,
        roa,
        gross_margin,
        operating_margin,
        net_margin,
        debt_to_equity,
        current_ratio,
        /// (순이익 - 영업현금흐름) / 총자산
        accruals_ratio,
        fcf_margin,
    }
);

metric_row!(
    /// 밸류에이션 지표.
    ValueMetrics, MetricKind::Value, {
        pe_ratio,
        forward_pe,
        pb_ratio,
        ps_ratio,
        ev_to_ebitda,
        fcf_yield,
        earnings_yield,
        dividend_yield,
    }
);

metric_row!(
    /// 가격 모멘텀 지표 (일봉 기반).
    MomentumMetrics, MetricKind::Momentum, {
        return_1m,
        return_3m,
        return_6m,
        return_12m,
        /// 12개월 수익률에서 최근 1개월을 제외한 값
        momentum_12_1,
        /// 52주 고가 대비 괴리율 (0 이하)
        pct_from_52w_high,
        price_vs_sma50,
        price_vs_sma200,
        rsi_14,
    }
);

metric_row!(
    /// 변동성/안정성 지표.
    StabilityMetrics, MetricKind::Stability, {
        volatility_1y,
        beta,
        max_drawdown_1y,
        downside_deviation,
        /// 연간 순이익의 변동계수
        earnings_variability,
    }
);

metric_row!(
    /// 수급/보유 구조 지표.
    PositioningMetrics, MetricKind::Positioning, {
        institutional_ownership,
        insider_ownership,
        short_percent_float,
        short_ratio,
        /// 20일 평균 거래량 / 60일 평균 거래량
        relative_volume,
        /// 20일 OBV 기울기 (평균 거래량으로 정규화)
        obv_slope,
    }
);

/// 한 종목의 최신 지표 묶음 (스코어링 입력).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub symbol: String,
    pub sector: Option<String>,
    pub growth: Option<GrowthMetrics>,
    pub quality: Option<QualityMetrics>,
    pub value: Option<ValueMetrics>,
    pub momentum: Option<MomentumMetrics>,
    pub stability: Option<StabilityMetrics>,
    pub positioning: Option<PositioningMetrics>,
}

impl MetricsSnapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// 종류와 컬럼 이름으로 지표 값을 조회합니다. 유한하지 않은 값은 `None`입니다.
    pub fn metric(&self, kind: MetricKind, column: &str) -> Option<f64> {
        match kind {
            MetricKind::Growth => self.growth.as_ref()?.get(column),
            MetricKind::Quality => self.quality.as_ref()?.get(column),
            MetricKind::Value => self.value.as_ref()?.get(column),
            MetricKind::Momentum => self.momentum.as_ref()?.get(column),
            MetricKind::Stability => self.stability.as_ref()?.get(column),
            MetricKind::Positioning => self.positioning.as_ref()?.get(column),
        }
    }
}
