//! FRED (Federal Reserve Economic Data) 클라이언트.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument};

use loader_core::{EconomicSeries, MacroObservation};

use super::{build_http_client, ensure_success};
use crate::error::{DataError, Result};

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    seriess: Vec<RawSeries>,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    id: String,
    title: String,
    #[serde(default)]
    frequency: Option<String>,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    seasonal_adjustment: Option<String>,
}

/// FRED 클라이언트.
pub struct FredClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FredClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DataError::ConfigError("FRED_API_KEY not set".into()));
        }
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// `FRED_API_KEY` 환경 변수로 클라이언트를 생성합니다.
    pub fn from_env(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| DataError::ConfigError("FRED_API_KEY not set".into()))?;
        Self::new(base_url, api_key, timeout)
    }

    /// 시리즈 메타데이터.
    #[instrument(skip(self))]
    pub async fn series_info(&self, series_id: &str) -> Result<EconomicSeries> {
        let url = format!("{}/fred/series", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ])
            .send()
            .await?;
        let body: SeriesResponse = ensure_success(response, &format!("FRED series {}", series_id))?
            .json()
            .await?;

        body.seriess
            .into_iter()
            .next()
            .map(|s| EconomicSeries {
                series_id: s.id,
                title: s.title,
                frequency: s.frequency,
                units: s.units,
                seasonal_adjustment: s.seasonal_adjustment,
            })
            .ok_or_else(|| DataError::NotFound(format!("FRED series {}", series_id)))
    }

    /// `start` 이후(포함)의 관측치.
    #[instrument(skip(self))]
    pub async fn observations(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
    ) -> Result<Vec<MacroObservation>> {
        let url = format!("{}/fred/series/observations", self.base_url);
        let mut query = vec![
            ("series_id", series_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
        ];
        if let Some(start) = start {
            query.push(("observation_start", start.format("%Y-%m-%d").to_string()));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        let body: ObservationsResponse =
            ensure_success(response, &format!("FRED observations {}", series_id))?
                .json()
                .await?;

        let observations = parse_observations(series_id, body.observations)?;
        debug!(series_id = series_id, count = observations.len(), "FRED 관측치 조회 완료");
        Ok(observations)
    }
}

/// FRED는 결측값을 "."으로 보고합니다.
fn parse_observations(series_id: &str, raw: Vec<RawObservation>) -> Result<Vec<MacroObservation>> {
    raw.into_iter()
        .map(|o| {
            let date = NaiveDate::parse_from_str(&o.date, "%Y-%m-%d")
                .map_err(|e| DataError::ParseError(format!("FRED 날짜 '{}': {}", o.date, e)))?;
            let value = match o.value.trim() {
                "." | "" => None,
                v => Some(
                    v.parse::<f64>()
                        .map_err(|e| DataError::ParseError(format!("FRED 값 '{}': {}", v, e)))?,
                ),
            };
            Ok(MacroObservation {
                series_id: series_id.to_string(),
                date,
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_marker() {
        let raw = vec![
            RawObservation {
                date: "2024-01-01".into(),
                value: "3.7".into(),
            },
            RawObservation {
                date: "2024-01-02".into(),
                value: ".".into(),
            },
        ];
        let parsed = parse_observations("UNRATE", raw).unwrap();
        assert_eq!(parsed[0].value, Some(3.7));
        assert_eq!(parsed[1].value, None);
    }

    #[test]
    fn test_bad_value_is_parse_error() {
        let raw = vec![RawObservation {
            date: "2024-01-01".into(),
            value: "n/a".into(),
        }];
        assert!(matches!(
            parse_observations("X", raw),
            Err(DataError::ParseError(_))
        ));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            FredClient::new("http://localhost", " ", Duration::from_secs(1)),
            Err(DataError::ConfigError(_))
        ));
    }
}
