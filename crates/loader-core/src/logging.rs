//! tracing 기반 로깅 초기화.
//!
//! 배치 작업은 cron에서 실행되므로 운영 환경에서는 `json`,
//! 로컬 실행에서는 `pretty` 또는 `compact` 형식을 사용합니다.
//! 레벨은 `RUST_LOG` > `--log-level` > `logging.level` 순으로 결정됩니다.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;
use crate::error::{CoreError, CoreResult};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 사람이 읽기 쉬운 여러 줄 형식
    #[default]
    Pretty,
    /// 로그 수집기용 JSON 형식 (이벤트 필드를 최상위로 펼침)
    Json,
    /// 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 해석된 로깅 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 필터 지시문 (예: "info", "loader_data=debug")
    pub level: String,
    pub format: LogFormat,
    /// `#[instrument]` span 종료 시 소요 시간 출력
    pub span_timing: bool,
}

impl LogConfig {
    /// 설정 파일 값에 명령행 인자를 덮어씁니다.
    ///
    /// debug/trace 레벨에서는 저장소/제공자 호출의 span 소요 시간도 출력합니다.
    pub fn resolve(
        settings: &LoggingConfig,
        level: Option<&str>,
        format: Option<LogFormat>,
    ) -> CoreResult<Self> {
        let level = level.unwrap_or(&settings.level).trim().to_string();
        if level.is_empty() {
            return Err(CoreError::Config("빈 로그 레벨".to_string()));
        }
        let format = match format {
            Some(format) => format,
            None => settings.format.parse().map_err(CoreError::Config)?,
        };
        let lowered = level.to_lowercase();
        let span_timing = lowered.contains("debug") || lowered.contains("trace");

        Ok(Self {
            level,
            format,
            span_timing,
        })
    }
}

/// 전역 subscriber를 설치합니다. `RUST_LOG`가 있으면 `config.level`보다 우선합니다.
pub fn init_logging(config: &LogConfig) -> CoreResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| CoreError::Config(format!("로그 필터 '{}': {}", config.level, e)))?;

    let span_events = if config.span_timing {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let layer = fmt::layer().with_span_events(span_events);
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match config.format {
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Json => registry
            .with(layer.json().flatten_event(true).with_current_span(true))
            .try_init(),
        LogFormat::Compact => registry.with(layer.compact().with_target(false)).try_init(),
    };
    installed.map_err(|e| CoreError::Config(format!("로깅 초기화 실패: {}", e)))?;

    tracing::debug!(format = ?config.format, level = %config.level, "로깅 초기화 완료");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_resolve_uses_settings() {
        let config = LogConfig::resolve(&LoggingConfig::default(), None, None).unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(!config.span_timing);
    }

    #[test]
    fn test_resolve_cli_overrides() {
        let config = LogConfig::resolve(
            &LoggingConfig::default(),
            Some("loader_data=debug"),
            Some(LogFormat::Json),
        )
        .unwrap();
        assert_eq!(config.level, "loader_data=debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.span_timing);
    }

    #[test]
    fn test_resolve_rejects_bad_format() {
        let settings = LoggingConfig {
            format: "xml".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(
            LogConfig::resolve(&settings, None, None),
            Err(CoreError::Config(_))
        ));
    }
}
