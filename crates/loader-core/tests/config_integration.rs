//! 설정 파일 로드 통합 테스트.

use loader_core::{AppConfig, Timeframe};
use std::io::Write;

fn write_temp_config(name: &str, body: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("loader-core-{}-{}.toml", name, std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_partial_file_keeps_defaults() {
    let path = write_temp_config(
        "partial",
        r#"
[loader]
concurrency = 4
request_delay_ms = 1000

[scoring.weights]
quality = 0.5
"#,
    );

    let config = AppConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.loader.concurrency, 4);
    assert_eq!(config.loader.request_delay_ms, 1000);
    assert_eq!(config.loader.batch_size, 500);
    assert_eq!(config.scoring.weights.quality, 0.5);
    assert_eq!(config.scoring.weights.growth, 0.20);
    assert_eq!(config.scoring.min_sector_size, 5);
}

#[test]
fn test_missing_file_uses_defaults() {
    let config = AppConfig::load("/nonexistent/loader-config.toml").unwrap();
    assert_eq!(config.daemon.interval_minutes, 1440);
    assert_eq!(config.patterns.pivot_order, 5);
}

#[test]
fn test_timeframe_tables_cover_all() {
    let suffixes: Vec<&str> = Timeframe::ALL.iter().map(|t| t.table_suffix()).collect();
    assert_eq!(suffixes, vec!["daily", "weekly", "monthly"]);
}
