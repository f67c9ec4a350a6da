//! 시장 데이터 로더 CLI.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use loader_collector::modules::price_load::{PriceLoadOptions, PriceSource};
use loader_collector::modules::{self, checkpoint, metric_calc};
use loader_core::{init_logging, AppConfig, LogConfig, LogFormat, ScoreMethod, Timeframe};
use loader_data::Database;

#[derive(Parser)]
#[command(name = "market-loader")]
#[command(about = "Market data loaders, factor metrics and scoring", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, global = true, env = "LOADER_CONFIG", default_value = "config/default.toml")]
    config: PathBuf,

    /// 로그 레벨 (trace, debug, info, warn, error). 없으면 설정 파일 값
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true, env = "LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// 스키마 마이그레이션 적용
    Migrate,

    /// 종목 마스터 동기화 (Alpaca)
    SyncSymbols,

    /// 가격 바 증분 적재
    LoadPrices {
        /// daily, weekly, monthly
        #[arg(long, default_value = "daily")]
        timeframe: Timeframe,
        /// 특정 심볼만 적재 (쉼표로 구분, 예: "AAPL,MSFT")
        #[arg(long)]
        symbols: Option<String>,
        /// yahoo, alpaca
        #[arg(long, default_value = "yahoo")]
        source: PriceSource,
        /// 마지막 체크포인트부터 재개
        #[arg(long)]
        resume: bool,
    },

    /// 저장된 가격으로 기술적 지표 계산
    LoadTechnicals {
        #[arg(long, default_value = "daily")]
        timeframe: Timeframe,
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        resume: bool,
    },

    /// 재무제표와 핵심 지표 적재 (Yahoo Finance)
    LoadFundamentals {
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        resume: bool,
    },

    /// 암호화폐 시장 데이터 적재 (CoinGecko)
    LoadCrypto,

    /// 거시경제 시리즈 적재 (FRED)
    LoadEconomic {
        /// 시리즈 ID (쉼표로 구분, 없으면 설정 값)
        #[arg(long)]
        series: Option<String>,
    },

    /// 팩터 지표 계산
    CalcMetrics {
        /// growth, quality, value, momentum, stability, positioning, all (쉼표로 여러 개)
        #[arg(long, default_value = "all")]
        kind: String,
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        resume: bool,
    },

    /// 종합 점수 계산
    CalcScores {
        /// zscore, sector
        #[arg(long, default_value = "zscore")]
        method: ScoreMethod,
    },

    /// 차트 패턴 감지
    DetectPatterns {
        #[arg(long, default_value = "daily")]
        timeframe: Timeframe,
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        resume: bool,
    },

    /// 전체 워크플로우 실행
    RunAll,

    /// 데몬 모드: 주기적으로 전체 워크플로우 실행
    Daemon,

    /// 체크포인트 관리
    Checkpoints {
        #[command(subcommand)]
        action: CheckpointAction,
    },
}

#[derive(Subcommand)]
enum CheckpointAction {
    /// 모든 체크포인트 조회
    List,
    /// 워크플로우 체크포인트 삭제
    Clear {
        /// 워크플로우 이름 (예: load_prices_daily)
        workflow: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config.display()))?;

    let log_config = LogConfig::resolve(&config.logging, cli.log_level.as_deref(), cli.log_format)?;
    init_logging(&log_config)?;

    tracing::info!("Market Loader 시작");

    let db = Database::connect(&config.database).await?;
    let pool = db.pool().clone();
    let status = db.status();
    tracing::debug!(pool_size = status.size, idle = status.idle, "연결 풀 준비");

    let is_daemon = matches!(cli.command, Commands::Daemon);
    let outcome = tokio::select! {
        result = execute(cli.command, &db, &config) => result,
        _ = tokio::signal::ctrl_c(), if !is_daemon => {
            let marked = checkpoint::mark_interrupted(&pool).await?;
            tracing::info!(checkpoints = marked, "종료 신호 수신, 체크포인트 보존");
            Ok(())
        }
    };

    db.close().await;
    tracing::info!("Market Loader 종료");
    outcome
}

async fn execute(command: Commands, db: &Database, config: &AppConfig) -> anyhow::Result<()> {
    let pool = db.pool();

    match command {
        Commands::Migrate => {
            db.migrate().await?;
        }
        Commands::SyncSymbols => {
            modules::sync_symbols(pool, config)
                .await?
                .log_summary("심볼 동기화");
        }
        Commands::LoadPrices {
            timeframe,
            symbols,
            source,
            resume,
        } => {
            let options = PriceLoadOptions {
                timeframe,
                symbols,
                source,
                resume,
            };
            modules::load_prices(pool, config, &options)
                .await?
                .log_summary("가격 적재");
        }
        Commands::LoadTechnicals {
            timeframe,
            symbols,
            resume,
        } => {
            modules::load_technicals(pool, config, timeframe, symbols.as_deref(), resume)
                .await?
                .log_summary("기술적 지표");
        }
        Commands::LoadFundamentals { symbols, resume } => {
            modules::load_fundamentals(pool, config, symbols.as_deref(), resume)
                .await?
                .log_summary("재무 데이터");
        }
        Commands::LoadCrypto => {
            modules::load_crypto(pool, config)
                .await?
                .log_summary("암호화폐");
        }
        Commands::LoadEconomic { series } => {
            modules::load_economic(pool, config, series.as_deref())
                .await?
                .log_summary("거시경제");
        }
        Commands::CalcMetrics {
            kind,
            symbols,
            resume,
        } => {
            let kinds = metric_calc::parse_kinds(&kind)?;
            modules::calc_metrics(pool, config, &kinds, symbols.as_deref(), resume)
                .await?
                .log_summary("팩터 지표");
        }
        Commands::CalcScores { method } => {
            modules::calc_scores(pool, config, method)
                .await?
                .log_summary("종합 점수");
        }
        Commands::DetectPatterns {
            timeframe,
            symbols,
            resume,
        } => {
            modules::detect_patterns(pool, config, timeframe, symbols.as_deref(), resume)
                .await?
                .log_summary("패턴 감지");
        }
        Commands::RunAll => {
            let report = modules::run_all(pool, config).await;
            if !report.is_success() {
                bail!("{}개 단계 실패: {}", report.failed.len(), report.failed.join(", "));
            }
        }
        Commands::Daemon => {
            modules::run_daemon(pool, config).await?;
        }
        Commands::Checkpoints { action } => match action {
            CheckpointAction::List => {
                let checkpoints = checkpoint::list_checkpoints(pool).await?;
                if checkpoints.is_empty() {
                    println!("저장된 체크포인트가 없습니다");
                }
                for cp in checkpoints {
                    println!(
                        "{:<28} {:<12} {:>7}  {:<10} {}",
                        cp.workflow_name,
                        cp.status,
                        cp.total_processed,
                        cp.last_ticker.as_deref().unwrap_or("-"),
                        cp.last_processed_at
                            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    );
                }
            }
            CheckpointAction::Clear { workflow } => {
                let removed = checkpoint::clear_checkpoint(pool, &workflow).await?;
                tracing::info!(workflow = %workflow, removed = removed, "체크포인트 삭제");
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_load_prices() {
        let cli = Cli::try_parse_from([
            "market-loader",
            "load-prices",
            "--timeframe",
            "weekly",
            "--symbols",
            "AAPL,MSFT",
            "--source",
            "alpaca",
            "--resume",
        ])
        .unwrap();

        match cli.command {
            Commands::LoadPrices {
                timeframe,
                symbols,
                source,
                resume,
            } => {
                assert_eq!(timeframe, Timeframe::W1);
                assert_eq!(symbols.as_deref(), Some("AAPL,MSFT"));
                assert_eq!(source, PriceSource::Alpaca);
                assert!(resume);
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["market-loader", "calc-scores"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::CalcScores {
                method: ScoreMethod::ZScore
            }
        ));
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from(["market-loader", "run-all", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_timeframe_rejected() {
        assert!(Cli::try_parse_from(["market-loader", "load-prices", "--timeframe", "hourly"]).is_err());
    }

    #[test]
    fn test_checkpoint_clear() {
        let cli =
            Cli::try_parse_from(["market-loader", "checkpoints", "clear", "load_prices_daily"]).unwrap();
        match cli.command {
            Commands::Checkpoints {
                action: CheckpointAction::Clear { workflow },
            } => assert_eq!(workflow, "load_prices_daily"),
            _ => panic!("unexpected command"),
        }
    }
}
