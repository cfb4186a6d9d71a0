//! DCA 분석 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # BTC 단일 페어, 최근 365일, 하루 $10
//! dca analyze --last-days 365 --daily-investment 10
//!
//! # BTC 60% / ETH 40%, 주 단위 매수
//! dca analyze --pairs BTC/USDT:60 ETH/USDT:40 --buy-period 1w --start-date 2022-01-01
//!
//! # 가격 데이터 다운로드 후 오프라인 분석
//! dca download --pair BTC/USDT --from 2022-01-01 --to 2024-12-31
//! dca analyze --data-dir data --start-date 2022-01-01 --end-date 2024-12-31
//!
//! # 지원 거래소 목록
//! dca exchanges
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use dca_core::{init_logging, AppConfig, DcaError, LogConfig, ProviderError, Symbol};
use dca_exchange::{resolve_exchange, FallbackPolicy};
use rust_decimal::Decimal;
use tracing::{error, info};

use dca_cli::commands::analyze::{parse_date, run_analyze, AnalyzeArgs, AnalyzeConfig};
use dca_cli::commands::download::{download_data, DownloadConfig};
use dca_cli::commands::exchanges::print_exchanges;
use dca_cli::export::PlotType;

#[derive(Parser)]
#[command(name = "dca")]
#[command(about = "DCA Analyzer - 적립식 투자 전략 과거 성과 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (기본: config/default.toml, 없으면 무시)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 상세도 (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 포트폴리오 DCA 분석
    Analyze {
        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD, 기본: 오늘)
        #[arg(long)]
        end_date: Option<String>,

        /// 종료일 기준 최근 N일 분석 (--start-date가 없을 때)
        #[arg(long)]
        last_days: Option<u64>,

        /// 일일 총 투자금 (USD)
        #[arg(long)]
        daily_investment: Option<Decimal>,

        /// 거래소 ID (binance, binanceus)
        #[arg(long)]
        exchange: Option<String>,

        /// 페어별 배분 (예: BTC/USDT:60 ETH/USDT:40)
        #[arg(long, num_args = 1..)]
        pairs: Vec<String>,

        /// 매수 주기 (1d, 1w, 2w, 1m)
        #[arg(long)]
        buy_period: Option<String>,

        /// 차트 데이터 종류
        #[arg(long, value_enum)]
        plot_type: Option<PlotType>,

        /// 결과 출력 디렉토리
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// 오프라인 CSV 가격 데이터 디렉토리 (<BASE>_<QUOTE>.csv)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// 과거 일봉 데이터 다운로드 (CSV)
    Download {
        /// 거래 페어 (예: BTC/USDT)
        #[arg(short, long)]
        pair: String,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short = 'f', long)]
        from: String,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(short, long)]
        to: String,

        /// 거래소 ID
        #[arg(short, long)]
        exchange: Option<String>,

        /// 출력 파일 경로 (기본: data/<BASE>_<QUOTE>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 지원 거래소 목록 보기
    Exchanges,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("\n❌ {:#}", e);
            if is_network_failure(&e) {
                eprintln!("   네트워크 연결을 확인하거나 --data-dir로 오프라인 데이터를 사용하세요.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = match &cli.config {
        Some(path) => AppConfig::load(path, true)
            .with_context(|| format!("설정 파일 로드 실패: {}", path.display()))?,
        None => AppConfig::load_default().context("기본 설정 로드 실패")?,
    };

    let log_config = LogConfig::from(&app.logging)
        .with_env_overrides()
        .with_verbosity(cli.verbose);
    init_logging(&log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    match cli.command {
        Commands::Analyze {
            start_date,
            end_date,
            last_days,
            daily_investment,
            exchange,
            pairs,
            buy_period,
            plot_type,
            output_dir,
            data_dir,
        } => {
            let args = AnalyzeArgs {
                start_date,
                end_date,
                last_days,
                daily_investment,
                exchange,
                pairs,
                buy_period,
                plot_type,
                output_dir,
                data_dir,
            };
            let config = AnalyzeConfig::resolve(args, &app, Utc::now().date_naive())?;
            info!(
                start = %config.start,
                end = %config.end,
                pairs = config.plan.len(),
                period = %config.buy_period,
                "Starting DCA analysis"
            );

            let analysis = run_analyze(config, &app).await?;
            println!(
                "\n✅ Analysis completed: {} pairs over {} days",
                analysis.pairs.len(),
                analysis.analysis_days()
            );
        }

        Commands::Download {
            pair,
            from,
            to,
            exchange,
            output,
        } => {
            let symbol: Symbol = pair.parse()?;
            let start_date = parse_date(&from)?;
            let end_date = parse_date(&to)?;

            if start_date > end_date {
                return Err(DcaError::Configuration(
                    "Start date must be before end date".to_string(),
                )
                .into());
            }

            let policy = FallbackPolicy::from_setting(app.exchange.fallback.as_deref())?;
            let exchange_id = resolve_exchange(
                exchange.as_deref().unwrap_or(&app.exchange.id),
                policy,
            )?;
            let output_path = output.unwrap_or_else(|| DownloadConfig::default_output(&symbol));

            info!("Output will be saved to: {}", output_path.display());

            let config = DownloadConfig {
                exchange: exchange_id,
                symbol,
                start_date,
                end_date,
                output_path: output_path.clone(),
            };

            let count = download_data(config, &app.exchange).await?;
            println!("\n데이터 다운로드 완료: {} 캔들", count);
            println!("저장 위치: {}", output_path.display());
        }

        Commands::Exchanges => print_exchanges(),
    }

    Ok(())
}

/// 네트워크 계열 실패인지 확인합니다.
fn is_network_failure(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ProviderError>(),
            Some(ProviderError::Network(_)) | Some(ProviderError::RateLimited(_))
        )
    })
}
