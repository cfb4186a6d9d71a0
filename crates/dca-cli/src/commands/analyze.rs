//! 적립식 투자(DCA) 분석 명령어.
//!
//! 가격 데이터 조회 → 페어별 시뮬레이션 → 포트폴리오 집계 → 리포트 출력 →
//! CSV/차트 데이터 내보내기 순서로 진행합니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use dca_analytics::{AggregationObserver, PairAnalysis, PortfolioAggregator, PortfolioAnalysis};
use dca_core::{
    AllocationPlan, AppConfig, BuyPeriod, DcaError, DecimalExt, PriceSeriesProvider, Symbol,
};
use dca_exchange::{resolve_exchange, BinanceSeriesProvider, CsvPriceProvider, FallbackPolicy};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::export::{save_chart_files, save_summary_csv, timestamp_token, PlotType};
use crate::report::{ConsoleReporter, Reporter, RunParameters};

/// 분석 설정.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_daily_investment: Decimal,
    pub buy_period: BuyPeriod,
    pub plan: AllocationPlan,
    /// 거래소 ID (`data_dir`가 있으면 무시)
    pub exchange: String,
    /// 오프라인 CSV 가격 데이터 디렉토리
    pub data_dir: Option<PathBuf>,
    pub plot_type: PlotType,
    pub output_dir: PathBuf,
}

/// 명령행에서 넘어온 값 (없으면 설정 파일 값 사용).
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub last_days: Option<u64>,
    pub daily_investment: Option<Decimal>,
    pub exchange: Option<String>,
    pub pairs: Vec<String>,
    pub buy_period: Option<String>,
    pub plot_type: Option<PlotType>,
    pub output_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl AnalyzeConfig {
    /// 명령행 값과 애플리케이션 설정을 합쳐 분석 설정을 만듭니다.
    pub fn resolve(args: AnalyzeArgs, app: &AppConfig, today: NaiveDate) -> Result<Self, DcaError> {
        let defaults = &app.analysis;

        let default_start = parse_date(&defaults.start_date)?;
        let start = args.start_date.as_deref().map(parse_date).transpose()?;
        let end = args.end_date.as_deref().map(parse_date).transpose()?;
        let (start, end) = resolve_dates(start, end, args.last_days, default_start, today)?;

        let total_daily_investment = args.daily_investment.unwrap_or(defaults.daily_investment);
        if total_daily_investment <= Decimal::ZERO {
            return Err(DcaError::Configuration(format!(
                "일일 투자금은 0보다 커야 합니다: {}",
                total_daily_investment
            )));
        }

        let buy_period: BuyPeriod = args
            .buy_period
            .as_deref()
            .unwrap_or(&defaults.buy_period)
            .parse()?;

        let plan = if args.pairs.is_empty() {
            AllocationPlan::parse(&defaults.pairs)?
        } else {
            AllocationPlan::parse(&args.pairs)?
        };
        plan.validate()?;

        let plot_type = match args.plot_type {
            Some(p) => p,
            None => defaults.plot_type.parse()?,
        };

        Ok(Self {
            start,
            end,
            total_daily_investment,
            buy_period,
            plan,
            exchange: args.exchange.unwrap_or_else(|| app.exchange.id.clone()),
            data_dir: args.data_dir,
            plot_type,
            output_dir: args
                .output_dir
                .unwrap_or_else(|| PathBuf::from(&defaults.output_dir)),
        })
    }
}

/// `YYYY-MM-DD` 날짜 파싱.
pub fn parse_date(s: &str) -> Result<NaiveDate, DcaError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        DcaError::Configuration(format!("Invalid date format: {}. Expected YYYY-MM-DD", s))
    })
}

/// 분석 기간을 결정합니다.
///
/// 종료일 기본값은 오늘입니다. 시작일은 명시값, `last_days`(종료일 기준 N일 전),
/// 설정 기본값 순으로 정합니다.
pub fn resolve_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    last_days: Option<u64>,
    default_start: NaiveDate,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), DcaError> {
    let end = end.unwrap_or(today);
    let start = match (start, last_days) {
        (Some(start), _) => start,
        (None, Some(days)) => end.checked_sub_days(Days::new(days)).ok_or_else(|| {
            DcaError::Configuration(format!("--last-days 값이 너무 큽니다: {}", days))
        })?,
        (None, None) => default_start,
    };

    if start > end {
        return Err(DcaError::Configuration(format!(
            "시작일({})이 종료일({})보다 늦습니다",
            start, end
        )));
    }
    Ok((start, end))
}

/// 설정에 맞는 가격 데이터 제공자를 만듭니다.
pub fn build_provider(
    config: &AnalyzeConfig,
    app: &AppConfig,
) -> Result<(Arc<dyn PriceSeriesProvider>, String)> {
    if let Some(dir) = &config.data_dir {
        info!(dir = %dir.display(), "Using offline CSV price data");
        return Ok((
            Arc::new(CsvPriceProvider::new(dir.clone())),
            format!("CSV ({})", dir.display()),
        ));
    }

    let policy = FallbackPolicy::from_setting(app.exchange.fallback.as_deref())
        .context("잘못된 대체 거래소 설정")?;
    let exchange = resolve_exchange(&config.exchange, policy)?;
    let provider = BinanceSeriesProvider::from_settings(exchange, &app.exchange)
        .with_context(|| format!("{} 클라이언트 생성 실패", exchange.display_name()))?;

    Ok((Arc::new(provider), exchange.display_name().to_string()))
}

/// 페어별 진행 상황을 진행률 표시줄로 보여줍니다.
pub struct ProgressObserver {
    pb: ProgressBar,
}

impl ProgressObserver {
    pub fn new(total: usize) -> Self {
        let pb = ProgressBar::new(total as u64);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(e) => warn!(error = %e, "Invalid progress template"),
        }
        Self { pb }
    }

    /// 진행률 표시줄을 지웁니다.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl AggregationObserver for ProgressObserver {
    fn on_pair_started(&self, _index: usize, _total: usize, symbol: &Symbol) {
        self.pb.set_message(format!("Fetching {}...", symbol));
    }

    fn on_pair_completed(&self, _index: usize, _total: usize, analysis: &PairAnalysis) {
        self.pb.inc(1);
        self.pb.println(format!(
            "✓ {} ({} days, {})",
            analysis.symbol,
            analysis.result.states.len(),
            analysis.result.return_pct().to_signed_pct_string()
        ));
    }
}

/// 분석을 실행하고 결과를 출력/저장합니다.
pub async fn run_analyze(config: AnalyzeConfig, app: &AppConfig) -> Result<PortfolioAnalysis> {
    let (provider, source) = build_provider(&config, app)?;
    let mut reporter = ConsoleReporter::stdout();

    reporter.parameters(&RunParameters {
        source,
        start: config.start,
        end: config.end,
        total_daily_investment: config.total_daily_investment,
        buy_period: config.buy_period,
        plan: config.plan.clone(),
    })?;

    let analysis = analyze_with_provider(&config, provider).await?;

    for pair in &analysis.pairs {
        reporter.pair_summary(pair)?;
    }
    reporter.portfolio_summary(&analysis)?;

    let exported = export_results(&config.output_dir, &analysis, config.plot_type)?;
    reporter.exported(&exported)?;

    Ok(analysis)
}

/// 주어진 제공자로 포트폴리오를 집계합니다.
pub async fn analyze_with_provider(
    config: &AnalyzeConfig,
    provider: Arc<dyn PriceSeriesProvider>,
) -> Result<PortfolioAnalysis> {
    let progress = Arc::new(ProgressObserver::new(config.plan.len()));
    let aggregator = PortfolioAggregator::new(provider).with_observer(progress.clone());

    let result = aggregator
        .aggregate(
            &config.plan,
            config.total_daily_investment,
            config.start,
            config.end,
            config.buy_period.days(),
        )
        .await;
    progress.finish();

    let analysis = result.context("포트폴리오 분석 실패")?;
    info!(
        pairs = analysis.pairs.len(),
        days = analysis.analysis_days(),
        profitable = analysis.is_profitable(),
        "Analysis completed"
    );
    Ok(analysis)
}

/// 요약 CSV와 차트 데이터 파일을 저장합니다.
pub fn export_results(
    output_dir: &Path,
    analysis: &PortfolioAnalysis,
    plot_type: PlotType,
) -> Result<Vec<PathBuf>> {
    let timestamp = timestamp_token(Utc::now());
    let mut paths = vec![save_summary_csv(output_dir, &timestamp, analysis)
        .with_context(|| format!("CSV 저장 실패: {}", output_dir.display()))?];
    paths.extend(
        save_chart_files(output_dir, &timestamp, analysis, plot_type)
            .with_context(|| format!("차트 데이터 저장 실패: {}", output_dir.display()))?,
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15").unwrap(), date(2024, 1, 15));
        assert_eq!(parse_date(" 2024-01-15 ").unwrap(), date(2024, 1, 15));
        assert!(matches!(
            parse_date("15/01/2024"),
            Err(DcaError::Configuration(_))
        ));
    }

    #[test]
    fn test_resolve_dates_defaults() {
        let today = date(2024, 6, 30);
        let (start, end) = resolve_dates(None, None, None, date(2020, 1, 1), today).unwrap();
        assert_eq!(start, date(2020, 1, 1));
        assert_eq!(end, today);
    }

    #[test]
    fn test_resolve_dates_last_days() {
        let (start, end) =
            resolve_dates(None, Some(date(2024, 3, 1)), Some(30), date(2020, 1, 1), date(2024, 6, 30))
                .unwrap();
        assert_eq!(start, date(2024, 1, 31));
        assert_eq!(end, date(2024, 3, 1));
    }

    #[test]
    fn test_explicit_start_wins_over_last_days() {
        let (start, _) = resolve_dates(
            Some(date(2023, 1, 1)),
            None,
            Some(7),
            date(2020, 1, 1),
            date(2024, 6, 30),
        )
        .unwrap();
        assert_eq!(start, date(2023, 1, 1));
    }

    #[test]
    fn test_start_after_end_rejected() {
        let err = resolve_dates(
            Some(date(2024, 2, 1)),
            Some(date(2024, 1, 1)),
            None,
            date(2020, 1, 1),
            date(2024, 6, 30),
        )
        .unwrap_err();
        assert!(err.is_preflight());
    }

    #[test]
    fn test_resolve_config_from_args() {
        let app = AppConfig::default();
        let args = AnalyzeArgs {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
            daily_investment: Some(dec!(20)),
            pairs: vec!["BTC/USDT:60".into(), "ETH/USDT:40".into()],
            buy_period: Some("1w".into()),
            ..Default::default()
        };

        let config = AnalyzeConfig::resolve(args, &app, date(2024, 6, 30)).unwrap();
        assert_eq!(config.plan.len(), 2);
        assert_eq!(config.buy_period.days(), 7);
        assert_eq!(config.total_daily_investment, dec!(20));
        assert_eq!(config.exchange, "binance");
        assert_eq!(config.plot_type, PlotType::Both);
        assert_eq!(config.output_dir, PathBuf::from("dca"));
    }

    #[test]
    fn test_resolve_config_rejects_bad_input() {
        let app = AppConfig::default();
        let today = date(2024, 6, 30);

        let bad_period = AnalyzeArgs {
            buy_period: Some("3x".into()),
            ..Default::default()
        };
        assert!(AnalyzeConfig::resolve(bad_period, &app, today).is_err());

        let bad_alloc = AnalyzeArgs {
            pairs: vec!["BTC/USDT:50".into()],
            ..Default::default()
        };
        assert!(matches!(
            AnalyzeConfig::resolve(bad_alloc, &app, today),
            Err(DcaError::Allocation { .. })
        ));

        let zero_daily = AnalyzeArgs {
            daily_investment: Some(Decimal::ZERO),
            ..Default::default()
        };
        assert!(AnalyzeConfig::resolve(zero_daily, &app, today).is_err());
    }
}
