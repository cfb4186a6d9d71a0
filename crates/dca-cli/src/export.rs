//! 분석 결과 파일 내보내기.
//!
//! - 요약 CSV (`dca_analysis_<timestamp>.csv`)
//! - 차트 데이터 JSON (페어별 `dca_<token>_<timestamp>.json`, 전체 `dca_portfolio_<timestamp>.json`)

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use dca_analytics::{PairCharts, PortfolioAnalysis, PortfolioCharts};
use dca_core::{DcaError, DecimalExt};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// 내보낼 차트 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PlotType {
    /// 페어별 차트만
    All,
    /// 포트폴리오 전체 차트만
    Total,
    /// 둘 다
    #[default]
    Both,
}

impl PlotType {
    pub fn wants_pairs(&self) -> bool {
        matches!(self, PlotType::All | PlotType::Both)
    }

    pub fn wants_portfolio(&self) -> bool {
        matches!(self, PlotType::Total | PlotType::Both)
    }
}

impl FromStr for PlotType {
    type Err = DcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(PlotType::All),
            "total" => Ok(PlotType::Total),
            "both" => Ok(PlotType::Both),
            other => Err(DcaError::Configuration(format!(
                "알 수 없는 차트 종류: {} (all, total, both 중 하나)",
                other
            ))),
        }
    }
}

/// 파일 이름용 타임스탬프 (`YYYYmmdd_HHMMSS`).
pub fn timestamp_token(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// 요약 CSV 헤더.
pub const SUMMARY_HEADER: &str = "Pair,Total Invested,Current Value,Net Profit/Loss,Return";

/// 페어별 요약과 TOTAL 행을 CSV로 기록합니다.
pub fn write_summary_csv<W: Write>(writer: &mut W, analysis: &PortfolioAnalysis) -> io::Result<()> {
    writeln!(writer, "{}", SUMMARY_HEADER)?;
    for pair in &analysis.pairs {
        let r = &pair.result;
        writeln!(
            writer,
            "{},{:.2},{:.2},{:.2},{:.2}%",
            pair.symbol,
            r.total_invested.round_money(),
            r.final_value.round_money(),
            r.net_pnl().round_money(),
            r.return_pct().round_money()
        )?;
    }

    let totals = &analysis.totals;
    let total_return = if totals.total_invested > Decimal::ZERO {
        totals.total_pnl_percent
    } else {
        Decimal::ZERO
    };
    writeln!(
        writer,
        "TOTAL,{:.2},{:.2},{:.2},{:.2}%",
        totals.total_invested.round_money(),
        totals.total_value.round_money(),
        totals.total_pnl.round_money(),
        total_return.round_money()
    )
}

/// 요약 CSV를 `dir`에 저장하고 경로를 돌려줍니다.
pub fn save_summary_csv(
    dir: &Path,
    timestamp: &str,
    analysis: &PortfolioAnalysis,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("dca_analysis_{}.csv", timestamp));
    let mut file = BufWriter::new(fs::File::create(&path)?);
    write_summary_csv(&mut file, analysis)?;
    file.flush()?;

    info!(path = %path.display(), "Summary CSV exported");
    Ok(path)
}

/// 차트 데이터 파일을 저장하고 생성된 경로 목록을 돌려줍니다.
pub fn save_chart_files(
    dir: &Path,
    timestamp: &str,
    analysis: &PortfolioAnalysis,
    plot_type: PlotType,
) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if plot_type.wants_pairs() {
        let tokens = chart_tokens(analysis);
        for (pair, token) in analysis.pairs.iter().zip(tokens) {
            let charts = PairCharts::from_result(pair.symbol.to_string(), &pair.result);
            let path = dir.join(format!("dca_{}_{}.json", token, timestamp));
            write_json(&path, &charts)?;
            written.push(path);
        }
    }

    if plot_type.wants_portfolio() {
        let charts = PortfolioCharts::from_analysis(analysis);
        let path = dir.join(format!("dca_portfolio_{}.json", timestamp));
        write_json(&path, &charts)?;
        written.push(path);
    }

    info!(count = written.len(), "Chart data exported");
    Ok(written)
}

/// 페어별 파일 이름 토큰. 기본은 소문자 기초 자산이며,
/// 같은 기초 자산이 둘 이상이면 페어 전체(`btc_usdt`)를 씁니다.
fn chart_tokens(analysis: &PortfolioAnalysis) -> Vec<String> {
    let mut base_counts: HashMap<&str, usize> = HashMap::new();
    for pair in &analysis.pairs {
        *base_counts.entry(pair.symbol.base.as_str()).or_default() += 1;
    }

    analysis
        .pairs
        .iter()
        .map(|pair| {
            if base_counts.get(pair.symbol.base.as_str()).copied().unwrap_or(0) > 1 {
                pair.symbol.file_stem().to_lowercase()
            } else {
                pair.symbol.base.to_lowercase()
            }
        })
        .collect()
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let mut file = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut file, value).map_err(io::Error::other)?;
    file.flush()?;
    debug!(path = %path.display(), "Chart file written");
    Ok(())
}
