//! 과거 일봉 가격 데이터 다운로드 명령어.
//!
//! 거래소 klines API에서 일봉을 받아 `--data-dir` 오프라인 분석에 쓸 수 있는
//! CSV(`date,open,high,low,close,volume`)로 저장합니다.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dca_core::{ExchangeSettings, PriceSeries, PriceSeriesProvider, Symbol};
use dca_exchange::{save_series_csv, BinanceSeriesProvider, ExchangeId};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

/// 다운로드 설정
pub struct DownloadConfig {
    pub exchange: ExchangeId,
    pub symbol: Symbol,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub output_path: PathBuf,
}

impl DownloadConfig {
    /// 기본 출력 경로 (`data/<BASE>_<QUOTE>.csv`).
    pub fn default_output(symbol: &Symbol) -> PathBuf {
        Path::new("data").join(format!("{}.csv", symbol.file_stem()))
    }
}

/// 데이터를 다운로드하고 저장된 캔들 수를 반환합니다.
pub async fn download_data(config: DownloadConfig, settings: &ExchangeSettings) -> Result<usize> {
    let provider = BinanceSeriesProvider::from_settings(config.exchange, settings)
        .with_context(|| format!("{} 클라이언트 생성 실패", config.exchange.display_name()))?;

    // 진행률 표시줄
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb.set_message(format!(
        "Fetching {} from {}...",
        config.symbol,
        config.exchange.display_name()
    ));

    let series = provider
        .fetch_daily_series(&config.symbol, config.start_date, config.end_date)
        .await;
    let series: PriceSeries = match series {
        Ok(series) => series,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e).with_context(|| format!("{} 다운로드 실패", config.symbol));
        }
    };

    if series.is_empty() {
        warn!(pair = %config.symbol, "No candles returned for the requested range");
    }

    save_series_csv(&config.output_path, &series)
        .with_context(|| format!("CSV 저장 실패: {}", config.output_path.display()))?;

    pb.finish_with_message(format!(
        "Downloaded {} candles for {}",
        series.len(),
        config.symbol
    ));
    info!(
        pair = %config.symbol,
        count = series.len(),
        path = %config.output_path.display(),
        "Price data saved"
    );

    Ok(series.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output() {
        let path = DownloadConfig::default_output(&Symbol::new("ETH", "USDT"));
        assert_eq!(path, Path::new("data").join("ETH_USDT.csv"));
    }
}
