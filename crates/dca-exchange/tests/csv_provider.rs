//! CSV 가격 파일 제공자 통합 테스트.

use chrono::NaiveDate;
use dca_core::{PriceSeries, PriceSeriesProvider, ProviderError, Symbol};
use dca_exchange::{save_series_csv, CsvPriceProvider};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_saved_file_is_served_and_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let symbol: Symbol = "sol/usdt".parse().unwrap();
    let series = PriceSeries::from_closes(
        symbol.to_string(),
        date(2024, 2, 1),
        &[dec!(100), dec!(101), dec!(102), dec!(103)],
    );

    let provider = CsvPriceProvider::new(dir.path());
    save_series_csv(&provider.path_for(&symbol), &series).unwrap();
    assert!(dir.path().join("SOL_USDT.csv").exists());

    let loaded = provider
        .fetch_daily_series(&symbol, date(2024, 2, 2), date(2024, 2, 3))
        .await
        .unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.points()[0].close, dec!(101));
    assert_eq!(loaded.points()[1].close, dec!(102));
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = CsvPriceProvider::new(dir.path());
    let symbol: Symbol = "BTC/USDT".parse().unwrap();

    let err = provider
        .fetch_daily_series(&symbol, date(2024, 1, 1), date(2024, 1, 2))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Io(ref m) if m.contains("BTC_USDT.csv")));
}
