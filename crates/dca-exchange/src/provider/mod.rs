//! PriceSeriesProvider 구현체.
//!
//! - [`BinanceSeriesProvider`]: Binance / Binance.US REST klines
//! - [`CsvPriceProvider`]: `dca download`로 저장한 로컬 CSV 파일

mod binance;
mod csv;

pub use binance::BinanceSeriesProvider;
pub use csv::{read_series_csv, save_series_csv, write_series_csv, CsvPriceProvider, CSV_HEADER};
