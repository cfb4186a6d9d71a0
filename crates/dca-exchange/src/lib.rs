//! 과거 일봉 가격 데이터 제공자.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Binance / Binance.US klines 커넥터 (페이지 조회, 재시도, 부분 시계열 반환)
//! - 거래소 ID 해석 및 대체 정책
//! - 로컬 CSV 가격 파일 제공자
//! - 지수 백오프 재시도

pub mod connector;
pub mod error;
pub mod exchange;
pub mod provider;
pub mod retry;

pub use connector::{BinanceConfig, BinanceKlinesClient, MAX_PAGE_LIMIT};
pub use error::*;
pub use exchange::{resolve_exchange, ExchangeId, FallbackPolicy};
pub use provider::{
    read_series_csv, save_series_csv, write_series_csv, BinanceSeriesProvider, CsvPriceProvider,
    CSV_HEADER,
};
pub use retry::{with_retry, RetryConfig};
