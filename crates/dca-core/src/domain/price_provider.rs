//! 가격 시계열 제공자 추상화.
//!
//! 거래소 API, 로컬 CSV 파일 등 다양한 소스로부터 일봉 시계열을
//! 조회하기 위한 소스 중립적인 인터페이스를 제공합니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::PriceSeries;
use crate::types::Symbol;

// =============================================================================
// 에러 타입
// =============================================================================

/// 가격 시계열 제공자 에러.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 요청 한도 초과
    #[error("요청 한도 초과: {0}")]
    RateLimited(String),

    /// 거래소 API 에러
    #[error("API 에러: {0}")]
    Api(String),

    /// 응답/파일 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 지원하지 않는 거래소
    #[error("지원하지 않는 거래소: {0}")]
    UnsupportedExchange(String),

    /// 파일 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(String),

    /// 기타 에러
    #[error("기타 에러: {0}")]
    Other(String),
}

impl ProviderError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Network(_) | ProviderError::RateLimited(_)
        )
    }
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        ProviderError::Io(err.to_string())
    }
}

// =============================================================================
// PriceSeriesProvider Trait
// =============================================================================

/// 일봉 가격 시계열 제공자 trait.
///
/// 구현체는 날짜 오름차순, 중복 없는, `[start, end]` 구간(양 끝 포함)으로
/// 잘린 시계열을 반환해야 합니다. 재시도/백오프는 구현체 내부에서 처리하며
/// 최종 실패만 에러로 반환합니다.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct MyProvider;
///
/// #[async_trait]
/// impl PriceSeriesProvider for MyProvider {
///     async fn fetch_daily_series(
///         &self,
///         symbol: &Symbol,
///         start: NaiveDate,
///         end: NaiveDate,
///     ) -> Result<PriceSeries, ProviderError> {
///         // 소스 조회 및 변환
///     }
///
///     fn provider_name(&self) -> &str {
///         "my-source"
///     }
/// }
/// ```
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// 일봉 시계열 조회.
    ///
    /// # Errors
    ///
    /// - `ProviderError::Network`: 재시도 후에도 네트워크 실패
    /// - `ProviderError::RateLimited`: 재시도 후에도 요청 한도 초과
    /// - `ProviderError::Api`: 거래소 API 에러 (잘못된 심볼 등)
    async fn fetch_daily_series(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError>;

    /// 제공자 이름 (로그/리포트용).
    fn provider_name(&self) -> &str;
}
