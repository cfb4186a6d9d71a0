//! 거래소 에러 타입.

use dca_core::ProviderError;
use thiserror::Error;

/// 거래소 REST 호출 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 요청 한도 초과 (HTTP 429/418, 코드 -1003)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// API 에러 코드
    #[error("API error {code}: {message}")]
    ApiError { code: i32, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 심볼을 찾을 수 없음
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

impl ExchangeError {
    /// 재시도 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::NetworkError(_) | ExchangeError::RateLimited | ExchangeError::Timeout(_)
        )
    }

    /// 요청 한도 초과 에러인지 확인.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ExchangeError::RateLimited)
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            ExchangeError::NetworkError(err.to_string())
        } else {
            ExchangeError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

impl From<ExchangeError> for ProviderError {
    fn from(err: ExchangeError) -> Self {
        let message = err.to_string();
        match err {
            ExchangeError::NetworkError(_) | ExchangeError::Timeout(_) => {
                ProviderError::Network(message)
            }
            ExchangeError::RateLimited => ProviderError::RateLimited(message),
            ExchangeError::ApiError { .. } | ExchangeError::SymbolNotFound(_) => {
                ProviderError::Api(message)
            }
            ExchangeError::ParseError(_) => ProviderError::Parse(message),
            ExchangeError::Unknown(_) => ProviderError::Other(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(ExchangeError::RateLimited.is_retryable());
        assert!(ExchangeError::Timeout("t".into()).is_retryable());
        assert!(!ExchangeError::SymbolNotFound("FOOUSDT".into()).is_retryable());
        assert!(!ExchangeError::ParseError("bad".into()).is_retryable());
    }

    #[test]
    fn test_into_provider_error() {
        let err: ProviderError = ExchangeError::RateLimited.into();
        assert!(matches!(err, ProviderError::RateLimited(_)));
        assert!(err.is_retryable());

        let err: ProviderError = ExchangeError::ApiError {
            code: -1121,
            message: "Invalid symbol.".to_string(),
        }
        .into();
        assert!(matches!(err, ProviderError::Api(ref m) if m.contains("-1121")));

        let err: ProviderError = ExchangeError::Timeout("30s".into()).into();
        assert!(matches!(err, ProviderError::Network(_)));
    }
}
