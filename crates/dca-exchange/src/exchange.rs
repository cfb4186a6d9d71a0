//! 거래소 식별 및 선택.
//!
//! 알 수 없는 거래소 ID는 [`FallbackPolicy`]에 따라 에러로 처리하거나
//! 지정된 기본 거래소로 대체합니다.

use std::fmt;
use std::str::FromStr;

use dca_core::ProviderError;
use tracing::warn;

/// 지원하는 거래소.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeId {
    /// Binance (글로벌)
    Binance,
    /// Binance.US
    BinanceUs,
}

impl ExchangeId {
    /// 지원하는 모든 거래소.
    pub const ALL: [ExchangeId; 2] = [ExchangeId::Binance, ExchangeId::BinanceUs];

    /// 설정/CLI에서 사용하는 ID.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Binance => "binance",
            ExchangeId::BinanceUs => "binanceus",
        }
    }

    /// 표시 이름.
    pub fn display_name(&self) -> &'static str {
        match self {
            ExchangeId::Binance => "Binance",
            ExchangeId::BinanceUs => "Binance.US",
        }
    }

    /// REST API 기본 URL.
    pub fn rest_base_url(&self) -> &'static str {
        match self {
            ExchangeId::Binance => "https://api.binance.com",
            ExchangeId::BinanceUs => "https://api.binance.us",
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExchangeId {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binance" => Ok(ExchangeId::Binance),
            "binanceus" | "binance_us" | "binance-us" => Ok(ExchangeId::BinanceUs),
            other => Err(ProviderError::UnsupportedExchange(other.to_string())),
        }
    }
}

/// 알 수 없는 거래소 ID 처리 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// 에러 반환
    Strict,
    /// 지정된 거래소로 대체
    Default(ExchangeId),
}

impl FallbackPolicy {
    /// 설정값에서 정책을 만듭니다. `None`은 `Strict`입니다.
    pub fn from_setting(fallback: Option<&str>) -> Result<Self, ProviderError> {
        match fallback {
            None => Ok(FallbackPolicy::Strict),
            Some(name) if name.trim().is_empty() => Ok(FallbackPolicy::Strict),
            Some(name) => Ok(FallbackPolicy::Default(name.parse()?)),
        }
    }
}

/// 거래소 ID를 해석합니다.
pub fn resolve_exchange(name: &str, policy: FallbackPolicy) -> Result<ExchangeId, ProviderError> {
    match name.parse::<ExchangeId>() {
        Ok(id) => Ok(id),
        Err(e) => match policy {
            FallbackPolicy::Strict => Err(e),
            FallbackPolicy::Default(default) => {
                warn!(
                    requested = name,
                    fallback = %default,
                    "Unsupported exchange, falling back to default"
                );
                Ok(default)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("binance".parse::<ExchangeId>().unwrap(), ExchangeId::Binance);
        assert_eq!("BinanceUS".parse::<ExchangeId>().unwrap(), ExchangeId::BinanceUs);
        assert_eq!("binance_us".parse::<ExchangeId>().unwrap(), ExchangeId::BinanceUs);
        assert_eq!("binance-us".parse::<ExchangeId>().unwrap(), ExchangeId::BinanceUs);
        assert!(matches!(
            "kraken".parse::<ExchangeId>(),
            Err(ProviderError::UnsupportedExchange(_))
        ));
    }

    #[test]
    fn test_resolve_with_policy() {
        assert!(resolve_exchange("kraken", FallbackPolicy::Strict).is_err());
        assert_eq!(
            resolve_exchange("kraken", FallbackPolicy::Default(ExchangeId::Binance)).unwrap(),
            ExchangeId::Binance
        );
        assert_eq!(
            resolve_exchange("binanceus", FallbackPolicy::Default(ExchangeId::Binance)).unwrap(),
            ExchangeId::BinanceUs
        );
    }

    #[test]
    fn test_policy_from_setting() {
        assert_eq!(FallbackPolicy::from_setting(None).unwrap(), FallbackPolicy::Strict);
        assert_eq!(FallbackPolicy::from_setting(Some("")).unwrap(), FallbackPolicy::Strict);
        assert_eq!(
            FallbackPolicy::from_setting(Some("binance")).unwrap(),
            FallbackPolicy::Default(ExchangeId::Binance)
        );
        assert!(FallbackPolicy::from_setting(Some("ftx")).is_err());
    }
}
