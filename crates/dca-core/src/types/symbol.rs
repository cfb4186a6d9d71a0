//! 거래 페어 심볼 정의.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DcaError;

/// 거래 페어 심볼 (예: BTC/USDT).
///
/// 기준 자산과 호가 자산으로 구성되며 항상 대문자로 정규화됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol {
    /// 기준 자산 (예: BTC)
    pub base: String,
    /// 호가 자산 (예: USDT)
    pub quote: String,
}

impl Symbol {
    /// 새 심볼을 생성합니다.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().trim().to_uppercase(),
            quote: quote.into().trim().to_uppercase(),
        }
    }

    /// 거래소 티커 형식 ("BTCUSDT")을 반환합니다.
    pub fn exchange_ticker(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// 파일 이름용 형식 ("BTC_USDT")을 반환합니다.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.base, self.quote)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Symbol {
    type Err = DcaError;

    /// "BASE/QUOTE" 형식 문자열에서 심볼을 파싱합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((base, quote))
                if !base.trim().is_empty() && !quote.trim().is_empty() && !quote.contains('/') =>
            {
                Ok(Self::new(base, quote))
            }
            _ => Err(DcaError::Configuration(format!(
                "잘못된 페어 형식: {}. BASE/QUOTE 형식을 사용하세요 (예: BTC/USDT)",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_parse() {
        let symbol: Symbol = "btc/usdt".parse().unwrap();
        assert_eq!(symbol.base, "BTC");
        assert_eq!(symbol.quote, "USDT");
        assert_eq!(symbol.to_string(), "BTC/USDT");
    }

    #[test]
    fn test_symbol_formats() {
        let symbol = Symbol::new("eth", "usdt");
        assert_eq!(symbol.exchange_ticker(), "ETHUSDT");
        assert_eq!(symbol.file_stem(), "ETH_USDT");
    }

    #[test]
    fn test_symbol_parse_invalid() {
        assert!("BTCUSDT".parse::<Symbol>().is_err());
        assert!("/USDT".parse::<Symbol>().is_err());
        assert!("BTC/".parse::<Symbol>().is_err());
        assert!("A/B/C".parse::<Symbol>().is_err());
    }
}
