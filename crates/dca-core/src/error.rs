//! DCA 분석 파이프라인의 에러 타입.
//!
//! 설정 검증, 자산 배분 검증, 시뮬레이션, 가격 데이터 조회 단계에서
//! 발생하는 실패를 하나의 에러 타입으로 표현합니다.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::ProviderError;

/// 핵심 DCA 분석 에러.
#[derive(Debug, Error)]
pub enum DcaError {
    /// 설정 에러 (잘못된 매수 주기 코드, 페어 형식, 날짜 범위 등)
    #[error("설정 에러: {0}")]
    Configuration(String),

    /// 자산 배분 비율의 합이 100%가 아님
    #[error("자산 배분 에러: 배분 합계는 100%여야 합니다 (현재: {total}%) [{}]", format_allocations(.allocations))]
    Allocation {
        /// 현재 배분 합계 (%)
        total: Decimal,
        /// 페어별 배분 비율
        allocations: Vec<(String, Decimal)>,
    },

    /// 시뮬레이션할 데이터 부족
    #[error("데이터 부족: {0}")]
    InsufficientData(String),

    /// 시뮬레이션 불가능한 데이터 (0 이하의 가격 등)
    #[error("잘못된 데이터: {0}")]
    InvalidData(String),

    /// 가격 데이터 제공자 에러
    #[error("{pair} 가격 데이터 조회 실패: {source}")]
    Provider {
        /// 실패한 페어
        pair: String,
        /// 원인 에러
        #[source]
        source: ProviderError,
    },
}

/// DCA 작업을 위한 Result 타입.
pub type DcaResult<T> = Result<T, DcaError>;

impl DcaError {
    /// 가격 조회나 시뮬레이션 전에 검출되는 사전 검증 에러인지 확인합니다.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            DcaError::Configuration(_) | DcaError::Allocation { .. }
        )
    }

    /// 특정 페어에 한정된 에러라면 해당 페어를 반환합니다.
    pub fn pair(&self) -> Option<&str> {
        match self {
            DcaError::Provider { pair, .. } => Some(pair),
            _ => None,
        }
    }
}

fn format_allocations(allocations: &[(String, Decimal)]) -> String {
    allocations
        .iter()
        .map(|(pair, weight)| format!("{}: {}%", pair, weight))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_preflight() {
        let config_err = DcaError::Configuration("bad period".to_string());
        assert!(config_err.is_preflight());

        let data_err = DcaError::InsufficientData("empty".to_string());
        assert!(!data_err.is_preflight());
    }

    #[test]
    fn test_allocation_error_lists_pairs() {
        let err = DcaError::Allocation {
            total: dec!(99.5),
            allocations: vec![
                ("BTC/USDT".to_string(), dec!(60)),
                ("ETH/USDT".to_string(), dec!(39.5)),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("99.5%"));
        assert!(message.contains("BTC/USDT: 60%"));
        assert!(message.contains("ETH/USDT: 39.5%"));
        assert!(err.is_preflight());
    }

    #[test]
    fn test_provider_error_pair() {
        let err = DcaError::Provider {
            pair: "SOL/USDT".to_string(),
            source: ProviderError::Network("timeout".to_string()),
        };
        assert_eq!(err.pair(), Some("SOL/USDT"));
        assert!(err.to_string().contains("timeout"));
    }
}
