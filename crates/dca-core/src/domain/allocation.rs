//! 자산 배분 계획.
//!
//! 페어별 투자 비중(%)을 입력 순서대로 보관하고, 비중 합계가
//! 100%인지 검증합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DcaError;
use crate::types::Symbol;

/// 배분 합계 허용 오차 (%).
pub const ALLOCATION_TOLERANCE: Decimal = dec!(0.01);

/// 단일 페어 배분.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairAllocation {
    /// 거래 페어
    pub symbol: Symbol,
    /// 투자 비중 (%)
    pub weight_pct: Decimal,
}

impl PairAllocation {
    /// 새 배분을 생성합니다.
    pub fn new(symbol: Symbol, weight_pct: Decimal) -> Self {
        Self { symbol, weight_pct }
    }

    /// 전체 일일 투자금 중 이 페어의 몫을 계산합니다.
    pub fn share_of(&self, total_daily_investment: Decimal) -> Decimal {
        total_daily_investment * self.weight_pct / Decimal::ONE_HUNDRED
    }
}

impl FromStr for PairAllocation {
    type Err = DcaError;

    /// "PAIR:PERCENT" 형식 (예: "BTC/USDT:80")을 파싱합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            DcaError::Configuration(format!(
                "잘못된 페어 배분 형식: {}. PAIR:PERCENTAGE 형식을 사용하세요 (예: BTC/USDT:80)",
                s
            ))
        };

        let (pair, weight) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        let symbol: Symbol = pair.parse()?;
        let weight_pct = Decimal::from_str(weight.trim()).map_err(|_| invalid())?;
        if weight_pct <= Decimal::ZERO {
            return Err(invalid());
        }

        Ok(Self::new(symbol, weight_pct))
    }
}

/// 자산 배분 계획.
///
/// 페어 순서는 입력 순서를 유지하며, 분석도 이 순서대로 진행됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    allocations: Vec<PairAllocation>,
}

impl AllocationPlan {
    /// 배분 목록으로 계획을 생성합니다.
    ///
    /// 같은 페어가 여러 번 나오면 설정 에러를 반환합니다.
    pub fn new(allocations: Vec<PairAllocation>) -> Result<Self, DcaError> {
        for (i, allocation) in allocations.iter().enumerate() {
            if allocations[..i].iter().any(|a| a.symbol == allocation.symbol) {
                return Err(DcaError::Configuration(format!(
                    "중복된 페어: {}",
                    allocation.symbol
                )));
            }
        }
        Ok(Self { allocations })
    }

    /// "PAIR:PERCENT" 문자열 목록에서 계획을 파싱합니다.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, DcaError> {
        if entries.is_empty() {
            return Err(DcaError::Configuration(
                "최소 하나의 페어가 필요합니다".to_string(),
            ));
        }

        let allocations = entries
            .iter()
            .map(|entry| entry.as_ref().parse::<PairAllocation>())
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(allocations)
    }

    /// 배분 목록을 반환합니다.
    pub fn allocations(&self) -> &[PairAllocation] {
        &self.allocations
    }

    /// 페어 개수를 반환합니다.
    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    /// 비중 합계(%)를 반환합니다.
    pub fn total_weight(&self) -> Decimal {
        self.allocations.iter().map(|a| a.weight_pct).sum()
    }

    /// 비중 합계가 100% ± 0.01 이내인지 검증합니다.
    ///
    /// 실패 시 모든 페어의 비중을 담은 `DcaError::Allocation`을 반환합니다.
    pub fn validate(&self) -> Result<(), DcaError> {
        let total = self.total_weight();
        if self.is_empty() || (total - Decimal::ONE_HUNDRED).abs() > ALLOCATION_TOLERANCE {
            return Err(DcaError::Allocation {
                total,
                allocations: self
                    .allocations
                    .iter()
                    .map(|a| (a.symbol.to_string(), a.weight_pct))
                    .collect(),
            });
        }
        Ok(())
    }
}
