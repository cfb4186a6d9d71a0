//! 매수 주기 코드 파싱.
//!
//! 매수 주기는 `<숫자><단위>` 형식의 코드로 표현합니다:
//! - `d`: 일 (×1)
//! - `w`: 주 (×7)
//! - `m`: 월 (×30, 달력 월이 아닌 근사값)
//!
//! 예: "1d" → 1일, "2w" → 14일, "1m" → 30일

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DcaError;

/// 매수 주기 단위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodUnit {
    /// 일
    Day,
    /// 주 (7일)
    Week,
    /// 월 (30일 근사)
    Month,
}

impl PeriodUnit {
    /// 단위당 일수를 반환합니다.
    pub fn days(&self) -> u32 {
        match self {
            PeriodUnit::Day => 1,
            PeriodUnit::Week => 7,
            PeriodUnit::Month => 30,
        }
    }

    fn code(&self) -> char {
        match self {
            PeriodUnit::Day => 'd',
            PeriodUnit::Week => 'w',
            PeriodUnit::Month => 'm',
        }
    }
}

/// 매수 주기 (예: 2주마다).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuyPeriod {
    magnitude: u32,
    unit: PeriodUnit,
}

impl BuyPeriod {
    /// 새 매수 주기를 생성합니다. 크기는 1 이상이어야 합니다.
    pub fn new(magnitude: u32, unit: PeriodUnit) -> Result<Self, DcaError> {
        if magnitude == 0 {
            return Err(DcaError::Configuration(
                "매수 주기는 1 이상이어야 합니다".to_string(),
            ));
        }
        magnitude.checked_mul(unit.days()).ok_or_else(|| {
            DcaError::Configuration(format!("매수 주기가 너무 깁니다: {}{}", magnitude, unit.code()))
        })?;
        Ok(Self { magnitude, unit })
    }

    /// 매일 매수.
    pub fn daily() -> Self {
        Self {
            magnitude: 1,
            unit: PeriodUnit::Day,
        }
    }

    /// 매수 간격(일)을 반환합니다.
    pub fn days(&self) -> u32 {
        self.magnitude * self.unit.days()
    }

    /// 단위를 반환합니다.
    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }
}

impl Default for BuyPeriod {
    fn default() -> Self {
        Self::daily()
    }
}

impl fmt::Display for BuyPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.code())
    }
}

impl FromStr for BuyPeriod {
    type Err = DcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            DcaError::Configuration(format!(
                "잘못된 매수 주기 형식: {}. 1d, 1w, 2w, 1m 같은 형식을 사용하세요",
                s
            ))
        };

        let code = s.trim();
        let unit_char = code.chars().last().ok_or_else(invalid)?;
        let unit = match unit_char.to_ascii_lowercase() {
            'd' => PeriodUnit::Day,
            'w' => PeriodUnit::Week,
            'm' => PeriodUnit::Month,
            _ => return Err(invalid()),
        };

        let magnitude_str = &code[..code.len() - unit_char.len_utf8()];
        if magnitude_str.is_empty() || !magnitude_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let magnitude: u32 = magnitude_str.parse().map_err(|_| invalid())?;

        Self::new(magnitude, unit)
    }
}
