//! 금액/수량 계산을 위한 Decimal 유틸리티.

use rust_decimal::{Decimal, RoundingStrategy};

/// 가격 타입.
pub type Price = Decimal;

/// 보유 수량 타입.
pub type Quantity = Decimal;

/// 투자 금액 타입 (USD 기준).
pub type Amount = Decimal;

/// 리포트 출력용 Decimal 확장 트레이트.
pub trait DecimalExt {
    /// 금액 표시용으로 소수점 2자리 반올림합니다.
    fn round_money(&self) -> Decimal;

    /// 부호가 포함된 퍼센트 문자열로 변환합니다 (예: "+5.25%", "-3.10%").
    ///
    /// 값은 이미 백분율 단위(5.25 = 5.25%)라고 가정합니다.
    fn to_signed_pct_string(&self) -> String;
}

impl DecimalExt for Decimal {
    fn round_money(&self) -> Decimal {
        self.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    fn to_signed_pct_string(&self) -> String {
        let rounded = self.round_money();
        if rounded > Decimal::ZERO {
            format!("+{:.2}%", rounded)
        } else {
            format!("{:.2}%", rounded)
        }
    }
}
