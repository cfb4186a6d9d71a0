//! 날짜 기준 포트폴리오 타임라인 병합.
//!
//! 페어마다 거래일이 다를 수 있으므로 위치(index)가 아닌 날짜로 합칩니다.
//! 어떤 페어에 해당 날짜가 없으면 그 페어의 직전 값을 그대로 사용하고,
//! 첫 거래일 이전에는 0으로 봅니다.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::SimulationResult;

/// 포트폴리오 전체의 하루치 합계.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPoint {
    pub date: NaiveDate,
    /// 전체 평가금액
    pub value: Decimal,
    /// 전체 누적 투자금
    pub invested: Decimal,
}

impl PortfolioPoint {
    /// 투자금 대비 손익률 (%). 투자금이 0이면 0.
    pub fn pnl_percent(&self) -> Decimal {
        if self.invested.is_zero() {
            Decimal::ZERO
        } else {
            (self.value - self.invested) / self.invested * Decimal::ONE_HUNDRED
        }
    }
}

/// 여러 페어의 일별 상태를 날짜 기준으로 외부 조인하여 합산합니다.
pub fn merge_timelines<'a, I>(results: I) -> Vec<PortfolioPoint>
where
    I: IntoIterator<Item = &'a SimulationResult>,
{
    let results: Vec<&SimulationResult> = results.into_iter().collect();

    let dates: BTreeSet<NaiveDate> = results
        .iter()
        .flat_map(|r| r.states.iter().map(|s| s.date))
        .collect();

    // 페어별 (다음 인덱스, 마지막 평가금액, 마지막 투자금)
    let mut cursors: Vec<(usize, Decimal, Decimal)> =
        vec![(0, Decimal::ZERO, Decimal::ZERO); results.len()];

    dates
        .into_iter()
        .map(|date| {
            let mut value = Decimal::ZERO;
            let mut invested = Decimal::ZERO;

            for (result, cursor) in results.iter().zip(cursors.iter_mut()) {
                while let Some(state) = result.states.get(cursor.0) {
                    if state.date > date {
                        break;
                    }
                    cursor.1 = state.portfolio_value;
                    cursor.2 = state.total_invested;
                    cursor.0 += 1;
                }
                value += cursor.1;
                invested += cursor.2;
            }

            PortfolioPoint {
                date,
                value,
                invested,
            }
        })
        .collect()
}
