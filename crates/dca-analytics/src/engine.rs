//! DCA 시뮬레이션 엔진.
//!
//! 일봉 시계열을 처음부터 끝까지 한 번 순회하며 매수 주기마다
//! `daily_investment × period_days` 만큼을 그날 종가로 매수하고,
//! 매일의 누적 상태(평가금액, 평균 단가, 손익률)를 기록합니다.
//!
//! 엔진은 I/O가 없는 순수 함수이며 같은 입력에는 항상 같은 결과를 냅니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dca_core::{Amount, DcaError, DcaResult, Price, PriceSeries, Quantity};

use crate::metrics;

/// 하루치 누적 시뮬레이션 상태.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// 날짜
    pub date: NaiveDate,
    /// 당일 종가
    pub price: Price,
    /// 누적 투자금
    pub total_invested: Amount,
    /// 누적 보유 수량
    pub total_units_held: Quantity,
    /// 평가금액 (보유 수량 × 종가)
    pub portfolio_value: Amount,
    /// 평균 매수 단가 (보유 수량이 없으면 당일 종가)
    pub cost_basis_price: Price,
    /// 평균 단가 대비 손익률 (%)
    pub pnl_percent: Decimal,
    /// 당일 매수 여부
    pub purchased: bool,
}

/// 최고/최저 종가와 그 날짜.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceExtreme {
    pub price: Price,
    pub date: NaiveDate,
}

/// 한 페어의 시뮬레이션 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// 일별 상태 (시계열과 같은 길이, 같은 순서)
    pub states: Vec<SimulationState>,
    /// 최고 종가 (동률이면 먼저 나온 날)
    pub highest: PriceExtreme,
    /// 최저 종가 (동률이면 먼저 나온 날)
    pub lowest: PriceExtreme,
    /// 평균 종가
    pub average_price: Price,
    /// 최종 평균 단가 (매수 없으면 0)
    pub final_cost_basis: Price,
    /// 최종 평가금액
    pub final_value: Amount,
    /// 총 투자금
    pub total_invested: Amount,
    /// 총 보유 수량
    pub total_units_held: Quantity,
    /// 매수 횟수
    pub purchase_count: usize,
    /// 공포 지수: 투자 후 평가금액이 투자금보다 낮았던 날의 비율 (%)
    pub fear_index: Decimal,
    /// 평가 손실이었던 날 수
    pub negative_pnl_days: usize,
    /// 첫 매수 이후 날 수
    pub invested_days: usize,
    /// 연율화 변동성 (%)
    pub volatility: Decimal,
    /// 최대 낙폭 (%, 0 이하)
    pub max_drawdown: Decimal,
    /// 샤프 비율
    pub sharpe_ratio: Decimal,
}

impl SimulationResult {
    /// 순손익.
    pub fn net_pnl(&self) -> Amount {
        self.final_value - self.total_invested
    }

    /// 투자금 대비 수익률 (%). 투자금이 0이면 0.
    pub fn return_pct(&self) -> Decimal {
        if self.total_invested.is_zero() {
            Decimal::ZERO
        } else {
            self.net_pnl() / self.total_invested * Decimal::ONE_HUNDRED
        }
    }

    /// 시뮬레이션 기간 (첫날, 마지막날).
    pub fn period(&self) -> (NaiveDate, NaiveDate) {
        // states는 항상 1개 이상
        let first = self.states.first().map_or(self.highest.date, |s| s.date);
        let last = self.states.last().map_or(self.highest.date, |s| s.date);
        (first, last)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.states.iter().map(|s| s.date).collect()
    }

    pub fn prices(&self) -> Vec<Price> {
        self.states.iter().map(|s| s.price).collect()
    }

    pub fn cost_basis_prices(&self) -> Vec<Price> {
        self.states.iter().map(|s| s.cost_basis_price).collect()
    }

    pub fn pnl_percents(&self) -> Vec<Decimal> {
        self.states.iter().map(|s| s.pnl_percent).collect()
    }

    pub fn portfolio_values(&self) -> Vec<Amount> {
        self.states.iter().map(|s| s.portfolio_value).collect()
    }

    pub fn invested_amounts(&self) -> Vec<Amount> {
        self.states.iter().map(|s| s.total_invested).collect()
    }
}

/// DCA 시뮬레이션 엔진.
#[derive(Debug, Clone, Copy, Default)]
pub struct DcaEngine;

impl DcaEngine {
    pub fn new() -> Self {
        Self
    }

    /// 시계열에 DCA 전략을 적용합니다.
    ///
    /// # Errors
    ///
    /// - `DcaError::Configuration`: `period_days`가 0이거나 투자금이 0 이하
    /// - `DcaError::InsufficientData`: 빈 시계열
    /// - `DcaError::InvalidData`: 매수일 종가가 0 이하
    pub fn simulate(
        &self,
        series: &PriceSeries,
        daily_investment: Amount,
        period_days: u32,
    ) -> DcaResult<SimulationResult> {
        if period_days == 0 {
            return Err(DcaError::Configuration(
                "매수 주기는 1일 이상이어야 합니다".to_string(),
            ));
        }
        if daily_investment <= Decimal::ZERO {
            return Err(DcaError::Configuration(format!(
                "일일 투자 금액은 0보다 커야 합니다: {}",
                daily_investment
            )));
        }

        let points = series.points();
        let first = points.first().ok_or_else(|| {
            DcaError::InsufficientData(format!("{}: 가격 데이터가 없습니다", series.symbol()))
        })?;

        let purchase_amount = daily_investment * Decimal::from(period_days);

        let mut states = Vec::with_capacity(points.len());
        let mut days_since_purchase = 0u32;
        let mut total_invested = Decimal::ZERO;
        let mut total_units = Decimal::ZERO;
        let mut purchase_count = 0usize;
        let mut highest = PriceExtreme {
            price: first.close,
            date: first.date,
        };
        let mut lowest = highest;
        let mut close_sum = Decimal::ZERO;
        let mut negative_pnl_days = 0usize;
        let mut invested_days = 0usize;

        for point in points {
            let price = point.close;
            days_since_purchase += 1;

            let purchased = days_since_purchase >= period_days;
            if purchased {
                if price <= Decimal::ZERO {
                    return Err(DcaError::InvalidData(format!(
                        "{} {}: 매수일 종가가 0 이하입니다 ({})",
                        series.symbol(),
                        point.date,
                        price
                    )));
                }
                total_units += purchase_amount / price;
                total_invested += purchase_amount;
                purchase_count += 1;
                days_since_purchase = 0;
            }

            let portfolio_value = total_units * price;
            let has_position = total_units > Decimal::ZERO;
            let cost_basis_price = if has_position {
                total_invested / total_units
            } else {
                price
            };
            let pnl_percent = if has_position {
                (price - cost_basis_price) / cost_basis_price * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            };

            if total_invested > Decimal::ZERO {
                invested_days += 1;
                if portfolio_value < total_invested {
                    negative_pnl_days += 1;
                }
            }

            if price > highest.price {
                highest = PriceExtreme { price, date: point.date };
            }
            if price < lowest.price {
                lowest = PriceExtreme { price, date: point.date };
            }
            close_sum += price;

            states.push(SimulationState {
                date: point.date,
                price,
                total_invested,
                total_units_held: total_units,
                portfolio_value,
                cost_basis_price,
                pnl_percent,
                purchased,
            });
        }

        let closes: Vec<Decimal> = points.iter().map(|p| p.close).collect();
        let values: Vec<Decimal> = states.iter().map(|s| s.portfolio_value).collect();

        let fear_index = if invested_days > 0 {
            Decimal::from(negative_pnl_days) / Decimal::from(invested_days) * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        let final_cost_basis = if total_units > Decimal::ZERO {
            total_invested / total_units
        } else {
            Decimal::ZERO
        };
        let final_value = states.last().map_or(Decimal::ZERO, |s| s.portfolio_value);

        debug!(
            pair = series.symbol(),
            days = states.len(),
            purchases = purchase_count,
            invested = %total_invested,
            "Simulation completed"
        );

        Ok(SimulationResult {
            highest,
            lowest,
            average_price: close_sum / Decimal::from(points.len()),
            final_cost_basis,
            final_value,
            total_invested,
            total_units_held: total_units,
            purchase_count,
            fear_index,
            negative_pnl_days,
            invested_days,
            volatility: metrics::annualized_volatility(&closes),
            max_drawdown: metrics::max_drawdown_pct(&values),
            sharpe_ratio: metrics::sharpe_ratio(&closes),
            states,
        })
    }
}

/// [`DcaEngine::simulate`]의 함수 형태.
pub fn simulate(
    series: &PriceSeries,
    daily_investment: Amount,
    period_days: u32,
) -> DcaResult<SimulationResult> {
    DcaEngine::new().simulate(series, daily_investment, period_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn series(closes: &[Decimal]) -> PriceSeries {
        PriceSeries::from_closes("BTC/USDT", day(1), closes)
    }

    fn close_to(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.001)
    }

    #[test]
    fn test_daily_purchases() {
        let result = simulate(&series(&[dec!(100), dec!(110), dec!(90)]), dec!(10), 1).unwrap();

        assert_eq!(result.purchase_count, 3);
        assert_eq!(result.total_invested, dec!(30));
        assert!(close_to(result.total_units_held, dec!(0.302020)));
        assert!(close_to(result.final_cost_basis, dec!(99.331)));
        assert!(close_to(result.final_value, dec!(27.182)));
        assert!(close_to(result.return_pct(), dec!(-9.394)));
        assert!(close_to(result.states[2].pnl_percent, dec!(-9.394)));

        assert_eq!(result.highest, PriceExtreme { price: dec!(110), date: day(2) });
        assert_eq!(result.lowest, PriceExtreme { price: dec!(90), date: day(3) });
        assert_eq!(result.average_price, dec!(100));
        assert!(result.states.iter().all(|s| s.purchased));
    }

    #[test]
    fn test_periodic_purchase_lands_on_period_end() {
        let result = simulate(&series(&[dec!(100), dec!(100)]), dec!(5), 2).unwrap();

        assert_eq!(result.purchase_count, 1);
        assert!(!result.states[0].purchased);
        assert!(result.states[1].purchased);
        assert_eq!(result.total_invested, dec!(10));

        // 매수 전: 평균 단가는 당일 종가, 손익률 0
        assert_eq!(result.states[0].cost_basis_price, dec!(100));
        assert_eq!(result.states[0].pnl_percent, Decimal::ZERO);
        assert_eq!(result.states[0].portfolio_value, Decimal::ZERO);
        assert_eq!(result.states[1].total_units_held, dec!(0.1));
    }

    #[test]
    fn test_empty_series() {
        let err = simulate(&series(&[]), dec!(10), 1).unwrap_err();
        assert!(matches!(err, DcaError::InsufficientData(_)));
    }

    #[test]
    fn test_invalid_parameters() {
        let s = series(&[dec!(1)]);
        assert!(matches!(simulate(&s, dec!(10), 0), Err(DcaError::Configuration(_))));
        assert!(matches!(simulate(&s, dec!(0), 1), Err(DcaError::Configuration(_))));
        assert!(matches!(simulate(&s, dec!(-1), 1), Err(DcaError::Configuration(_))));
    }

    #[test]
    fn test_zero_price_on_purchase_day() {
        let err = simulate(&series(&[dec!(100), dec!(0)]), dec!(10), 1).unwrap_err();
        assert!(matches!(err, DcaError::InvalidData(_)));

        // 매수일이 아니면 0 가격도 허용
        let result = simulate(&series(&[dec!(0), dec!(100)]), dec!(10), 2).unwrap();
        assert_eq!(result.purchase_count, 1);
    }

    #[test]
    fn test_single_point() {
        let result = simulate(&series(&[dec!(50)]), dec!(10), 1).unwrap();
        assert_eq!(result.states.len(), 1);
        assert_eq!(result.purchase_count, 1);
        assert_eq!(result.volatility, Decimal::ZERO);
        assert_eq!(result.sharpe_ratio, Decimal::ZERO);

        let result = simulate(&series(&[dec!(50)]), dec!(10), 7).unwrap();
        assert_eq!(result.purchase_count, 0);
        assert_eq!(result.final_cost_basis, Decimal::ZERO);
        assert_eq!(result.return_pct(), Decimal::ZERO);
        assert_eq!(result.fear_index, Decimal::ZERO);
    }

    #[test]
    fn test_extremes_keep_first_occurrence() {
        let result = simulate(
            &series(&[dec!(5), dec!(9), dec!(3), dec!(9), dec!(3)]),
            dec!(1),
            1,
        )
        .unwrap();
        assert_eq!(result.highest.date, day(2));
        assert_eq!(result.lowest.date, day(3));
    }

    #[test]
    fn test_fear_index_counts_invested_days_only() {
        // 3일 주기: 셋째 날 첫 매수 후 4일 동안 관찰
        let result = simulate(
            &series(&[dec!(10), dec!(10), dec!(10), dec!(9), dec!(11), dec!(8)]),
            dec!(1),
            3,
        )
        .unwrap();

        assert_eq!(result.invested_days, 4);
        // 10(본전), 9(손실), 11(이익), 8(두 번째 매수 후 손실)
        assert_eq!(result.negative_pnl_days, 2);
        assert_eq!(result.fear_index, dec!(50));
    }

    #[test]
    fn test_drawdown_is_non_positive() {
        let result = simulate(
            &series(&[dec!(100), dec!(120), dec!(60), dec!(80)]),
            dec!(10),
            1,
        )
        .unwrap();
        assert!(result.max_drawdown < Decimal::ZERO);
        assert!(result.max_drawdown >= dec!(-100));
    }

    #[test]
    fn test_aligned_arrays() {
        let result = simulate(&series(&[dec!(1), dec!(2), dec!(3), dec!(4)]), dec!(1), 2).unwrap();
        let n = result.states.len();
        assert_eq!(result.dates().len(), n);
        assert_eq!(result.prices(), vec![dec!(1), dec!(2), dec!(3), dec!(4)]);
        assert_eq!(result.invested_amounts(), vec![dec!(0), dec!(2), dec!(2), dec!(4)]);
        assert_eq!(result.cost_basis_prices().len(), n);
        assert_eq!(result.pnl_percents().len(), n);
        assert_eq!(result.portfolio_values().len(), n);
        assert_eq!(result.period(), (day(1), day(4)));
    }
}
