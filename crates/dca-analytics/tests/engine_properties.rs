//! DCA 엔진 속성 테스트.

use chrono::NaiveDate;
use dca_analytics::simulate;
use dca_core::PriceSeries;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn series_from(cents: &[u32]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    let closes: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c as i64, 2)).collect();
    PriceSeries::from_closes("BTC/USDT", start, &closes)
}

proptest! {
    #[test]
    fn invested_and_units_never_decrease(
        cents in prop::collection::vec(1u32..10_000_000, 1..120),
        daily in 1u32..500,
        period in 1u32..40,
    ) {
        let series = series_from(&cents);
        let result = simulate(&series, Decimal::from(daily), period).unwrap();

        prop_assert_eq!(result.states.len(), cents.len());
        for pair in result.states.windows(2) {
            prop_assert!(pair[1].total_invested >= pair[0].total_invested);
            prop_assert!(pair[1].total_units_held >= pair[0].total_units_held);
        }
    }

    #[test]
    fn invested_equals_purchases_times_amount(
        cents in prop::collection::vec(1u32..10_000_000, 1..120),
        daily in 1u32..500,
        period in 1u32..40,
    ) {
        let series = series_from(&cents);
        let result = simulate(&series, Decimal::from(daily), period).unwrap();

        let expected_purchases = cents.len() / period as usize;
        prop_assert_eq!(result.purchase_count, expected_purchases);
        prop_assert_eq!(
            result.total_invested,
            Decimal::from(expected_purchases as u64) * Decimal::from(daily) * Decimal::from(period)
        );
    }

    #[test]
    fn cost_basis_reconstructs_invested(
        cents in prop::collection::vec(1u32..10_000_000, 1..60),
        daily in 1u32..500,
        period in 1u32..10,
    ) {
        let series = series_from(&cents);
        let result = simulate(&series, Decimal::from(daily), period).unwrap();

        for state in result.states.iter().filter(|s| s.total_units_held > Decimal::ZERO) {
            let rebuilt = state.cost_basis_price * state.total_units_held;
            let tolerance = state.total_invested * Decimal::new(1, 12);
            prop_assert!(
                (rebuilt - state.total_invested).abs() <= tolerance,
                "{}: {} vs {}", state.date, rebuilt, state.total_invested
            );
        }
    }

    #[test]
    fn simulation_is_deterministic(
        cents in prop::collection::vec(1u32..10_000_000, 1..60),
        period in 1u32..10,
    ) {
        let series = series_from(&cents);
        let first = simulate(&series, Decimal::ONE, period).unwrap();
        let second = simulate(&series, Decimal::ONE, period).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn fear_index_and_drawdown_bounds(
        cents in prop::collection::vec(1u32..10_000_000, 1..120),
        period in 1u32..20,
    ) {
        let series = series_from(&cents);
        let result = simulate(&series, Decimal::ONE, period).unwrap();

        prop_assert!(result.fear_index >= Decimal::ZERO);
        prop_assert!(result.fear_index <= Decimal::ONE_HUNDRED);
        prop_assert!(result.negative_pnl_days <= result.invested_days);
        prop_assert!(result.max_drawdown <= Decimal::ZERO);
        prop_assert!(result.max_drawdown >= -Decimal::ONE_HUNDRED);
        prop_assert!(result.volatility >= Decimal::ZERO);
    }
}

#[test]
fn series_of_exactly_one_period_buys_once_on_last_day() {
    for period in 1u32..=30 {
        let cents = vec![12_345u32; period as usize];
        let result = simulate(&series_from(&cents), Decimal::ONE, period).unwrap();

        assert_eq!(result.purchase_count, 1);
        let last = result.states.last().unwrap();
        assert!(last.purchased);
        assert!(result.states[..result.states.len() - 1].iter().all(|s| !s.purchased));
    }
}
