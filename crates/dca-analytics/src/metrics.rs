//! 위험 지표 계산.
//!
//! 모든 계산은 `Decimal`로 수행하며 제곱근은 뉴턴 방법으로 구합니다.
//!
//! - 연율화 변동성: 일간 종가 수익률의 모표준편차 × √365 × 100
//! - 최대 낙폭: 포트폴리오 가치의 누적 고점 대비 최저 비율 (%, 0 이하)
//! - 샤프 비율: √365 × 평균(r − 0.02/365) / 표준편차(r)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 연율화에 사용하는 1년 일수 (암호화폐는 매일 거래).
pub const DAYS_PER_YEAR: u32 = 365;

/// 연간 무위험 이자율.
pub const RISK_FREE_RATE: Decimal = dec!(0.02);

/// 일간 단순 수익률 목록.
///
/// 이전 가격이 0 이하인 구간은 건너뜁니다.
pub fn daily_returns(prices: &[Decimal]) -> Vec<Decimal> {
    prices
        .windows(2)
        .filter(|w| w[0] > Decimal::ZERO)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// 평균. 비어 있으면 0.
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().copied().sum::<Decimal>() / Decimal::from(values.len())
}

/// 모표준편차 (n으로 나눔). 비어 있으면 0.
pub fn population_std_dev(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let avg = mean(values);
    let variance = values
        .iter()
        .map(|v| {
            let d = *v - avg;
            d * d
        })
        .sum::<Decimal>()
        / Decimal::from(values.len());
    decimal_sqrt(variance)
}

/// 연율화 변동성 (%).
pub fn annualized_volatility(prices: &[Decimal]) -> Decimal {
    let returns = daily_returns(prices);
    population_std_dev(&returns) * annualization_factor() * Decimal::ONE_HUNDRED
}

/// 최대 낙폭 (%, 0 이하).
///
/// 누적 고점이 0보다 큰 날만 계산합니다 (첫 매수 전 구간 제외).
pub fn max_drawdown_pct(values: &[Decimal]) -> Decimal {
    let mut peak = Decimal::ZERO;
    let mut worst = Decimal::ZERO;

    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak > Decimal::ZERO {
            let drawdown = (value - peak) / peak;
            if drawdown < worst {
                worst = drawdown;
            }
        }
    }

    worst * Decimal::ONE_HUNDRED
}

/// 샤프 비율.
///
/// 가격이 2개 미만이거나 수익률 표준편차가 0이면 0을 반환합니다.
pub fn sharpe_ratio(prices: &[Decimal]) -> Decimal {
    if prices.len() < 2 {
        return Decimal::ZERO;
    }

    let returns = daily_returns(prices);
    let std_dev = population_std_dev(&returns);
    if std_dev.is_zero() {
        return Decimal::ZERO;
    }

    let daily_rf = RISK_FREE_RATE / Decimal::from(DAYS_PER_YEAR);
    let excess = mean(&returns) - daily_rf;

    annualization_factor() * excess / std_dev
}

/// √365.
fn annualization_factor() -> Decimal {
    decimal_sqrt(Decimal::from(DAYS_PER_YEAR))
}

/// Decimal 제곱근 (뉴턴 방법).
///
/// 0 이하의 값은 0을 반환합니다.
pub fn decimal_sqrt(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    // 1보다 작은 값은 1에서 시작해야 빨리 수렴한다
    let mut guess = if value < Decimal::ONE {
        Decimal::ONE
    } else {
        value / Decimal::TWO
    };
    let precision = Decimal::new(1, 16);

    for _ in 0..100 {
        let next_guess = (guess + value / guess) / Decimal::TWO;
        if (next_guess - guess).abs() < precision {
            return next_guess;
        }
        guess = next_guess;
    }

    guess
}
