//! 차트 데이터 구조
//!
//! 분석 결과를 외부 렌더러(웹 대시보드, 노트북 등)에서 바로 그릴 수 있는
//! JSON 시계열로 변환합니다.
//!
//! # 제공 차트
//!
//! - 페어별: 가격 vs 평균 단가, 손익률, 평가금액 vs 투자금
//! - 포트폴리오: 전체 평가금액 vs 투자금, 전체 손익률, 배분 비중

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::aggregator::PortfolioAnalysis;
use crate::engine::SimulationResult;

/// 차트 데이터 포인트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// X축 값 (해당 날짜 00:00 UTC, 밀리초)
    pub x: i64,

    /// Y축 값
    pub y: Decimal,

    /// 레이블 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ChartPoint {
    /// 날짜와 값으로 차트 포인트를 생성합니다.
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        Self {
            x: date
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .and_utc()
                .timestamp_millis(),
            y: value,
            label: None,
        }
    }

    /// 레이블이 있는 차트 포인트를 생성합니다.
    pub fn with_label(date: NaiveDate, value: Decimal, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(date, value)
        }
    }
}

fn series<F>(result: &SimulationResult, f: F) -> Vec<ChartPoint>
where
    F: Fn(&crate::engine::SimulationState) -> Decimal,
{
    result
        .states
        .iter()
        .map(|s| ChartPoint::new(s.date, f(s)))
        .collect()
}

/// 한 페어의 차트 데이터 모음
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairCharts {
    /// 페어 (예: "BTC/USDT")
    pub pair: String,

    /// 종가
    pub price: Vec<ChartPoint>,

    /// 평균 매수 단가
    pub cost_basis: Vec<ChartPoint>,

    /// 손익률 (%)
    pub pnl_percent: Vec<ChartPoint>,

    /// 평가금액
    pub portfolio_value: Vec<ChartPoint>,

    /// 누적 투자금
    pub invested: Vec<ChartPoint>,

    /// 매수일 표시 (레이블: 매수 금액)
    pub purchases: Vec<ChartPoint>,
}

impl PairCharts {
    /// 시뮬레이션 결과에서 차트 데이터를 생성합니다.
    pub fn from_result(pair: impl Into<String>, result: &SimulationResult) -> Self {
        let mut previous_invested = Decimal::ZERO;
        let purchases = result
            .states
            .iter()
            .filter_map(|s| {
                let amount = s.total_invested - previous_invested;
                previous_invested = s.total_invested;
                s.purchased
                    .then(|| ChartPoint::with_label(s.date, s.price, amount.round_dp(2).to_string()))
            })
            .collect();

        Self {
            pair: pair.into(),
            price: series(result, |s| s.price),
            cost_basis: series(result, |s| s.cost_basis_price),
            pnl_percent: series(result, |s| s.pnl_percent),
            portfolio_value: series(result, |s| s.portfolio_value),
            invested: series(result, |s| s.total_invested),
            purchases,
        }
    }
}

/// 배분 비중 조각 (파이 차트용)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub pair: String,
    pub weight_pct: Decimal,
    pub return_pct: Decimal,
}

/// 포트폴리오 차트 데이터 모음
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioCharts {
    /// 전체 평가금액
    pub portfolio_value: Vec<ChartPoint>,

    /// 전체 누적 투자금
    pub invested: Vec<ChartPoint>,

    /// 전체 손익률 (%)
    pub pnl_percent: Vec<ChartPoint>,

    /// 배분 비중
    pub allocation: Vec<AllocationSlice>,
}

impl PortfolioCharts {
    /// 포트폴리오 분석 결과에서 차트 데이터를 생성합니다.
    pub fn from_analysis(analysis: &PortfolioAnalysis) -> Self {
        let timeline = &analysis.timeline;

        Self {
            portfolio_value: timeline
                .iter()
                .map(|p| ChartPoint::new(p.date, p.value))
                .collect(),
            invested: timeline
                .iter()
                .map(|p| ChartPoint::new(p.date, p.invested))
                .collect(),
            pnl_percent: timeline
                .iter()
                .map(|p| ChartPoint::new(p.date, p.pnl_percent()))
                .collect(),
            allocation: analysis
                .pairs
                .iter()
                .map(|p| AllocationSlice {
                    pair: p.symbol.to_string(),
                    weight_pct: p.weight_pct,
                    return_pct: p.result.return_pct(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::simulate;
    use dca_core::PriceSeries;
    use rust_decimal_macros::dec;

    #[test]
    fn test_chart_point_timestamp() {
        let point = ChartPoint::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), dec!(1));
        assert_eq!(point.x, 1_704_067_200_000);

        let json = serde_json::to_string(&point).unwrap();
        assert!(!json.contains("label"));
    }

    #[test]
    fn test_pair_charts() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = PriceSeries::from_closes("BTC/USDT", start, &[dec!(10), dec!(20), dec!(30)]);
        let result = simulate(&series, dec!(1), 2).unwrap();

        let charts = PairCharts::from_result("BTC/USDT", &result);
        assert_eq!(charts.price.len(), 3);
        assert_eq!(charts.invested[2].y, dec!(2));
        assert_eq!(charts.purchases.len(), 1);
        assert_eq!(charts.purchases[0].y, dec!(20));
        assert_eq!(charts.purchases[0].label.as_deref(), Some("2"));
    }
}
