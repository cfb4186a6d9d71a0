//! 포트폴리오 집계.
//!
//! 배분 계획의 각 페어에 대해 가격 시계열을 조회하고 DCA 시뮬레이션을
//! 실행한 뒤, 전체 합계와 날짜 기준으로 병합한 타임라인을 만듭니다.
//! 페어는 계획 순서대로 하나씩 처리합니다.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, Instrument};

use dca_core::{
    AllocationPlan, Amount, DcaError, DcaResult, PriceSeriesProvider, Symbol,
};

use super::timeline::{merge_timelines, PortfolioPoint};
use crate::engine::{DcaEngine, SimulationResult};

/// 집계 진행 상황 콜백.
///
/// 기본 구현은 아무것도 하지 않습니다.
pub trait AggregationObserver: Send + Sync {
    /// 페어 처리 시작 (`index`는 0부터).
    fn on_pair_started(&self, _index: usize, _total: usize, _symbol: &Symbol) {}

    /// 페어 처리 완료.
    fn on_pair_completed(&self, _index: usize, _total: usize, _analysis: &PairAnalysis) {}
}

/// 한 페어의 분석 결과.
#[derive(Debug, Clone, Serialize)]
pub struct PairAnalysis {
    pub symbol: Symbol,
    /// 배분 비중 (%)
    pub weight_pct: Decimal,
    /// 이 페어의 일일 투자금
    pub daily_investment: Amount,
    pub result: SimulationResult,
}

/// 포트폴리오 합계.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioTotals {
    pub total_invested: Amount,
    pub total_value: Amount,
    pub total_pnl: Amount,
    /// 투자금 대비 수익률 (%). 투자금이 0이면 0.
    pub total_pnl_percent: Decimal,
}

impl PortfolioTotals {
    /// 페어 결과를 합산합니다.
    pub fn from_pairs(pairs: &[PairAnalysis]) -> Self {
        let total_invested: Decimal = pairs.iter().map(|p| p.result.total_invested).sum();
        let total_value: Decimal = pairs.iter().map(|p| p.result.final_value).sum();
        let total_pnl = total_value - total_invested;
        let total_pnl_percent = if total_invested.is_zero() {
            Decimal::ZERO
        } else {
            total_pnl / total_invested * Decimal::ONE_HUNDRED
        };

        Self {
            total_invested,
            total_value,
            total_pnl,
            total_pnl_percent,
        }
    }
}

/// 포트폴리오 분석 결과.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioAnalysis {
    /// 계획 순서대로의 페어 결과
    pub pairs: Vec<PairAnalysis>,
    pub totals: PortfolioTotals,
    /// 날짜 기준 병합 타임라인
    pub timeline: Vec<PortfolioPoint>,
    /// 분석 시작일
    pub start: NaiveDate,
    /// 분석 종료일
    pub end: NaiveDate,
    /// 매수 주기 (일)
    pub period_days: u32,
    /// 전체 일일 투자금
    pub total_daily_investment: Amount,
}

impl PortfolioAnalysis {
    /// 분석 기간 (일).
    pub fn analysis_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// 전체가 이익 상태인지 (본전 포함).
    pub fn is_profitable(&self) -> bool {
        self.totals.total_pnl >= Decimal::ZERO
    }
}

/// 포트폴리오 집계기.
pub struct PortfolioAggregator {
    provider: Arc<dyn PriceSeriesProvider>,
    engine: DcaEngine,
    observer: Option<Arc<dyn AggregationObserver>>,
}

impl PortfolioAggregator {
    pub fn new(provider: Arc<dyn PriceSeriesProvider>) -> Self {
        Self {
            provider,
            engine: DcaEngine::new(),
            observer: None,
        }
    }

    /// 진행 상황 콜백을 등록합니다.
    pub fn with_observer(mut self, observer: Arc<dyn AggregationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// 배분 계획 전체를 분석합니다.
    ///
    /// 배분/설정 검증은 가격 조회 전에 수행합니다. 한 페어라도 조회에
    /// 실패하거나 데이터가 없으면 전체 분석이 실패합니다.
    #[instrument(skip(self, plan), fields(pairs = plan.len(), provider = self.provider.provider_name()))]
    pub async fn aggregate(
        &self,
        plan: &AllocationPlan,
        total_daily_investment: Amount,
        start: NaiveDate,
        end: NaiveDate,
        period_days: u32,
    ) -> DcaResult<PortfolioAnalysis> {
        plan.validate()?;
        if start > end {
            return Err(DcaError::Configuration(format!(
                "시작일({})이 종료일({})보다 늦습니다",
                start, end
            )));
        }
        if period_days == 0 {
            return Err(DcaError::Configuration(
                "매수 주기는 1일 이상이어야 합니다".to_string(),
            ));
        }
        if total_daily_investment <= Decimal::ZERO {
            return Err(DcaError::Configuration(format!(
                "일일 투자 금액은 0보다 커야 합니다: {}",
                total_daily_investment
            )));
        }

        let total = plan.len();
        let mut pairs = Vec::with_capacity(total);

        for (index, allocation) in plan.allocations().iter().enumerate() {
            let symbol = &allocation.symbol;
            if let Some(observer) = &self.observer {
                observer.on_pair_started(index, total, symbol);
            }

            let series = self
                .provider
                .fetch_daily_series(symbol, start, end)
                .instrument(dca_core::pair_span!("fetch_series", symbol, self.provider.provider_name()))
                .await
                .map_err(|source| DcaError::Provider {
                    pair: symbol.to_string(),
                    source,
                })?;

            if series.is_empty() {
                return Err(DcaError::InsufficientData(format!(
                    "{}: {} ~ {} 구간에 가격 데이터가 없습니다",
                    symbol, start, end
                )));
            }

            let daily_investment = allocation.share_of(total_daily_investment);
            let result = self.engine.simulate(&series, daily_investment, period_days)?;

            info!(
                pair = %symbol,
                days = result.states.len(),
                invested = %result.total_invested,
                value = %result.final_value,
                "Pair analyzed"
            );

            let analysis = PairAnalysis {
                symbol: symbol.clone(),
                weight_pct: allocation.weight_pct,
                daily_investment,
                result,
            };
            if let Some(observer) = &self.observer {
                observer.on_pair_completed(index, total, &analysis);
            }
            pairs.push(analysis);
        }

        let totals = PortfolioTotals::from_pairs(&pairs);
        let timeline = merge_timelines(pairs.iter().map(|p| &p.result));

        Ok(PortfolioAnalysis {
            pairs,
            totals,
            timeline,
            start,
            end,
            period_days,
            total_daily_investment,
        })
    }
}
