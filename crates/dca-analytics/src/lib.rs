//! DCA 시뮬레이션 및 포트폴리오 분석.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - DCA 시뮬레이션 엔진 (일별 누적 상태, 공포 지수, 최고/최저가)
//! - 위험 지표 (변동성, 최대 낙폭, 샤프 비율)
//! - 포트폴리오 집계 (배분별 시뮬레이션, 합계, 날짜 기준 타임라인 병합)
//! - 차트 데이터

pub mod engine;
pub mod metrics;
pub mod portfolio;

pub use engine::{simulate, DcaEngine, PriceExtreme, SimulationResult, SimulationState};
pub use metrics::{
    annualized_volatility, decimal_sqrt, max_drawdown_pct, sharpe_ratio, DAYS_PER_YEAR,
    RISK_FREE_RATE,
};
pub use portfolio::{
    merge_timelines, AggregationObserver, ChartPoint, PairAnalysis, PairCharts,
    PortfolioAggregator, PortfolioAnalysis, PortfolioCharts, PortfolioPoint, PortfolioTotals,
};
