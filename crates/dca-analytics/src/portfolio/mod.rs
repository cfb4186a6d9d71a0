//! 포트폴리오 집계 및 차트 데이터.

mod aggregator;
pub mod charts;
mod timeline;

pub use aggregator::{
    AggregationObserver, PairAnalysis, PortfolioAggregator, PortfolioAnalysis, PortfolioTotals,
};
pub use charts::{ChartPoint, PairCharts, PortfolioCharts};
pub use timeline::{merge_timelines, PortfolioPoint};
