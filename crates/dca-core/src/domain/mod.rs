//! DCA 분석을 위한 도메인 모델.

mod allocation;
mod market_data;
mod price_provider;

pub use allocation::*;
pub use market_data::*;
pub use price_provider::*;
