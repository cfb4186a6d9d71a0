//! DCA 분석 전반에서 사용되는 공통 타입.

mod decimal;
mod period;
mod symbol;

pub use decimal::*;
pub use period::*;
pub use symbol::*;
