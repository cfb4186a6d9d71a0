//! # DCA Core
//!
//! 적립식 투자(DCA) 분석기의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일봉 가격 시계열 (`PricePoint`, `PriceSeries`)
//! - 거래 페어 심볼 및 매수 주기 (`Symbol`, `BuyPeriod`)
//! - 자산 배분 계획 (`AllocationPlan`)
//! - 가격 시계열 제공자 추상화 (`PriceSeriesProvider`)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
