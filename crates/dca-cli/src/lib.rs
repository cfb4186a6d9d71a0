//! DCA 분석 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 포트폴리오 DCA 분석 명령어
//! - 콘솔 리포트
//! - 요약 CSV 및 차트 데이터 내보내기
//! - 가격 데이터 다운로드

pub mod commands;
pub mod export;
pub mod report;
