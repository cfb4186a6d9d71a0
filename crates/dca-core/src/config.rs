//! 설정 관리.
//!
//! 기본값 → 설정 파일(TOML) → `DCA__` 접두사 환경 변수 순서로 병합합니다.
//!
//! ```toml
//! [exchange]
//! id = "binance"
//! fallback = "binance"
//! max_retries = 5
//!
//! [analysis]
//! daily_investment = "10"
//! buy_period = "1w"
//! pairs = ["BTC/USDT:70", "ETH/USDT:30"]
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 가격 데이터 거래소 설정
    pub exchange: ExchangeSettings,
    /// 분석 기본값
    pub analysis: AnalysisConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// 거래소 조회 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExchangeSettings {
    /// 거래소 ID (binance, binanceus)
    pub id: String,
    /// 거래소 ID를 인식하지 못할 때 사용할 대체 거래소 (없으면 에러)
    pub fallback: Option<String>,
    /// REST API 기본 URL 재정의 (테스트/프록시용)
    pub base_url: Option<String>,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 페이지 요청당 최대 시도 횟수
    pub max_retries: u32,
    /// 첫 재시도 대기 시간 (밀리초)
    pub initial_backoff_ms: u64,
    /// 최대 재시도 대기 시간 (밀리초)
    pub max_backoff_ms: u64,
    /// 요청 한도 초과 시 대기 시간 (초)
    pub rate_limit_backoff_secs: u64,
    /// 요청당 최대 캔들 수
    pub page_limit: u32,
    /// 페이지 요청 간 대기 시간 (밀리초)
    pub request_delay_ms: u64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            id: "binance".to_string(),
            fallback: Some("binance".to_string()),
            base_url: None,
            timeout_secs: 30,
            max_retries: 5,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            rate_limit_backoff_secs: 30,
            page_limit: 1000,
            request_delay_ms: 250,
        }
    }
}

impl ExchangeSettings {
    /// 요청 타임아웃.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 첫 재시도 대기 시간.
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// 최대 재시도 대기 시간.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// 요청 한도 초과 시 대기 시간.
    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_secs(self.rate_limit_backoff_secs)
    }

    /// 페이지 요청 간 대기 시간.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// 분석 기본값 (CLI 인자로 재정의 가능).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 일일 투자 금액 (USD)
    pub daily_investment: Decimal,
    /// 매수 주기 코드 (1d, 1w, 2w, 1m)
    pub buy_period: String,
    /// 페어별 배분 ("PAIR:PERCENT")
    pub pairs: Vec<String>,
    /// 기본 시작일 (YYYY-MM-DD)
    pub start_date: String,
    /// 차트 유형 (all, total, both)
    pub plot_type: String,
    /// 결과 출력 디렉토리
    pub output_dir: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            daily_investment: Decimal::ONE,
            buy_period: "1d".to_string(),
            pairs: vec!["BTC/USDT:100".to_string()],
            start_date: "2020-01-01".to_string(),
            plot_type: "both".to_string(),
            output_dir: "dca".to_string(),
        }
    }
}

impl AppConfig {
    /// 기본 설정 파일 경로.
    pub const DEFAULT_PATH: &'static str = "config/default.toml";

    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// `required`가 false면 파일이 없어도 기본값과 환경 변수만으로 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P, required: bool) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(required))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("DCA")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다 (파일은 선택 사항).
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(Self::DEFAULT_PATH, false)
    }
}
