//! 지수 백오프 재시도.
//!
//! 재시도 가능한 [`ExchangeError`]만 재시도하며, 요청 한도 초과는
//! 지수 백오프 대신 고정된 `rate_limit_backoff`만큼 대기합니다.

use std::future::Future;
use std::time::Duration;

use dca_core::ExchangeSettings;
use tracing::{debug, warn};

use crate::ExchangeError;

/// 재시도 설정.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 최대 시도 횟수 (첫 시도 포함, 최소 1)
    pub max_attempts: u32,
    /// 첫 재시도 대기 시간
    pub initial_backoff: Duration,
    /// 최대 재시도 대기 시간
    pub max_backoff: Duration,
    /// 백오프 배수
    pub multiplier: f64,
    /// 요청 한도 초과 시 대기 시간
    pub rate_limit_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
            rate_limit_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// 거래소 설정에서 생성.
    pub fn from_settings(settings: &ExchangeSettings) -> Self {
        Self {
            max_attempts: settings.max_retries.max(1),
            initial_backoff: settings.initial_backoff(),
            max_backoff: settings.max_backoff(),
            rate_limit_backoff: settings.rate_limit_backoff(),
            ..Default::default()
        }
    }

    /// 재시도 없이 한 번만 시도.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// `attempt`번째 실패 후의 지수 백오프 대기 시간 (1부터 시작).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let millis = self.initial_backoff.as_millis() as f64 * self.multiplier.max(1.0).powi(exponent);
        let capped = millis.round().min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    /// 에러 종류에 따른 대기 시간.
    pub fn delay_for(&self, error: &ExchangeError, attempt: u32) -> Duration {
        if error.is_rate_limited() {
            self.rate_limit_backoff
        } else {
            self.backoff_for(attempt)
        }
    }
}

/// 재시도 가능한 에러에 대해 작업을 재시도합니다.
///
/// 재시도 불가능한 에러나 마지막 시도의 에러는 그대로 반환합니다.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut op: F,
) -> Result<T, ExchangeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ExchangeError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation, attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = config.delay_for(&e, attempt);
                warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after error"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
