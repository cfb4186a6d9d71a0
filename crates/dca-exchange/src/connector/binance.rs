//! Binance / Binance.US 일봉 klines 클라이언트.
//!
//! 공개 `GET /api/v3/klines` 엔드포인트만 사용하므로 인증이 필요 없습니다.
//! 긴 기간은 `page_limit` 단위로 나누어 조회하며, 각 페이지 요청은
//! [`with_retry`]로 재시도합니다.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use dca_core::{ExchangeSettings, PricePoint, Symbol};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::exchange::ExchangeId;
use crate::retry::{with_retry, RetryConfig};
use crate::{ExchangeError, ExchangeResult};

/// 하루 (밀리초).
const DAY_MS: i64 = 86_400_000;

/// 요청당 최대 캔들 수 (Binance 상한).
pub const MAX_PAGE_LIMIT: u32 = 1000;

// ============================================================================
// 설정
// ============================================================================

/// klines 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// 대상 거래소
    pub exchange: ExchangeId,
    /// REST API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃
    pub timeout: Duration,
    /// 요청당 최대 캔들 수
    pub page_limit: u32,
    /// 페이지 요청 간 대기 시간
    pub request_delay: Duration,
    /// 재시도 설정
    pub retry: RetryConfig,
}

impl BinanceConfig {
    /// 거래소 기본값으로 설정 생성.
    pub fn new(exchange: ExchangeId) -> Self {
        Self {
            exchange,
            base_url: exchange.rest_base_url().to_string(),
            timeout: Duration::from_secs(30),
            page_limit: MAX_PAGE_LIMIT,
            request_delay: Duration::from_millis(250),
            retry: RetryConfig::default(),
        }
    }

    /// 애플리케이션 설정에서 생성.
    pub fn from_settings(exchange: ExchangeId, settings: &ExchangeSettings) -> Self {
        Self {
            exchange,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| exchange.rest_base_url().to_string()),
            timeout: settings.timeout(),
            page_limit: settings.page_limit.clamp(1, MAX_PAGE_LIMIT),
            request_delay: settings.request_delay(),
            retry: RetryConfig::from_settings(settings),
        }
    }

    /// 기본 URL 재정의.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 페이지 크기 설정.
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    /// 페이지 간 대기 시간 설정.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// 재시도 설정.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

// ============================================================================
// API 응답 타입
// ============================================================================

#[derive(Debug, Deserialize)]
#[allow(dead_code)] // 응답 배열 전체 매핑 (일부만 사용)
struct BinanceKline(
    i64,    // 0: Open time
    String, // 1: Open
    String, // 2: High
    String, // 3: Low
    String, // 4: Close
    String, // 5: Volume
    i64,    // 6: Close time
    String, // 7: Quote asset volume
    i64,    // 8: Number of trades
    String, // 9: Taker buy base asset volume
    String, // 10: Taker buy quote asset volume
    String, // 11: Ignore
);

#[derive(Debug, Deserialize)]
struct BinanceError {
    code: i32,
    msg: String,
}

// ============================================================================
// 클라이언트
// ============================================================================

/// Binance 일봉 klines 클라이언트.
pub struct BinanceKlinesClient {
    config: BinanceConfig,
    client: Client,
}

impl BinanceKlinesClient {
    /// 새 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: BinanceConfig) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    /// 클라이언트 설정.
    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    /// 대상 거래소.
    pub fn exchange(&self) -> ExchangeId {
        self.config.exchange
    }

    /// `[start, end]` 구간의 일봉을 페이지 단위로 조회합니다.
    ///
    /// 일부 페이지를 받은 뒤 재시도가 모두 실패하면 경고를 남기고 그때까지
    /// 받은 캔들을 반환합니다. 아무 캔들도 받지 못했다면 에러를 반환합니다.
    pub async fn fetch_daily_candles(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ExchangeResult<Vec<PricePoint>> {
        let ticker = symbol.exchange_ticker();
        let start_ms = day_start_ms(start);
        let end_ms = day_start_ms(end);
        let limit = self.config.page_limit.max(1);

        let mut candles: Vec<PricePoint> = Vec::new();
        let mut cursor = start_ms;
        let mut pages = 0u32;

        while cursor <= end_ms {
            let page = with_retry(&self.config.retry, "get_klines", || {
                self.get_klines(&ticker, cursor, end_ms, limit)
            })
            .await;

            let page = match page {
                Ok(page) => page,
                Err(e) if !candles.is_empty() => {
                    warn!(
                        pair = %symbol,
                        collected = candles.len(),
                        error = %e,
                        "Page fetch failed, returning partial series"
                    );
                    break;
                }
                Err(e) => {
                    error!(pair = %symbol, error = %e, "Failed to fetch klines");
                    return Err(e);
                }
            };
            pages += 1;

            if page.is_empty() {
                break;
            }

            let page_len = page.len();
            let mut last_open = cursor;
            for kline in page {
                last_open = last_open.max(kline.0);
                if kline.0 > end_ms {
                    continue;
                }
                candles.push(Self::to_price_point(&kline)?);
            }

            debug!(pair = %symbol, page = pages, received = page_len, "Fetched klines page");

            if page_len < limit as usize || last_open >= end_ms {
                break;
            }

            cursor = last_open + DAY_MS;
            if !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }

        info!(
            pair = %symbol,
            exchange = %self.config.exchange,
            candles = candles.len(),
            pages,
            "Daily candles fetched"
        );

        Ok(candles)
    }

    /// klines 한 페이지 조회.
    async fn get_klines(
        &self,
        ticker: &str,
        start_ms: i64,
        end_ms: i64,
        limit: u32,
    ) -> ExchangeResult<Vec<BinanceKline>> {
        self.public_get(
            "/api/v3/klines",
            &[
                ("symbol", ticker.to_string()),
                ("interval", "1d".to_string()),
                ("startTime", start_ms.to_string()),
                ("endTime", end_ms.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// 공개 API 요청 (인증 불필요).
    async fn public_get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);

        debug!(url = %url, ?params, "GET");

        let response = self.client.get(&url).query(params).send().await?;

        self.handle_response(response).await
    }

    /// API 응답 처리.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> ExchangeResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {}", e, body);
                ExchangeError::ParseError(e.to_string())
            });
        }

        // 418: 한도 초과 반복으로 IP 차단됨
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
            return Err(ExchangeError::RateLimited);
        }

        if let Ok(error) = serde_json::from_str::<BinanceError>(&body) {
            return Err(Self::map_error_code(error.code, &error.msg));
        }

        if status.is_server_error() {
            Err(ExchangeError::NetworkError(format!("HTTP {}: {}", status, body)))
        } else {
            Err(ExchangeError::ApiError {
                code: status.as_u16() as i32,
                message: body,
            })
        }
    }

    /// Binance 에러 코드를 ExchangeError로 매핑.
    fn map_error_code(code: i32, msg: &str) -> ExchangeError {
        match code {
            -1001 => ExchangeError::NetworkError(msg.to_string()),
            -1003 => ExchangeError::RateLimited,
            -1121 => ExchangeError::SymbolNotFound(msg.to_string()),
            _ => ExchangeError::ApiError {
                code,
                message: msg.to_string(),
            },
        }
    }

    fn to_price_point(kline: &BinanceKline) -> ExchangeResult<PricePoint> {
        let date = DateTime::from_timestamp_millis(kline.0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| ExchangeError::ParseError(format!("Invalid open time: {}", kline.0)))?;

        Ok(PricePoint::new(
            date,
            parse_decimal(&kline.1)?,
            parse_decimal(&kline.2)?,
            parse_decimal(&kline.3)?,
            parse_decimal(&kline.4)?,
            parse_decimal(&kline.5)?,
        ))
    }
}

fn parse_decimal(s: &str) -> ExchangeResult<Decimal> {
    Decimal::from_str(s).map_err(|e| ExchangeError::ParseError(format!("'{}': {}", s, e)))
}

/// 해당 날짜 00:00 UTC의 epoch 밀리초.
fn day_start_ms(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_day_start_ms() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(day_start_ms(date), 1_704_067_200_000);
        assert_eq!(day_start_ms(date.succ_opt().unwrap()) - day_start_ms(date), DAY_MS);
    }

    #[test]
    fn test_map_error_code() {
        assert!(matches!(
            BinanceKlinesClient::map_error_code(-1003, "Too many requests"),
            ExchangeError::RateLimited
        ));
        assert!(matches!(
            BinanceKlinesClient::map_error_code(-1121, "Invalid symbol."),
            ExchangeError::SymbolNotFound(_)
        ));
        assert!(matches!(
            BinanceKlinesClient::map_error_code(-1100, "Illegal characters"),
            ExchangeError::ApiError { code: -1100, .. }
        ));
    }

    #[test]
    fn test_kline_to_price_point() {
        let kline: BinanceKline = serde_json::from_str(
            r#"[1704067200000,"42283.58","44184.10","42180.77","44179.55","27174.29903",1704153599999,"1169207392.21",1032185,"13934.77808","599656458.27","0"]"#,
        )
        .unwrap();

        let point = BinanceKlinesClient::to_price_point(&kline).unwrap();
        assert_eq!(point.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(point.open, dec!(42283.58));
        assert_eq!(point.close, dec!(44179.55));
        assert_eq!(point.volume, dec!(27174.29903));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = ExchangeSettings {
            page_limit: 5000,
            base_url: Some("http://localhost:1234".to_string()),
            ..Default::default()
        };
        let config = BinanceConfig::from_settings(ExchangeId::BinanceUs, &settings);
        assert_eq!(config.page_limit, MAX_PAGE_LIMIT);
        assert_eq!(config.base_url, "http://localhost:1234");
        assert_eq!(config.retry.max_attempts, 5);

        let config = BinanceConfig::new(ExchangeId::BinanceUs);
        assert_eq!(config.base_url, "https://api.binance.us");
    }
}
