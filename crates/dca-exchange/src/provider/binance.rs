//! Binance PriceSeriesProvider 구현.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use dca_core::{ExchangeSettings, PriceSeries, PriceSeriesProvider, ProviderError, Symbol};

use crate::connector::binance::{BinanceConfig, BinanceKlinesClient};
use crate::exchange::ExchangeId;

/// Binance PriceSeriesProvider 구현.
///
/// BinanceKlinesClient를 래핑하여 정렬/중복 제거/구간 절단이 끝난
/// 일봉 시계열을 제공합니다.
pub struct BinanceSeriesProvider {
    client: Arc<BinanceKlinesClient>,
    name: String,
}

impl BinanceSeriesProvider {
    /// 새 BinanceSeriesProvider 생성.
    pub fn new(client: Arc<BinanceKlinesClient>) -> Self {
        let name = client.exchange().display_name().to_string();
        Self { client, name }
    }

    /// BinanceKlinesClient에서 생성.
    pub fn from_client(client: BinanceKlinesClient) -> Self {
        Self::new(Arc::new(client))
    }

    /// 애플리케이션 설정으로 클라이언트를 만들어 생성.
    pub fn from_settings(
        exchange: ExchangeId,
        settings: &ExchangeSettings,
    ) -> Result<Self, ProviderError> {
        let client = BinanceKlinesClient::new(BinanceConfig::from_settings(exchange, settings))?;
        Ok(Self::from_client(client))
    }
}

#[async_trait]
impl PriceSeriesProvider for BinanceSeriesProvider {
    async fn fetch_daily_series(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError> {
        let candles = self.client.fetch_daily_candles(symbol, start, end).await?;
        Ok(PriceSeries::new(symbol.to_string(), candles).truncate(start, end))
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}
