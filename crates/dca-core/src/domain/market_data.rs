//! 일봉 가격 데이터 타입.
//!
//! - `PricePoint` - 하루치 OHLCV 데이터
//! - `PriceSeries` - 한 심볼의 날짜 오름차순 일봉 시계열

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, Quantity};

/// 하루치 OHLCV 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 캔들 날짜 (UTC)
    pub date: NaiveDate,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량 (기준 자산 단위)
    pub volume: Quantity,
}

impl PricePoint {
    /// 새 가격 포인트를 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 종가만 있는 포인트를 생성합니다 (OHLC 모두 종가, 거래량 0).
    pub fn from_close(date: NaiveDate, close: Price) -> Self {
        Self::new(date, close, close, close, close, Decimal::ZERO)
    }
}

/// 한 심볼의 일봉 시계열.
///
/// 생성 시 날짜 오름차순으로 정렬하고 중복 날짜를 제거하므로
/// 날짜는 항상 엄격하게 증가합니다. 누락된 날짜는 채우지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// 새 시계열을 생성합니다.
    ///
    /// 같은 날짜가 여러 번 나오면 처음 나온 포인트만 유지합니다.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        // 안정 정렬이므로 같은 날짜끼리는 입력 순서가 유지된다
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);

        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// 종가 목록으로 연속된 일봉 시계열을 생성합니다.
    pub fn from_closes(symbol: impl Into<String>, start: NaiveDate, closes: &[Price]) -> Self {
        let points = start
            .iter_days()
            .zip(closes.iter())
            .map(|(date, close)| PricePoint::from_close(date, *close))
            .collect();
        Self::new(symbol, points)
    }

    /// `[start, end]` 구간(양 끝 포함)으로 잘라낸 시계열을 반환합니다.
    pub fn truncate(self, start: NaiveDate, end: NaiveDate) -> Self {
        let points = self
            .points
            .into_iter()
            .filter(|p| p.date >= start && p.date <= end)
            .collect();

        Self {
            symbol: self.symbol,
            points,
        }
    }

    /// 심볼을 반환합니다.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// 모든 포인트를 반환합니다.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// 포인트 개수를 반환합니다.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 첫 날짜와 마지막 날짜를 반환합니다.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// 마지막 종가를 반환합니다.
    pub fn last_close(&self) -> Option<Price> {
        self.points.last().map(|p| p.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_series_sorted_and_deduplicated() {
        let series = PriceSeries::new(
            "BTC/USDT",
            vec![
                PricePoint::from_close(day(3), dec!(300)),
                PricePoint::from_close(day(1), dec!(100)),
                PricePoint::from_close(day(2), dec!(200)),
                PricePoint::from_close(day(1), dec!(999)),
            ],
        );

        let dates: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
        assert_eq!(series.points()[0].close, dec!(100));
        assert_eq!(series.date_range(), Some((day(1), day(3))));
    }

    #[test]
    fn test_series_truncate_inclusive() {
        let series = PriceSeries::from_closes(
            "ETH/USDT",
            day(1),
            &[dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)],
        );

        let truncated = series.truncate(day(2), day(4));
        assert_eq!(truncated.len(), 3);
        assert_eq!(truncated.points()[0].date, day(2));
        assert_eq!(truncated.last_close(), Some(dec!(4)));
    }

    #[test]
    fn test_series_gaps_are_kept() {
        let series = PriceSeries::new(
            "SOL/USDT",
            vec![
                PricePoint::from_close(day(1), dec!(10)),
                PricePoint::from_close(day(5), dec!(12)),
            ],
        );
        assert_eq!(series.len(), 2);
        assert!(!series.is_empty());
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::new("BTC/USDT", Vec::new());
        assert!(series.is_empty());
        assert_eq!(series.date_range(), None);
        assert_eq!(series.last_close(), None);
    }
}
