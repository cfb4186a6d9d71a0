//! 로컬 CSV 가격 파일.
//!
//! 파일 형식 (`dca download`가 기록하는 형식):
//!
//! ```text
//! date,open,high,low,close,volume
//! 2024-01-01,42283.58,44184.10,42180.77,44179.55,27174.29903
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use dca_core::{PricePoint, PriceSeries, PriceSeriesProvider, ProviderError, Symbol};
use rust_decimal::Decimal;
use tracing::debug;

/// CSV 헤더.
pub const CSV_HEADER: &str = "date,open,high,low,close,volume";

/// 디렉토리의 `<BASE>_<QUOTE>.csv` 파일에서 시계열을 읽는 제공자.
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 심볼의 CSV 파일 경로.
    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.file_stem()))
    }
}

#[async_trait]
impl PriceSeriesProvider for CsvPriceProvider {
    async fn fetch_daily_series(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError> {
        let path = self.path_for(symbol);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ProviderError::Io(format!("{}: {}", path.display(), e)))?;

        let series = read_series_csv(&symbol.to_string(), &content)?;
        debug!(pair = %symbol, path = %path.display(), rows = series.len(), "Loaded price CSV");

        Ok(series.truncate(start, end))
    }

    fn provider_name(&self) -> &str {
        "csv"
    }
}

/// CSV 내용을 시계열로 파싱합니다.
///
/// 빈 줄과 헤더는 건너뜁니다. 거래량 열은 없어도 됩니다.
pub fn read_series_csv(symbol: &str, content: &str) -> Result<PriceSeries, ProviderError> {
    let mut points = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || (idx == 0 && line.starts_with("date")) {
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        if parts.len() < 5 {
            return Err(ProviderError::Parse(format!(
                "line {}: expected at least 5 columns, got {}",
                line_no,
                parts.len()
            )));
        }

        let date = NaiveDate::parse_from_str(parts[0], "%Y-%m-%d").map_err(|e| {
            ProviderError::Parse(format!("line {}: invalid date '{}': {}", line_no, parts[0], e))
        })?;
        let volume = match parts.get(5) {
            Some(v) => parse_field(v, line_no)?,
            None => Decimal::ZERO,
        };

        points.push(PricePoint::new(
            date,
            parse_field(parts[1], line_no)?,
            parse_field(parts[2], line_no)?,
            parse_field(parts[3], line_no)?,
            parse_field(parts[4], line_no)?,
            volume,
        ));
    }

    Ok(PriceSeries::new(symbol, points))
}

/// 시계열을 CSV로 기록합니다.
pub fn write_series_csv<W: Write>(writer: &mut W, series: &PriceSeries) -> std::io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for p in series.points() {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            p.date.format("%Y-%m-%d"),
            p.open,
            p.high,
            p.low,
            p.close,
            p.volume
        )?;
    }
    Ok(())
}

/// 시계열을 CSV 파일로 저장합니다. 상위 디렉토리가 없으면 만듭니다.
pub fn save_series_csv(path: &Path, series: &PriceSeries) -> Result<(), ProviderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_series_csv(&mut file, series)?;
    file.flush()?;
    Ok(())
}

fn parse_field(value: &str, line_no: usize) -> Result<Decimal, ProviderError> {
    Decimal::from_str(value)
        .map_err(|e| ProviderError::Parse(format!("line {}: invalid number '{}': {}", line_no, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_read_series_csv() {
        let content = "date,open,high,low,close,volume\n\
                       2024-01-02,2,2,2,2.5,10\n\
                       2024-01-01,1,1,1,1.5,10\n\
                       \n\
                       2024-01-02,9,9,9,9,9\n";
        let series = read_series_csv("BTC/USDT", content).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].close, dec!(1.5));
        // 중복 날짜는 처음 나온 행 유지
        assert_eq!(series.points()[1].close, dec!(2.5));
    }

    #[test]
    fn test_read_without_volume() {
        let series = read_series_csv("X", "2024-03-01,1,2,0.5,1.5").unwrap();
        assert_eq!(series.points()[0].volume, Decimal::ZERO);
    }

    #[test]
    fn test_read_errors_name_line() {
        let err = read_series_csv("X", "date,open,high,low,close\n2024-13-01,1,1,1,1").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(ref m) if m.contains("line 2")));

        let err = read_series_csv("X", "2024-01-01,1,1,abc,1").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(ref m) if m.contains("abc")));

        assert!(read_series_csv("X", "2024-01-01,1,1").is_err());
    }

    #[test]
    fn test_write_then_read_preserves_values() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = PriceSeries::from_closes("ETH/USDT", start, &[dec!(2300.5), dec!(2410.25)]);

        let mut buf = Vec::new();
        write_series_csv(&mut buf, &series).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(CSV_HEADER));
        assert!(text.contains("2024-01-02,2410.25,2410.25,2410.25,2410.25,0"));

        let parsed = read_series_csv("ETH/USDT", &text).unwrap();
        assert_eq!(parsed, series);
    }
}
