//! 콘솔 리포트.
//!
//! 리포트는 [`Reporter`] trait을 통해 출력하며, [`ConsoleReporter`]는
//! 임의의 `io::Write`(stdout, 테스트용 버퍼 등)에 텍스트로 기록합니다.

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use dca_analytics::{PairAnalysis, PortfolioAnalysis};
use dca_core::{AllocationPlan, BuyPeriod, DecimalExt};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const RULE_WIDTH: usize = 50;
const BAR_WIDTH: usize = 25;

/// 분석 실행 파라미터 (리포트 머리말용).
#[derive(Debug, Clone)]
pub struct RunParameters {
    /// 가격 데이터 출처 (예: "Binance", "csv")
    pub source: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_daily_investment: Decimal,
    pub buy_period: BuyPeriod,
    pub plan: AllocationPlan,
}

/// 분석 결과 출력 인터페이스.
pub trait Reporter {
    /// 실행 파라미터.
    fn parameters(&mut self, params: &RunParameters) -> io::Result<()>;

    /// 페어별 요약.
    fn pair_summary(&mut self, pair: &PairAnalysis) -> io::Result<()>;

    /// 포트폴리오 전체 요약.
    fn portfolio_summary(&mut self, analysis: &PortfolioAnalysis) -> io::Result<()>;

    /// 내보낸 파일 목록.
    fn exported(&mut self, paths: &[PathBuf]) -> io::Result<()>;
}

/// 텍스트 콘솔 리포터.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    /// 표준 출력용 리포터.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// 내부 writer를 돌려줍니다.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "─".repeat(RULE_WIDTH))
    }

    fn section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", title)?;
        self.rule()
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn parameters(&mut self, params: &RunParameters) -> io::Result<()> {
        writeln!(self.out, "🚀 DCA Analyzer")?;
        writeln!(self.out, "{}", "═".repeat(RULE_WIDTH))?;
        writeln!(self.out, "📡 Source            │ {}", params.source)?;
        writeln!(self.out, "📅 Period            │ {} → {}", params.start, params.end)?;
        writeln!(
            self.out,
            "💵 Daily Investment  │ {}",
            format_usd(params.total_daily_investment)
        )?;
        writeln!(
            self.out,
            "🔁 Buy Period        │ {} (every {} days)",
            params.buy_period,
            params.buy_period.days()
        )?;
        let pairs: Vec<String> = params
            .plan
            .allocations()
            .iter()
            .map(|a| format!("{} {}%", a.symbol, a.weight_pct.normalize()))
            .collect();
        writeln!(self.out, "🧺 Pairs             │ {}", pairs.join(", "))?;
        writeln!(self.out)
    }

    fn pair_summary(&mut self, pair: &PairAnalysis) -> io::Result<()> {
        let result = &pair.result;
        let symbol = &pair.symbol;
        let pnl = result.net_pnl();
        let pnl_pct = result.return_pct();
        let current_price = result.states.last().map_or(Decimal::ZERO, |s| s.price);
        let days = result.states.len();
        let daily_amount = if days > 0 {
            result.total_invested / Decimal::from(days)
        } else {
            Decimal::ZERO
        };

        writeln!(
            self.out,
            "{} {} Analysis",
            status_dot(pnl_pct),
            symbol.base
        )?;
        writeln!(
            self.out,
            "{} {}/{} {}",
            token_icon(&symbol.base),
            symbol.base,
            symbol.quote,
            trend_indicator(pnl_pct)
        )?;
        self.rule()?;
        writeln!(
            self.out,
            "💼 Allocation        │ {}",
            allocation_bar(pair.weight_pct, BAR_WIDTH)
        )?;
        writeln!(
            self.out,
            "💰 Total Invested    │ {} (~{}/day)",
            format_usd(result.total_invested),
            format_usd(daily_amount)
        )?;
        writeln!(
            self.out,
            "💲 Amount            │ {:.8} {}",
            result.total_units_held.round_dp(8),
            symbol.base
        )?;
        writeln!(self.out, "💎 Current Value     │ {}", format_usd(result.final_value))?;
        writeln!(
            self.out,
            "📊 Net Profit/Loss   │ {} ({})",
            format_usd(pnl),
            pnl_pct.to_signed_pct_string()
        )?;
        writeln!(
            self.out,
            "😱 Fear Index        │ {} {:.1}% ({} of {} days)",
            fear_mood(result.fear_index),
            result.fear_index.round_dp(1),
            result.negative_pnl_days,
            result.invested_days
        )?;

        self.section("Price Analysis")?;
        let vs_cost = if current_price > result.final_cost_basis {
            "▲"
        } else {
            "▼"
        };
        writeln!(
            self.out,
            "📈 Average Cost      │ {}",
            format_usd(result.final_cost_basis)
        )?;
        writeln!(
            self.out,
            "🎯 Current Price     │ {} {}",
            format_usd(current_price),
            vs_cost
        )?;
        writeln!(
            self.out,
            "🔺 Highest Price     │ {} ({})",
            format_usd(result.highest.price),
            result.highest.date
        )?;
        writeln!(
            self.out,
            "🔻 Lowest Price      │ {} ({})",
            format_usd(result.lowest.price),
            result.lowest.date
        )?;

        self.section("Risk")?;
        writeln!(self.out, "🌊 Volatility        │ {:.2}%", result.volatility.round_money())?;
        writeln!(self.out, "📉 Max Drawdown      │ {:.2}%", result.max_drawdown.round_money())?;
        writeln!(self.out, "⚖️  Sharpe Ratio      │ {:.2}", result.sharpe_ratio.round_money())?;
        writeln!(self.out)
    }

    fn portfolio_summary(&mut self, analysis: &PortfolioAnalysis) -> io::Result<()> {
        let totals = &analysis.totals;
        let status = if analysis.is_profitable() {
            "🟢 PROFITABLE"
        } else {
            "🔴 AT LOSS"
        };

        writeln!(self.out, "{}", status)?;
        writeln!(self.out, "{}", "═".repeat(RULE_WIDTH))?;

        writeln!(self.out, "Portfolio Allocation")?;
        self.rule()?;
        for pair in &analysis.pairs {
            writeln!(
                self.out,
                "{:<10} │ {} │ ROI: {}",
                pair.symbol.to_string(),
                allocation_bar(pair.weight_pct, BAR_WIDTH),
                pair.result.return_pct().to_signed_pct_string()
            )?;
        }

        self.section("Performance Metrics")?;
        writeln!(self.out, "💰 Total Invested    │ {}", format_usd(totals.total_invested))?;
        writeln!(self.out, "💎 Current Value     │ {}", format_usd(totals.total_value))?;
        writeln!(
            self.out,
            "📊 Net Profit/Loss   │ {} ({})",
            format_usd(totals.total_pnl),
            totals.total_pnl_percent.to_signed_pct_string()
        )?;

        if let (Some(first), Some(last)) = (analysis.timeline.first(), analysis.timeline.last()) {
            self.section("Analysis Period")?;
            writeln!(self.out, "📅 Duration          │ {} days", analysis.timeline.len())?;
            writeln!(self.out, "📈 Period            │ {} → {}", first.date, last.date)?;
        }
        writeln!(self.out)
    }

    fn exported(&mut self, paths: &[PathBuf]) -> io::Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "📊 Analysis results exported to:")?;
        for path in paths {
            writeln!(self.out, "   {}", path.display())?;
        }
        self.out.flush()
    }
}

/// 달러 금액 표시 (예: "$1,234.56", "-$9.39").
pub fn format_usd(value: Decimal) -> String {
    let rounded = value.round_money();
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{}", sign, grouped, frac_part)
}

/// 수익률 추세 표시.
pub fn trend_indicator(pnl_percent: Decimal) -> &'static str {
    let v = pnl_percent;
    if v > Decimal::ONE_HUNDRED {
        "⬆️"
    } else if v > Decimal::from(50) {
        "↗️↗️"
    } else if v > Decimal::from(20) {
        "↗️"
    } else if v > Decimal::from(5) {
        "➡️↗️"
    } else if v > Decimal::from(-5) {
        "➡️"
    } else if v > Decimal::from(-20) {
        "➡️↘️"
    } else if v > Decimal::from(-50) {
        "↘️"
    } else {
        "⬇️"
    }
}

/// 공포 지수 분위기 (<30 평온, <60 불안, 그 외 공포).
pub fn fear_mood(fear_index: Decimal) -> &'static str {
    if fear_index < Decimal::from(30) {
        "😊"
    } else if fear_index < Decimal::from(60) {
        "😰"
    } else {
        "😱"
    }
}

/// 배분 비중 막대 (예: "█████░░░░░  50.0%").
pub fn allocation_bar(percentage: Decimal, width: usize) -> String {
    let ratio = (percentage / Decimal::ONE_HUNDRED).clamp(Decimal::ZERO, Decimal::ONE);
    let filled = (ratio * Decimal::from(width))
        .floor()
        .to_usize()
        .unwrap_or(0)
        .min(width);

    format!(
        "{}{} {:>5.1}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        percentage.round_dp(1)
    )
}

fn status_dot(pnl_percent: Decimal) -> &'static str {
    if pnl_percent >= Decimal::ZERO {
        "🟢"
    } else {
        "🔴"
    }
}

fn token_icon(base: &str) -> &'static str {
    match base {
        "BTC" => "₿",
        "ETH" => "Ξ",
        "SOL" => "◎",
        "DOT" => "●",
        "USDT" => "₮",
        _ => "💲",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dca_analytics::{simulate, PortfolioTotals};
    use dca_core::{PriceSeries, Symbol};
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(dec!(0)), "$0.00");
        assert_eq!(format_usd(dec!(999.999)), "$1,000.00");
        assert_eq!(format_usd(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_usd(dec!(-2.818)), "-$2.82");
        assert_eq!(format_usd(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(trend_indicator(dec!(150)), "⬆️");
        assert_eq!(trend_indicator(dec!(100)), "↗️↗️");
        assert_eq!(trend_indicator(dec!(21)), "↗️");
        assert_eq!(trend_indicator(dec!(5)), "➡️");
        assert_eq!(trend_indicator(dec!(-5)), "➡️↘️");
        assert_eq!(trend_indicator(dec!(-49.9)), "↘️");
        assert_eq!(trend_indicator(dec!(-50)), "⬇️");
    }

    #[test]
    fn test_fear_mood() {
        assert_eq!(fear_mood(dec!(29.9)), "😊");
        assert_eq!(fear_mood(dec!(30)), "😰");
        assert_eq!(fear_mood(dec!(60)), "😱");
    }

    #[test]
    fn test_allocation_bar() {
        let bar = allocation_bar(dec!(50), 10);
        assert_eq!(bar, "█████░░░░░  50.0%");
        assert!(allocation_bar(dec!(100), 4).starts_with("████ "));
        assert!(allocation_bar(dec!(33.36), 10).ends_with(" 33.4%"));
    }

    #[test]
    fn test_console_report() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series =
            PriceSeries::from_closes("BTC/USDT", start, &[dec!(100), dec!(110), dec!(90)]);
        let result = simulate(&series, dec!(10), 1).unwrap();
        let pair = PairAnalysis {
            symbol: Symbol::new("BTC", "USDT"),
            weight_pct: dec!(100),
            daily_investment: dec!(10),
            result,
        };
        let totals = PortfolioTotals::from_pairs(std::slice::from_ref(&pair));
        let timeline = dca_analytics::merge_timelines([&pair.result]);
        let analysis = PortfolioAnalysis {
            pairs: vec![pair],
            totals,
            timeline,
            start,
            end: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            period_days: 1,
            total_daily_investment: dec!(10),
        };

        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.pair_summary(&analysis.pairs[0]).unwrap();
        reporter.portfolio_summary(&analysis).unwrap();
        reporter.exported(&[PathBuf::from("dca/out.csv")]).unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();

        assert!(text.contains("🔴 BTC Analysis"));
        assert!(text.contains("$30.00 (~$10.00/day)"));
        assert!(text.contains("$27.18"));
        assert!(text.contains("-$2.82 (-9.39%)"));
        assert!(text.contains("$110.00 (2024-01-02)"));
        assert!(text.contains("$90.00 (2024-01-03)"));
        assert!(text.contains("🔴 AT LOSS"));
        assert!(text.contains("3 days"));
        assert!(text.contains("dca/out.csv"));
    }
}
