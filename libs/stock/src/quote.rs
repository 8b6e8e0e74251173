use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::StockError;

/// Snapshot of a ticker's latest trading data.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub ticker: String,
    pub latest_price: f64,
    pub change: f64,
    /// Fraction, 0.01 = 1%
    pub change_percent: f64,
}

/// Market-data lookups used by the desk.
///
/// Every call may fail with a lookup error; none of them retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Latest price for a single ticker.
    async fn price(&self, ticker: &str) -> Result<f64>;

    /// Quotes for several tickers at once. Tickers the backend has no data
    /// for are left out of the result; any other failure fails the batch.
    async fn batch_quotes(&self, tickers: &[String]) -> Result<Vec<Quote>>;

    /// Summaries of recent headlines, newest first.
    async fn news(&self, ticker: &str) -> Result<Vec<String>>;

    async fn stats(&self, ticker: &str) -> Result<Stats>;

    async fn company(&self, ticker: &str) -> Result<Company>;
}

/// Tickers are upper-case letters, digits, `.` and `-`, starting with a
/// letter or digit. Backends put them in URL paths, so anything else is
/// refused before a request is made.
pub(crate) fn check_ticker(ticker: &str) -> Result<(), StockError> {
    let valid = ticker
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && ticker
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StockError::InvalidTicker(ticker.to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    pub symbol: String,
    pub company_name: String,
    pub exchange: String,
    pub industry: String,
    pub website: String,
    pub description: String,
    #[serde(rename = "CEO")]
    pub ceo: String,
    pub sector: String,
}

impl Company {
    /// Descriptor lines in display order.
    pub fn lines(&self) -> Vec<&str> {
        vec![
            self.company_name.as_str(),
            self.industry.as_str(),
            self.website.as_str(),
            self.ceo.as_str(),
            self.description.as_str(),
        ]
    }
}

/// Key statistics for a company. Fields the provider leaves null stay `None`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Stats {
    #[serde(rename = "companyName")]
    pub company_name: Option<String>,
    pub marketcap: Option<f64>,
    pub beta: Option<f64>,
    pub week52high: Option<f64>,
    pub week52low: Option<f64>,
    pub week52change: Option<f64>,
    #[serde(rename = "shortInterest")]
    pub short_interest: Option<f64>,
    #[serde(rename = "dividendRate")]
    pub dividend_rate: Option<f64>,
    #[serde(rename = "dividendYield")]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "exDividendDate")]
    pub ex_dividend_date: Option<String>,
    #[serde(rename = "latestEPS")]
    pub latest_eps: Option<f64>,
    #[serde(rename = "latestEPSDate")]
    pub latest_eps_date: Option<String>,
    #[serde(rename = "sharesOutstanding")]
    pub shares_outstanding: Option<f64>,
    pub float: Option<f64>,
    #[serde(rename = "returnOnEquity")]
    pub return_on_equity: Option<f64>,
    #[serde(rename = "consensusEPS")]
    pub consensus_eps: Option<f64>,
    #[serde(rename = "EBITDA")]
    pub ebitda: Option<f64>,
    pub revenue: Option<f64>,
    #[serde(rename = "grossProfit")]
    pub gross_profit: Option<f64>,
    pub cash: Option<f64>,
    pub debt: Option<f64>,
    #[serde(rename = "ttmEPS")]
    pub ttm_eps: Option<f64>,
    #[serde(rename = "peRatioHigh")]
    pub pe_ratio_high: Option<f64>,
    #[serde(rename = "peRatioLow")]
    pub pe_ratio_low: Option<f64>,
    #[serde(rename = "profitMargin")]
    pub profit_margin: Option<f64>,
    #[serde(rename = "priceToSales")]
    pub price_to_sales: Option<f64>,
    #[serde(rename = "priceToBook")]
    pub price_to_book: Option<f64>,
    #[serde(rename = "day200MovingAvg")]
    pub day200_moving_avg: Option<f64>,
    #[serde(rename = "day50MovingAvg")]
    pub day50_moving_avg: Option<f64>,
    #[serde(rename = "year1ChangePercent")]
    pub year1_change_percent: Option<f64>,
    #[serde(rename = "ytdChangePercent")]
    pub ytd_change_percent: Option<f64>,
    #[serde(rename = "month1ChangePercent")]
    pub month1_change_percent: Option<f64>,
}

impl Stats {
    /// Every statistic as `(name, rendered value)`, names as the provider
    /// spells them.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("companyName", text(&self.company_name)),
            ("marketcap", number(self.marketcap)),
            ("beta", number(self.beta)),
            ("week52high", number(self.week52high)),
            ("week52low", number(self.week52low)),
            ("week52change", number(self.week52change)),
            ("shortInterest", number(self.short_interest)),
            ("dividendRate", number(self.dividend_rate)),
            ("dividendYield", number(self.dividend_yield)),
            ("exDividendDate", text(&self.ex_dividend_date)),
            ("latestEPS", number(self.latest_eps)),
            ("latestEPSDate", text(&self.latest_eps_date)),
            ("sharesOutstanding", number(self.shares_outstanding)),
            ("float", number(self.float)),
            ("returnOnEquity", number(self.return_on_equity)),
            ("consensusEPS", number(self.consensus_eps)),
            ("EBITDA", number(self.ebitda)),
            ("revenue", number(self.revenue)),
            ("grossProfit", number(self.gross_profit)),
            ("cash", number(self.cash)),
            ("debt", number(self.debt)),
            ("ttmEPS", number(self.ttm_eps)),
            ("peRatioHigh", number(self.pe_ratio_high)),
            ("peRatioLow", number(self.pe_ratio_low)),
            ("profitMargin", number(self.profit_margin)),
            ("priceToSales", number(self.price_to_sales)),
            ("priceToBook", number(self.price_to_book)),
            ("day200MovingAvg", number(self.day200_moving_avg)),
            ("day50MovingAvg", number(self.day50_moving_avg)),
            ("year1ChangePercent", number(self.year1_change_percent)),
            ("ytdChangePercent", number(self.ytd_change_percent)),
            ("month1ChangePercent", number(self.month1_change_percent)),
        ]
    }

    /// Pick the named statistics, matching names case-insensitively.
    /// An empty `names` selects everything.
    pub fn select(&self, names: &[String]) -> Result<StatsView, StockError> {
        let entries = self.entries();
        if names.is_empty() {
            return Ok(StatsView(entries));
        }

        let mut picked = Vec::with_capacity(names.len());
        for name in names {
            let entry = entries
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(name))
                .ok_or_else(|| StockError::UnknownStatistic(name.clone()))?;
            picked.push(entry.clone());
        }

        Ok(StatsView(picked))
    }
}

/// A rendered subset of [`Stats`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatsView(pub Vec<(&'static str, String)>);

impl fmt::Display for StatsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.0.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{name:<width$}  {value}")?;
        }
        Ok(())
    }
}

fn text(value: &Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => "n/a".to_string(),
    }
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}
