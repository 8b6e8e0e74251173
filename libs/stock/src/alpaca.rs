use std::time::Duration as StdDuration;

use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::{StreamExt, TryStreamExt, stream};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue},
};
use serde::Deserialize;
use tracing::{debug, info_span};
use tracing_futures::Instrument;

use crate::{Company, Quote, QuoteSource, Stats, StockError};

const BACKEND: &str = "alpaca";

/// Bars requests in flight at once during a batch lookup.
const CONCURRENCY: usize = 8;

/// Market data from the Alpaca data API.
///
/// There is no batch quote endpoint, so batch lookups fan out one bars
/// request per ticker.
#[derive(Clone)]
pub struct AlpacaClient {
    client: Client,
    base_api: String,
}

impl AlpacaClient {
    pub fn new(base_api: String, key_id: String, secret: String, timeout: StdDuration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("APCA-API-KEY-ID", HeaderValue::from_str(&key_id)?);
        headers.insert("APCA-API-SECRET-KEY", HeaderValue::from_str(&secret)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_api })
    }

    pub fn from_env(timeout: StdDuration) -> Result<Self> {
        let base_api = std::env::var("APCA_API_BASE_URL")?;
        let key_id = std::env::var("APCA_API_KEY_ID")?;
        let secret = std::env::var("APCA_API_SECRET_KEY")?;
        Self::new(base_api, key_id, secret, timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_api.trim_end_matches('/'), path)
    }

    /// Daily bars for the last `days` calendar days, oldest first.
    async fn fetch_daily_bars(&self, symbol: &str, days: i64) -> Result<Vec<Bar>, Error> {
        let end = Utc::now();
        let start = end - Duration::days(days);

        let res: BarsResponse = self
            .client
            .get(self.url(&format!("/v2/stocks/{symbol}/bars")))
            .query(&[
                ("feed", "iex"),
                ("timeframe", "1Day"),
                ("start", &start.to_rfc3339()),
                ("end", &end.to_rfc3339()),
                ("limit", &days.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(res.bars.unwrap_or_default())
    }

    /// Latest close against the previous daily close. `None` when the symbol
    /// has no recent bars.
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let bars = self.fetch_daily_bars(symbol, 10).await?;
        debug!(bars = bars.len(), "fetched daily bars");

        Ok(quote_from_bars(symbol, &bars))
    }
}

fn quote_from_bars(symbol: &str, bars: &[Bar]) -> Option<Quote> {
    let (latest, rest) = bars.split_last()?;

    let (change, change_percent) = match rest.last() {
        Some(prev) if prev.close != 0.0 => {
            let change = latest.close - prev.close;
            (change, change / prev.close)
        }
        _ => (0.0, 0.0),
    };

    Some(Quote {
        ticker: symbol.to_string(),
        latest_price: latest.close,
        change,
        change_percent,
    })
}

/// Run `fetch` once per ticker with at most `limit` calls in flight.
///
/// Results come back in input order. The first error ends the batch and the
/// calls still pending are dropped.
async fn fan_out<T, F, Fut>(tickers: &[String], limit: usize, fetch: F) -> Result<Vec<T>>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    stream::iter(tickers.iter().cloned())
        .map(|symbol| {
            let span = info_span!("alpaca_quote", symbol = %symbol);
            fetch(symbol).instrument(span)
        })
        .buffered(limit)
        .try_collect()
        .await
}

#[async_trait]
impl QuoteSource for AlpacaClient {
    async fn price(&self, ticker: &str) -> Result<f64> {
        let quote = self
            .quote(ticker)
            .await?
            .ok_or_else(|| StockError::NoData(ticker.to_string()))?;
        Ok(quote.latest_price)
    }

    async fn batch_quotes(&self, tickers: &[String]) -> Result<Vec<Quote>> {
        let quotes = fan_out(tickers, CONCURRENCY, |symbol| async move {
            self.quote(&symbol).await
        })
        .await?;

        Ok(quotes.into_iter().flatten().collect())
    }

    async fn news(&self, ticker: &str) -> Result<Vec<String>> {
        let res: NewsResponse = self
            .client
            .get(self.url("/v1beta1/news"))
            .query(&[("symbols", ticker), ("limit", "5"), ("sort", "desc")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut news = res.news;
        news.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(news
            .into_iter()
            .map(|n| if n.summary.is_empty() { n.headline } else { n.summary })
            .collect())
    }

    async fn stats(&self, _ticker: &str) -> Result<Stats> {
        Err(StockError::Unsupported {
            backend: BACKEND,
            feature: "Stats",
        }
        .into())
    }

    async fn company(&self, _ticker: &str) -> Result<Company> {
        Err(StockError::Unsupported {
            backend: BACKEND,
            feature: "Company info",
        }
        .into())
    }
}

//
// Match Alpaca API JSON
// https://docs.alpaca.markets/reference/stockbars
//
#[derive(Debug, Deserialize)]
struct BarsResponse {
    /// null when the symbol has no bars in range
    bars: Option<Vec<Bar>>,
}

/// One daily bar; only the close is used.
#[derive(Debug, Deserialize, Clone)]
struct Bar {
    #[serde(rename = "c")]
    close: f64,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    headline: String,
    #[serde(default)]
    summary: String,
    created_at: DateTime<Utc>,
}
