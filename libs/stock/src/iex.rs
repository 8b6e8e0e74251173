use std::{collections::HashMap, time::Duration};

use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{Company, Quote, QuoteSource, Stats};

const DEFAULT_BASE_API: &str = "https://cloud.iexapis.com/stable";

/// Market data from an IEX Cloud compatible API.
#[derive(Clone)]
pub struct IexClient {
    client: Client,
    base_api: String,
    token: String,
}

impl IexClient {
    pub fn new(base_api: String, token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_api,
            token,
        })
    }

    /// Reads IEX_API_TOKEN and, optionally, IEX_API_BASE_URL.
    pub fn from_env(timeout: Duration) -> Result<Self> {
        let base_api =
            std::env::var("IEX_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_API.to_string());
        let token = std::env::var("IEX_API_TOKEN")
            .map_err(|_| Error::msg("IEX_API_TOKEN environment variable not set"))?;

        Self::new(base_api, token, timeout)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_api.trim_end_matches('/'), path);

        let res = self
            .client
            .get(url)
            .query(&[("token", self.token.as_str())])
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(res)
    }
}

#[async_trait]
impl QuoteSource for IexClient {
    async fn price(&self, ticker: &str) -> Result<f64> {
        self.get_json(&format!("/stock/{ticker}/price"), &[]).await
    }

    async fn batch_quotes(&self, tickers: &[String]) -> Result<Vec<Quote>> {
        let symbols = tickers.join(",");
        let batch: HashMap<String, BatchEntry> = self
            .get_json(
                "/stock/market/batch",
                &[("symbols", symbols.as_str()), ("types", "quote")],
            )
            .await?;

        Ok(batch
            .into_iter()
            .map(|(ticker, entry)| Quote {
                ticker,
                latest_price: entry.quote.latest_price,
                change: entry.quote.change.unwrap_or_default(),
                change_percent: entry.quote.change_percent.unwrap_or_default(),
            })
            .collect())
    }

    async fn news(&self, ticker: &str) -> Result<Vec<String>> {
        let mut news: Vec<IexNews> = self
            .get_json(&format!("/stock/{ticker}/news/last/5"), &[])
            .await?;
        news.sort_by(|a, b| b.datetime.cmp(&a.datetime));

        Ok(news.into_iter().map(|n| n.summary).collect())
    }

    async fn stats(&self, ticker: &str) -> Result<Stats> {
        self.get_json(&format!("/stock/{ticker}/stats"), &[]).await
    }

    async fn company(&self, ticker: &str) -> Result<Company> {
        self.get_json(&format!("/stock/{ticker}/company"), &[]).await
    }
}

#[derive(Debug, Deserialize)]
struct BatchEntry {
    quote: IexQuote,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IexQuote {
    latest_price: f64,
    change: Option<f64>,
    change_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IexNews {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    datetime: DateTime<Utc>,
    #[serde(default)]
    summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_payload_maps_to_quotes() {
        let raw = r#"{
            "AMD": {"quote": {"symbol": "AMD", "latestPrice": 120.5, "change": 1.5, "changePercent": 0.0126}},
            "TSLA": {"quote": {"symbol": "TSLA", "latestPrice": 200.0, "change": null, "changePercent": null}}
        }"#;
        let batch: HashMap<String, BatchEntry> = serde_json::from_str(raw).unwrap();

        let amd = &batch["AMD"].quote;
        assert_eq!(amd.latest_price, 120.5);
        assert_eq!(amd.change_percent, Some(0.0126));
        assert_eq!(batch["TSLA"].quote.change, None);
    }

    #[test]
    fn news_timestamps_are_milliseconds() {
        let raw = r#"[{"datetime": 1545215400000, "headline": "h", "summary": "s"}]"#;
        let news: Vec<IexNews> = serde_json::from_str(raw).unwrap();

        assert_eq!(news[0].datetime.timestamp(), 1_545_215_400);
        assert_eq!(news[0].summary, "s");
    }
}
