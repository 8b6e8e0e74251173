use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use stock::{Company, Desk, MemoryStore, Quote, QuoteSource, Stats, StockError};

use crate::{Data, identity::Identity};

/// The one ticker the fake has no data for.
pub const UNLISTED: &str = "ZZZZ";

/// Every other ticker trades at 1.00 and nothing moves.
pub struct FixedQuotes;

#[async_trait]
impl QuoteSource for FixedQuotes {
    async fn price(&self, ticker: &str) -> Result<f64> {
        if ticker == UNLISTED {
            return Err(StockError::NoData(ticker.to_string()).into());
        }
        Ok(1.0)
    }

    async fn batch_quotes(&self, tickers: &[String]) -> Result<Vec<Quote>> {
        Ok(tickers
            .iter()
            .filter(|ticker| *ticker != UNLISTED)
            .map(|ticker| Quote {
                ticker: ticker.clone(),
                latest_price: 1.0,
                change: 0.0,
                change_percent: 0.0,
            })
            .collect())
    }

    async fn news(&self, _ticker: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn stats(&self, _ticker: &str) -> Result<Stats> {
        Ok(Stats::default())
    }

    async fn company(&self, _ticker: &str) -> Result<Company> {
        Ok(Company::default())
    }
}

pub fn data() -> Data {
    Data {
        desk: Desk::new(Arc::new(MemoryStore::new()), Arc::new(FixedQuotes)),
        support_email: None,
    }
}

pub fn identity(user: &str) -> Identity {
    Identity {
        token: "tok".to_string(),
        user_id: user.to_string(),
        team_id: Some("T1".to_string()),
    }
}
