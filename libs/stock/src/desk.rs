use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::{
    Account, Company, KeyValueStore, Quote, QuoteSource, Stats, StockError, WatchList,
    quote::check_ticker,
};

/// Watch lists, play-money accounts and company lookups on top of a
/// key-value store and a quote source.
///
/// Holds no per-request state; share it behind an `Arc`.
#[derive(Clone)]
pub struct Desk {
    store: Arc<dyn KeyValueStore>,
    quotes: Arc<dyn QuoteSource>,
}

impl Desk {
    pub fn new(store: Arc<dyn KeyValueStore>, quotes: Arc<dyn QuoteSource>) -> Self {
        Self { store, quotes }
    }

    //
    // Watch lists
    //

    /// Add tickers to the set stored under `key`.
    #[instrument(skip(self))]
    pub async fn add(&self, tickers: &[String], key: &str) -> Result<()> {
        if tickers.is_empty() {
            return Err(StockError::InvalidArguments.into());
        }
        check_tickers(tickers)?;

        self.store
            .set_add(key, tickers)
            .await
            .context("SAdd failed")?;

        debug!(count = tickers.len(), "added to watch list");
        Ok(())
    }

    /// Quotes for every ticker in the list under `key`.
    #[instrument(skip(self))]
    pub async fn print(&self, key: &str) -> Result<WatchList> {
        let list = self
            .store
            .set_members(key)
            .await
            .context("SMembers failed")?;

        if list.is_empty() {
            return Err(StockError::NoList.into());
        }

        self.quotes(&list).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, tickers: &[String], key: &str) -> Result<()> {
        if tickers.is_empty() {
            return Err(StockError::InvalidArguments.into());
        }

        self.store
            .set_remove(key, tickers)
            .await
            .context("SRem failed")?;

        Ok(())
    }

    /// Delete a watch list or an account.
    #[instrument(skip(self))]
    pub async fn clear(&self, key: &str) -> Result<()> {
        self.store.delete(key).await.context("Del failed")?;
        Ok(())
    }

    //
    // Play money
    //

    #[instrument(skip(self))]
    pub async fn deposit(&self, amount: u64, key: &str) -> Result<Account> {
        let mut acct = self.account(key).await?;
        acct.deposit(amount as f64);
        self.save_account(key, &acct).await?;

        info!(balance = acct.balance, "deposit applied");
        Ok(acct)
    }

    #[instrument(skip(self))]
    pub async fn buy(&self, ticker: &str, shares: u64, key: &str) -> Result<Account> {
        check_ticker(ticker)?;
        let price = self.quotes.price(ticker).await.context("quote failed")?;

        let mut acct = self.account(key).await?;
        acct.buy(ticker, shares, price)?;
        self.save_account(key, &acct).await?;

        info!(price, balance = acct.balance, "bought");
        Ok(acct)
    }

    #[instrument(skip(self))]
    pub async fn sell(&self, ticker: &str, shares: u64, key: &str) -> Result<Account> {
        check_ticker(ticker)?;
        let price = self.quotes.price(ticker).await.context("quote failed")?;

        let mut acct = self.account(key).await?;
        acct.sell(ticker, shares, price)?;
        self.save_account(key, &acct)
            .await
            .context("Unable to save account")?;

        info!(price, balance = acct.balance, "sold");
        Ok(acct)
    }

    /// The stored account, without refreshing prices.
    pub async fn portfolio(&self, key: &str) -> Result<Account> {
        self.account(key).await
    }

    /// Fill in the account's latest prices for display. Nothing is saved.
    ///
    /// Holdings the quote source has no price for are left without one.
    pub async fn latest(&self, mut acct: Account) -> Result<Account> {
        acct.latest.clear();

        let tickers: Vec<String> = acct
            .tickers()
            .into_iter()
            .filter(|t| check_ticker(t).is_ok())
            .collect();
        if !tickers.is_empty() {
            for quote in self.quotes.batch_quotes(&tickers).await? {
                acct.latest.insert(quote.ticker, quote.latest_price);
            }
        }

        let missing: Vec<&String> = acct
            .holdings
            .keys()
            .filter(|t| !acct.latest.contains_key(*t))
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "no latest price for held tickers; they are left out of the portfolio");
        }

        Ok(acct)
    }

    //
    // Company lookups
    //

    pub async fn info(&self, ticker: &str) -> Result<Company> {
        check_ticker(ticker)?;
        self.quotes
            .company(ticker)
            .await
            .context("Failed to get company info")
    }

    pub async fn news(&self, ticker: &str) -> Result<Vec<String>> {
        check_ticker(ticker)?;
        self.quotes.news(ticker).await.context("Failed to get news")
    }

    pub async fn stats(&self, ticker: &str) -> Result<Stats> {
        check_ticker(ticker)?;
        self.quotes.stats(ticker).await.context("Failed to get stats")
    }

    /// Sorted quotes for `tickers`, fetched in one batch. Fails with
    /// [`StockError::NoData`] unless every ticker got a quote.
    pub async fn quotes(&self, tickers: &[String]) -> Result<WatchList> {
        check_tickers(tickers)?;
        let quotes = self.quotes.batch_quotes(tickers).await?;

        let missing = missing_tickers(tickers, &quotes);
        if !missing.is_empty() {
            return Err(StockError::NoData(missing.join(", ")).into());
        }

        Ok(WatchList::new(quotes))
    }

    //
    // Helpers
    //

    /// Load the account, starting a fresh one only when none is stored.
    async fn account(&self, key: &str) -> Result<Account> {
        let Some(serialized) = self
            .store
            .get(key)
            .await
            .context("Unable to load account")?
        else {
            debug!("no stored account; starting fresh");
            return Ok(Account::default());
        };

        serde_json::from_str(&serialized).context("Unable to parse account")
    }

    async fn save_account(&self, key: &str, acct: &Account) -> Result<()> {
        let serialized = serde_json::to_string(acct).context("Failed to serialize account")?;

        self.store
            .set(key, &serialized)
            .await
            .context("Failed to save account")
    }
}

fn check_tickers(tickers: &[String]) -> Result<(), StockError> {
    tickers.iter().try_for_each(|t| check_ticker(t))
}

/// Requested tickers with no matching quote, in request order.
fn missing_tickers<'a>(requested: &'a [String], quotes: &[Quote]) -> Vec<&'a str> {
    requested
        .iter()
        .filter(|t| !quotes.iter().any(|q| q.ticker.eq_ignore_ascii_case(t)))
        .map(String::as_str)
        .collect()
}

/// Chart image link for a single ticker.
pub fn chart_link(ticker: &str) -> String {
    format!(
        "http://finviz.com/chart.ashx?t={}&ty=c&ta=1&p=d&s=l",
        ticker.to_uppercase()
    )
}
