use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::StockError;

/// A position in a single ticker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Holding {
    /// Price paid on the most recent purchase
    pub strike: f64,
    pub shares: u64,
}

/// Play-money account: cash plus holdings keyed by ticker.
///
/// Stored as one JSON document. `latest` is filled in for display only and
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    pub balance: f64,
    #[serde(default)]
    pub holdings: BTreeMap<String, Holding>,
    #[serde(skip)]
    pub latest: BTreeMap<String, f64>,
}

impl Account {
    pub fn deposit(&mut self, amount: f64) {
        self.balance += amount;
    }

    /// Debit `price * shares` and add the shares to the holding.
    ///
    /// The holding's strike is replaced by `price`, not averaged with earlier
    /// purchases.
    pub fn buy(&mut self, ticker: &str, shares: u64, price: f64) -> Result<(), StockError> {
        let cost = price * shares as f64;
        if self.balance < cost {
            return Err(StockError::InsufficientFunds);
        }

        let held = self.holdings.get(ticker).map_or(0, |h| h.shares);
        let total = held
            .checked_add(shares)
            .ok_or(StockError::TooManyShares)?;

        self.balance -= cost;
        self.holdings.insert(
            ticker.to_string(),
            Holding {
                strike: price,
                shares: total,
            },
        );

        Ok(())
    }

    /// Credit `price * shares` and take the shares out of the holding,
    /// dropping it once empty.
    pub fn sell(&mut self, ticker: &str, shares: u64, price: f64) -> Result<(), StockError> {
        let holding = match self.holdings.get_mut(ticker) {
            Some(h) if h.shares >= shares => h,
            _ => return Err(StockError::NotEnoughShares),
        };

        holding.shares -= shares;
        if holding.shares == 0 {
            self.holdings.remove(ticker);
        }

        self.balance += price * shares as f64;
        Ok(())
    }

    pub fn tickers(&self) -> Vec<String> {
        self.holdings.keys().cloned().collect()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.holdings.is_empty() {
            return write!(f, "Balance: ${:.2}", self.balance);
        }

        writeln!(
            f,
            "{:<8}{:>10}{:>12}{:>12}{:>14}",
            "Ticker", "Shares", "Strike", "Current", "Gain/Loss $"
        )?;
        writeln!(f, "{}", "-".repeat(56))?;

        let mut value = 0.0;
        let mut gain = 0.0;
        for (ticker, holding) in &self.holdings {
            // No price resolved for this ticker: leave it out of the table.
            let Some(&current) = self.latest.get(ticker) else {
                continue;
            };

            let shares = holding.shares as f64;
            let delta = shares * (current - holding.strike);
            value += shares * current;
            gain += delta;

            writeln!(
                f,
                "{:<8}{:>10}{:>12.2}{:>12.2}{:>14.2}",
                ticker, holding.shares, holding.strike, current, delta
            )?;
        }
        writeln!(
            f,
            "{:<8}{:>10}{:>12}{:>12}{:>14.2}",
            "Total", "---", "---", "---", gain
        )?;

        writeln!(f)?;
        writeln!(f, "Portfolio Value: ${value:.2}")?;
        writeln!(f, "Balance: ${:.2}", self.balance)?;
        write!(f, "Total: ${:.2}", value + self.balance)
    }
}
