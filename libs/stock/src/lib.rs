mod account;
mod alpaca;
mod desk;
mod error;
mod iex;
mod quote;
mod redis_store;
mod store;
mod watchlist;

pub use account::{Account, Holding};
pub use alpaca::AlpacaClient;
pub use desk::{Desk, chart_link};
pub use error::StockError;
pub use iex::IexClient;
pub use quote::{Company, Quote, QuoteSource, Stats, StatsView};
pub use redis_store::RedisStore;
pub use store::{KeyValueStore, MemoryStore};
pub use watchlist::{NOTHING_HERE, WatchList};

#[cfg(test)]
pub(crate) use quote::MockQuoteSource;
