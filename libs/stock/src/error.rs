use thiserror::Error;

/// Conditions the desk reports to its callers as-is.
///
/// These travel inside `anyhow::Error`; use `downcast_ref::<StockError>()`
/// to tell them apart from upstream failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockError {
    #[error("Error: invalid number of arguments")]
    InvalidArguments,

    #[error("No List")]
    NoList,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Not enough shares")]
    NotEnoughShares,

    #[error("Too many shares")]
    TooManyShares,

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("Unknown statistic: {0}")]
    UnknownStatistic(String),

    #[error("{feature} is not supported by the {backend} backend")]
    Unsupported {
        backend: &'static str,
        feature: &'static str,
    },

    #[error("No data returned for {0}")]
    NoData(String),
}
