use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Market-data provider behind quote, news, stats and company lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QuoteBackend {
    Iex,
    Alpaca,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ticker-bot", version, about = "Stock quote slash-command server")]
pub struct Config {
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// HTTP worker threads (defaults to the number of cores)
    #[arg(long, env = "HTTP_WORKERS")]
    pub workers: Option<usize>,

    /// Only answer slash commands sent to this Host
    #[arg(long, env = "ALLOWED_HOST")]
    pub allowed_host: Option<String>,

    /// Contact shown at the end of the help text
    #[arg(long, env = "SUPPORT_EMAIL")]
    pub support_email: Option<String>,

    /// e.g. redis://:password@localhost:6379
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    #[arg(long, env = "REDIS_KEY_PREFIX")]
    pub redis_key_prefix: Option<String>,

    #[arg(long, env = "QUOTE_BACKEND", value_enum, default_value_t = QuoteBackend::Iex)]
    pub quote_backend: QuoteBackend,

    #[arg(long, env = "QUOTE_TIMEOUT_SECS", default_value_t = 10)]
    pub quote_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::parse()
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_secs(self.quote_timeout_secs)
    }
}
