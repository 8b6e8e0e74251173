mod account;
mod help;
mod lookup;
mod watch;

use std::{fmt::Display, time::Instant};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{Data, identity::Identity};

/// Commands selected by the first word of the slash-command text.
/// Anything else is treated as a list of tickers to quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Watch,
    List,
    Unwatch,
    Clear,
    Info,
    News,
    Stats,
    Deposit,
    Reset,
    Portfolio,
    Buy,
    Sell,
    Help,
}

impl Command {
    pub const ALL: [Command; 13] = [
        Command::Watch,
        Command::List,
        Command::Unwatch,
        Command::Clear,
        Command::Info,
        Command::News,
        Command::Stats,
        Command::Deposit,
        Command::Reset,
        Command::Portfolio,
        Command::Buy,
        Command::Sell,
        Command::Help,
    ];

    /// Exact match against an upper-cased token.
    pub fn lookup(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == token)
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Watch => "WATCH",
            Command::List => "LIST",
            Command::Unwatch => "UNWATCH",
            Command::Clear => "CLEAR",
            Command::Info => "INFO",
            Command::News => "NEWS",
            Command::Stats => "STATS",
            Command::Deposit => "DEPOSIT",
            Command::Reset => "RESET",
            Command::Portfolio => "PORTFOLIO",
            Command::Buy => "BUY",
            Command::Sell => "SELL",
            Command::Help => "HELP",
        }
    }

    pub fn usage(self) -> &'static str {
        match self {
            Command::Watch => "*watch [#list] [tickers...]* add tickers to a watch list",
            Command::List => "*list [#list]* print out a watch list",
            Command::Unwatch => "*unwatch [#list] [tickers...]* remove tickers from a watch list",
            Command::Clear => "*clear [#list]* remove an entire watch list",
            Command::Info => "*info [ticker]* print a company profile",
            Command::News => "*news [ticker]* print the latest news for a company",
            Command::Stats => "*stats [ticker] [stats...]* print company statistics, optionally only the named ones",
            Command::Deposit => "*deposit [amount]* deposit play money into your account",
            Command::Reset => "*reset* reset your account",
            Command::Portfolio => "*portfolio* print your play money portfolio",
            Command::Buy => "*buy [ticker] [shares]* buy shares with play money",
            Command::Sell => "*sell [ticker] [shares]* sell shares for play money",
            Command::Help => "*help* print this message",
        }
    }

    /// State changes and help are answered privately; lookups are posted to
    /// the channel.
    pub fn visibility(self) -> Visibility {
        match self {
            Command::List
            | Command::Portfolio
            | Command::Info
            | Command::News
            | Command::Stats => Visibility::InChannel,
            Command::Watch
            | Command::Unwatch
            | Command::Clear
            | Command::Deposit
            | Command::Reset
            | Command::Buy
            | Command::Sell
            | Command::Help => Visibility::Ephemeral,
        }
    }

    /// Prefix for errors coming out of the handler.
    fn failure(self) -> &'static str {
        match self {
            Command::Watch => "Add failed",
            Command::List => "Print failed",
            Command::Unwatch => "Remove failed",
            Command::Clear | Command::Reset => "Clear failed",
            Command::Info => "Info failed",
            Command::News => "News failed",
            Command::Stats => "Stats failed",
            Command::Deposit => "Deposit failed",
            Command::Portfolio => "Portfolio failed",
            Command::Buy => "Buy failed",
            Command::Sell => "Sell failed",
            Command::Help => "Help failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only the invoking user sees the reply
    Ephemeral,
    /// Posted to the channel
    InChannel,
}

/// Slash-command response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub response_type: Visibility,
    pub text: String,
}

impl Reply {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: Visibility::Ephemeral,
            text: text.into(),
        }
    }

    pub fn in_channel(text: impl Into<String>) -> Self {
        Self {
            response_type: Visibility::InChannel,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Error: invalid number of arguments")]
    InvalidArguments,

    #[error("Invalid amount: {0}")]
    InvalidNumber(String),

    #[error("Invalid amount: share count must be at least 1")]
    ZeroShares,

    #[error("Shared lists need a team id")]
    MissingTeam,

    #[error("List name is empty")]
    EmptyListName,
}

/// Run one slash command. Every failure comes back as an ephemeral reply.
pub async fn process(data: &Data, text: &str, identity: &Identity) -> Reply {
    let started = Instant::now();
    let tokens: Vec<String> = text
        .to_uppercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let Some((first, args)) = tokens.split_first() else {
        return Reply::ephemeral(crate::identity::RequestError::EmptyText.to_string());
    };

    let command = Command::lookup(first);
    let label = command.map_or("QUOTE", Command::name);
    info!(command = label, user_id = %identity.user_id, "invoked");

    let result = match command {
        Some(cmd) => dispatch(data, cmd, args, identity)
            .await
            .map(|text| Reply {
                response_type: cmd.visibility(),
                text,
            })
            .context(cmd.failure()),
        None => lookup::quote(data, &tokens)
            .await
            .map(Reply::in_channel)
            .context("GetQuotes failed"),
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(reply) => {
            info!(command = label, user_id = %identity.user_id, elapsed_ms, "completed");
            reply
        }
        Err(e) => {
            warn!(command = label, user_id = %identity.user_id, elapsed_ms, error = ?e, "failed");
            Reply::ephemeral(format!("{e:#}"))
        }
    }
}

async fn dispatch(data: &Data, cmd: Command, args: &[String], identity: &Identity) -> Result<String> {
    match cmd {
        Command::Watch => watch::watch(data, args, identity).await,
        Command::List => watch::list(data, args, identity).await,
        Command::Unwatch => watch::unwatch(data, args, identity).await,
        Command::Clear => watch::clear(data, args, identity).await,
        Command::Info => lookup::info(data, args).await,
        Command::News => lookup::news(data, args).await,
        Command::Stats => lookup::stats(data, args).await,
        Command::Deposit => account::deposit(data, args, identity).await,
        Command::Reset => account::reset(data, args, identity).await,
        Command::Portfolio => account::portfolio(data, args, identity).await,
        Command::Buy => account::buy(data, args, identity).await,
        Command::Sell => account::sell(data, args, identity).await,
        Command::Help => Ok(help::help(data)),
    }
}

/// Exactly `N` arguments or an arity error.
fn exact<const N: usize>(args: &[String]) -> Result<&[String; N], CommandError> {
    args.try_into().map_err(|_| CommandError::InvalidArguments)
}

fn parse_count(value: &str) -> Result<u64, CommandError> {
    value
        .parse()
        .map_err(|_| CommandError::InvalidNumber(value.to_string()))
}

/// Wrap tabular text so the chat client renders it monospaced.
fn fenced(body: impl Display) -> String {
    format!("```{body}```")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{data, identity};

    async fn run(data: &Data, text: &str) -> Reply {
        process(data, text, &identity("test")).await
    }

    #[test]
    fn lookup_is_exact_on_upper_case() {
        assert_eq!(Command::lookup("WATCH"), Some(Command::Watch));
        assert_eq!(Command::lookup("PORTFOLIO"), Some(Command::Portfolio));
        assert_eq!(Command::lookup("WATCHES"), None);
        assert_eq!(Command::lookup("AMD"), None);
        assert_eq!(Command::lookup("watch"), None);
    }

    #[test]
    fn every_command_is_registered_once() {
        for cmd in Command::ALL {
            assert_eq!(Command::lookup(cmd.name()), Some(cmd));
        }
    }

    #[test]
    fn mutations_are_private_and_lookups_public() {
        use Visibility::*;

        for (cmd, expected) in [
            (Command::Watch, Ephemeral),
            (Command::Unwatch, Ephemeral),
            (Command::Clear, Ephemeral),
            (Command::Deposit, Ephemeral),
            (Command::Reset, Ephemeral),
            (Command::Buy, Ephemeral),
            (Command::Sell, Ephemeral),
            (Command::Help, Ephemeral),
            (Command::List, InChannel),
            (Command::Portfolio, InChannel),
            (Command::Info, InChannel),
            (Command::News, InChannel),
            (Command::Stats, InChannel),
        ] {
            assert_eq!(cmd.visibility(), expected, "{cmd:?}");
        }
    }

    #[test]
    fn exact_checks_arity() {
        let args = vec!["AMD".to_string(), "1".to_string()];
        assert!(exact::<2>(&args).is_ok());
        assert_eq!(exact::<1>(&args), Err(CommandError::InvalidArguments));
    }

    #[test]
    fn counts_must_be_non_negative_integers() {
        assert_eq!(parse_count("10"), Ok(10));
        assert_eq!(parse_count("0"), Ok(0));
        assert_eq!(
            parse_count("-1"),
            Err(CommandError::InvalidNumber("-1".to_string()))
        );
        assert_eq!(
            parse_count("1.5"),
            Err(CommandError::InvalidNumber("1.5".to_string()))
        );
    }

    #[test]
    fn visibility_serializes_as_envelope_strings() {
        let reply = Reply::in_channel("hi");
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"response_type":"in_channel","text":"hi"}"#
        );
        assert_eq!(
            serde_json::to_string(&Visibility::Ephemeral).unwrap(),
            r#""ephemeral""#
        );
    }

    #[tokio::test]
    async fn session_walkthrough() {
        let data = data();

        let cases: &[(&str, Visibility, &str)] = &[
            ("amd", Visibility::InChannel, ""),
            ("list #mylist", Visibility::Ephemeral, "Print failed: No List"),
            ("list", Visibility::Ephemeral, "Print failed: No List"),
            ("watch #mylist amd", Visibility::Ephemeral, "Added"),
            ("watch amd", Visibility::Ephemeral, "Added"),
            ("list #mylist", Visibility::InChannel, ""),
            ("list", Visibility::InChannel, ""),
            ("unwatch amd", Visibility::Ephemeral, "Removed"),
            ("unwatch #mylist amd", Visibility::Ephemeral, "Removed"),
            ("clear", Visibility::Ephemeral, "Removed"),
            ("clear #mylist", Visibility::Ephemeral, "Removed"),
            ("deposit 100", Visibility::Ephemeral, "New Balance: 100"),
            ("reset", Visibility::Ephemeral, "New Balance: 0"),
            ("portfolio", Visibility::InChannel, "```Balance: $0.00```"),
            ("buy amd 1", Visibility::Ephemeral, "Buy failed: Insufficient funds"),
            ("deposit 1000", Visibility::Ephemeral, "New Balance: 1000"),
            ("buy amd 1", Visibility::Ephemeral, "Done"),
            ("portfolio", Visibility::InChannel, ""),
            ("sell amd 10", Visibility::Ephemeral, "Sell failed: Not enough shares"),
            ("sell amd 1", Visibility::Ephemeral, "Done"),
            ("info amd", Visibility::InChannel, ""),
            ("stats amd", Visibility::InChannel, ""),
            ("stats amd beta", Visibility::InChannel, ""),
            ("news amd", Visibility::InChannel, ""),
            ("help", Visibility::Ephemeral, ""),
        ];

        for (text, visibility, expected) in cases {
            let reply = run(&data, text).await;
            assert_eq!(reply.response_type, *visibility, "{text}: {}", reply.text);
            if !expected.is_empty() {
                assert_eq!(reply.text, *expected, "{text}");
            }
        }
    }

    #[tokio::test]
    async fn unknown_first_word_is_a_quote_lookup() {
        let data = data();
        let reply = run(&data, "AMD GOOG").await;

        assert_eq!(reply.response_type, Visibility::InChannel);
        assert!(reply.text.starts_with("```"));
        assert!(reply.text.contains("AMD"));
        assert!(reply.text.contains("GOOG"));
        assert!(!reply.text.contains("finviz"));
    }

    #[tokio::test]
    async fn single_ticker_quote_gets_a_chart_link() {
        let data = data();
        let reply = run(&data, "amd").await;

        assert!(reply.text.ends_with("\nhttp://finviz.com/chart.ashx?t=AMD&ty=c&ta=1&p=d&s=l"));
    }

    #[tokio::test]
    async fn unknown_ticker_fails_the_whole_lookup_privately() {
        let data = data();

        let reply = run(&data, "amd zzzz").await;
        assert_eq!(
            reply,
            Reply::ephemeral("GetQuotes failed: No data returned for ZZZZ")
        );

        let reply = run(&data, "zzzz").await;
        assert_eq!(reply.response_type, Visibility::Ephemeral);
        assert!(!reply.text.contains("finviz"));
    }

    #[tokio::test]
    async fn list_with_an_unknown_ticker_is_not_posted() {
        let data = data();
        run(&data, "watch amd zzzz").await;

        let reply = run(&data, "list").await;
        assert_eq!(
            reply,
            Reply::ephemeral("Print failed: No data returned for ZZZZ")
        );
    }

    #[tokio::test]
    async fn malformed_tickers_are_rejected() {
        let data = data();

        assert_eq!(
            run(&data, "info ../..").await,
            Reply::ephemeral("Info failed: Invalid ticker: ../..")
        );
        assert_eq!(
            run(&data, "news amd/news").await,
            Reply::ephemeral("News failed: Invalid ticker: AMD/NEWS")
        );
        assert_eq!(
            run(&data, "deposit 10").await,
            Reply::ephemeral("New Balance: 10")
        );
        assert_eq!(
            run(&data, "buy ../.. 1").await,
            Reply::ephemeral("Buy failed: Invalid ticker: ../..")
        );
    }

    #[tokio::test]
    async fn arity_errors_do_not_touch_state() {
        let data = data();

        for text in [
            "deposit",
            "deposit 1 2",
            "buy amd",
            "sell amd 1 2",
            "reset now",
            "portfolio extra",
            "list #a #b",
            "clear amd",
            "info",
            "news amd goog",
            "stats",
            "watch",
            "watch #mylist",
            "unwatch",
        ] {
            let reply = run(&data, text).await;
            assert_eq!(reply.response_type, Visibility::Ephemeral, "{text}");
            assert!(
                reply.text.ends_with("invalid number of arguments"),
                "{text}: {}",
                reply.text
            );
        }

        assert_eq!(run(&data, "portfolio").await.text, "```Balance: $0.00```");
    }

    #[tokio::test]
    async fn bad_numbers_are_rejected() {
        let data = data();

        assert_eq!(
            run(&data, "deposit lots").await.text,
            "Deposit failed: Invalid amount: LOTS"
        );
        assert_eq!(
            run(&data, "buy amd -3").await.text,
            "Buy failed: Invalid amount: -3"
        );
        assert_eq!(
            run(&data, "sell amd 0").await.text,
            "Sell failed: Invalid amount: share count must be at least 1"
        );
    }

    #[tokio::test]
    async fn group_lists_are_isolated_from_user_lists() {
        let data = data();
        run(&data, "watch #proj amd").await;

        let reply = run(&data, "list").await;
        assert_eq!(reply.text, "Print failed: No List");

        // another user in the same team sees the shared list
        let other = process(&data, "list #PROJ", &identity("someone-else")).await;
        assert_eq!(other.response_type, Visibility::InChannel);
        assert!(other.text.contains("AMD"));
    }

    #[tokio::test]
    async fn group_lists_need_a_team() {
        let data = data();
        let mut id = identity("test");
        id.team_id = None;

        let reply = process(&data, "watch #proj amd", &id).await;
        assert_eq!(reply.text, "Add failed: Shared lists need a team id");
    }

    #[tokio::test]
    async fn unknown_statistic_is_reported() {
        let data = data();
        let reply = run(&data, "stats amd wingspan").await;

        assert_eq!(reply.response_type, Visibility::Ephemeral);
        assert_eq!(reply.text, "Stats failed: Unknown statistic: WINGSPAN");
    }

    #[tokio::test]
    async fn stats_filter_keeps_only_named_fields() {
        let data = data();
        let reply = run(&data, "stats amd beta").await;

        assert!(reply.text.contains("beta"));
        assert!(!reply.text.contains("marketcap"));
    }
}
