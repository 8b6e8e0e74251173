use anyhow::Result;

use super::{CommandError, exact, fenced, parse_count};
use crate::{Data, identity::Identity};

pub(super) async fn deposit(data: &Data, args: &[String], identity: &Identity) -> Result<String> {
    let [amount] = exact::<1>(args)?;
    let amount = parse_count(amount)?;

    let acct = data.desk.deposit(amount, &identity.account_key()).await?;
    Ok(format!("New Balance: {}", acct.balance))
}

pub(super) async fn reset(data: &Data, args: &[String], identity: &Identity) -> Result<String> {
    exact::<0>(args)?;

    data.desk.clear(&identity.account_key()).await?;
    Ok("New Balance: 0".to_string())
}

pub(super) async fn portfolio(data: &Data, args: &[String], identity: &Identity) -> Result<String> {
    exact::<0>(args)?;

    let acct = data.desk.portfolio(&identity.account_key()).await?;
    let acct = data.desk.latest(acct).await?;
    Ok(fenced(acct))
}

pub(super) async fn buy(data: &Data, args: &[String], identity: &Identity) -> Result<String> {
    let (ticker, shares) = trade(args)?;

    data.desk
        .buy(ticker, shares, &identity.account_key())
        .await?;
    Ok("Done".to_string())
}

pub(super) async fn sell(data: &Data, args: &[String], identity: &Identity) -> Result<String> {
    let (ticker, shares) = trade(args)?;

    data.desk
        .sell(ticker, shares, &identity.account_key())
        .await?;
    Ok("Done".to_string())
}

/// `[ticker] [shares]` with at least one share.
fn trade(args: &[String]) -> Result<(&str, u64), CommandError> {
    let [ticker, shares] = exact::<2>(args)?;
    let shares = parse_count(shares)?;
    if shares == 0 {
        return Err(CommandError::ZeroShares);
    }

    Ok((ticker.as_str(), shares))
}
