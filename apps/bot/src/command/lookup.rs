use anyhow::Result;
use stock::{NOTHING_HERE, chart_link};

use super::{CommandError, exact, fenced};
use crate::Data;

/// Quote table for the given tickers. A single ticker also gets a chart link.
pub(super) async fn quote(data: &Data, tickers: &[String]) -> Result<String> {
    let list = data.desk.quotes(tickers).await?;

    let mut text = fenced(list);
    if let [ticker] = tickers {
        text.push('\n');
        text.push_str(&chart_link(ticker));
    }
    Ok(text)
}

pub(super) async fn info(data: &Data, args: &[String]) -> Result<String> {
    let [ticker] = exact::<1>(args)?;

    let company = data.desk.info(ticker).await?;
    Ok(company.lines().join("\n"))
}

pub(super) async fn news(data: &Data, args: &[String]) -> Result<String> {
    let [ticker] = exact::<1>(args)?;

    let news = data.desk.news(ticker).await?;
    if news.is_empty() {
        return Ok(NOTHING_HERE.to_string());
    }
    Ok(news.join("\n\n"))
}

/// `stats [ticker] [names...]`
pub(super) async fn stats(data: &Data, args: &[String]) -> Result<String> {
    let Some((ticker, names)) = args.split_first() else {
        return Err(CommandError::InvalidArguments.into());
    };

    let stats = data.desk.stats(ticker).await?;
    let view = stats.select(names)?;
    Ok(fenced(view))
}
