use anyhow::Result;

use super::{CommandError, fenced};
use crate::{Data, identity::Identity};

/// Resolve which list a command targets. A leading `#name` selects the
/// team's shared list of that name and is consumed; otherwise the user's
/// own list is used.
fn list_target<'a>(args: &'a [String], identity: &Identity) -> Result<(String, &'a [String])> {
    match args.split_first() {
        Some((first, rest)) if first.starts_with('#') => {
            let name = &first[1..];
            if name.is_empty() {
                return Err(CommandError::EmptyListName.into());
            }
            let key = identity
                .group_list_key(name)
                .ok_or(CommandError::MissingTeam)?;
            Ok((key, rest))
        }
        _ => Ok((identity.list_key(), args)),
    }
}

pub(super) async fn watch(data: &Data, args: &[String], identity: &Identity) -> Result<String> {
    let (key, tickers) = list_target(args, identity)?;
    if tickers.is_empty() {
        return Err(CommandError::InvalidArguments.into());
    }

    data.desk.add(tickers, &key).await?;
    Ok("Added".to_string())
}

pub(super) async fn list(data: &Data, args: &[String], identity: &Identity) -> Result<String> {
    let (key, rest) = list_target(args, identity)?;
    if !rest.is_empty() {
        return Err(CommandError::InvalidArguments.into());
    }

    let list = data.desk.print(&key).await?;
    Ok(fenced(list))
}

pub(super) async fn unwatch(data: &Data, args: &[String], identity: &Identity) -> Result<String> {
    let (key, tickers) = list_target(args, identity)?;
    if tickers.is_empty() {
        return Err(CommandError::InvalidArguments.into());
    }

    data.desk.remove(tickers, &key).await?;
    Ok("Removed".to_string())
}

pub(super) async fn clear(data: &Data, args: &[String], identity: &Identity) -> Result<String> {
    let (key, rest) = list_target(args, identity)?;
    if !rest.is_empty() {
        return Err(CommandError::InvalidArguments.into());
    }

    data.desk.clear(&key).await?;
    Ok("Removed".to_string())
}
