use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Bad request: missing {0}")]
    MissingField(&'static str),

    #[error("Bad request: empty command text")]
    EmptyText,
}

/// Who sent a slash command. Storage keys are derived from these fields only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub token: String,
    pub user_id: String,
    pub team_id: Option<String>,
}

impl Identity {
    /// Key of the user's play-money account.
    pub fn account_key(&self) -> String {
        format!("acct:{}:{}", self.token, self.user_id)
    }

    /// Key of the user's private watch list.
    pub fn list_key(&self) -> String {
        format!("list:{}:{}", self.token, self.user_id)
    }

    /// Key of a watch list shared by name within the team. `None` without a
    /// team id.
    ///
    /// The name goes last so that any name maps to a distinct key.
    pub fn group_list_key(&self, name: &str) -> Option<String> {
        let team = self.team_id.as_deref()?;
        Some(format!(
            "list:{}:{}:#{}",
            self.token,
            team,
            name.to_lowercase()
        ))
    }
}

/// The fields of an inbound slash command this service uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashRequest {
    pub text: String,
    pub identity: Identity,
}

impl SlashRequest {
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, RequestError> {
        let field = |name: &'static str| {
            fields
                .get(name)
                .cloned()
                .ok_or(RequestError::MissingField(name))
        };

        let text = field("text")?;
        if text.trim().is_empty() {
            return Err(RequestError::EmptyText);
        }

        Ok(Self {
            text,
            identity: Identity {
                token: field("token")?,
                user_id: field("user_id")?,
                team_id: fields.get("team_id").filter(|t| !t.is_empty()).cloned(),
            },
        })
    }
}
