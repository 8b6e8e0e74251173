use std::{
    collections::{BTreeSet, HashMap},
    sync::Mutex,
};

use anyhow::{Error, Result};
use async_trait::async_trait;

/// String-keyed storage holding watch lists as sets and accounts as blobs.
///
/// Each call is an independent round-trip; nothing here is transactional.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set_add(&self, key: &str, members: &[String]) -> Result<()>;

    /// Members that are not in the set are ignored.
    async fn set_remove(&self, key: &str, members: &[String]) -> Result<()>;

    /// Empty when the key does not exist.
    async fn set_members(&self, key: &str) -> Result<Vec<String>>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug)]
enum Entry {
    Set(BTreeSet<String>),
    Value(String),
}

/// In-process store for tests and for running without Redis.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, Entry>) -> Result<T>,
    ) -> Result<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::msg("memory store lock poisoned"))?;
        f(&mut *entries)
    }
}

fn wrong_type(key: &str) -> Error {
    anyhow::anyhow!("WRONGTYPE operation against key {key} holding the wrong kind of value")
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_add(&self, key: &str, members: &[String]) -> Result<()> {
        self.with_entries(|entries| {
            match entries
                .entry(key.to_string())
                .or_insert_with(|| Entry::Set(BTreeSet::new()))
            {
                Entry::Set(set) => {
                    set.extend(members.iter().cloned());
                    Ok(())
                }
                Entry::Value(_) => Err(wrong_type(key)),
            }
        })
    }

    async fn set_remove(&self, key: &str, members: &[String]) -> Result<()> {
        self.with_entries(|entries| {
            let Some(entry) = entries.get_mut(key) else {
                return Ok(());
            };
            let Entry::Set(set) = entry else {
                return Err(wrong_type(key));
            };

            for member in members {
                set.remove(member);
            }
            if set.is_empty() {
                entries.remove(key);
            }
            Ok(())
        })
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        self.with_entries(|entries| match entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(Entry::Value(_)) => Err(wrong_type(key)),
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.remove(key);
            Ok(())
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_entries(|entries| match entries.get(key) {
            None => Ok(None),
            Some(Entry::Value(value)) => Ok(Some(value.clone())),
            Some(Entry::Set(_)) => Err(wrong_type(key)),
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), Entry::Value(value.to_string()));
            Ok(())
        })
    }
}
