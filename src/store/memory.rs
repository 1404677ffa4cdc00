//! In-memory counter store.
//!
//! Single-node stand-in for redis with the same atomicity guarantees,
//! provided by `DashMap`'s per-entry locking. Expiry is lazy: entries are
//! checked against their deadline on access and reset when stale.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{KvStore, StoreError};

#[derive(Debug, Clone)]
enum Value {
    Counter(u64),
    Str(String),
    Sorted(Vec<(i64, String)>),
    List(Vec<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// DashMap-backed [`KvStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn incr(&self, key: &str) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: Value::Counter(0),
            expires_at: None,
        });
        if entry.is_expired(now) {
            entry.value = Value::Counter(0);
            entry.expires_at = None;
        }
        let next = match entry.value {
            Value::Counter(n) => n + 1,
            // INCR on a non-counter key restarts it, matching a fresh window
            _ => 1,
        };
        entry.value = Value::Counter(next);
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Ok(match &entry.value {
                Value::Str(s) => Some(s.clone()),
                Value::Counter(n) => Some(n.to_string()),
                _ => None,
            }),
            _ => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: Value::Sorted(Vec::new()),
            expires_at: None,
        });
        if entry.is_expired(now) {
            entry.value = Value::Sorted(Vec::new());
            entry.expires_at = None;
        }
        match &mut entry.value {
            Value::Sorted(members) => members.push((score, member.to_string())),
            other => *other = Value::Sorted(vec![(score, member.to_string())]),
        }
        Ok(())
    }

    async fn zcount(&self, key: &str, min: i64, max: i64) -> Result<u64, StoreError> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => match &entry.value {
                Value::Sorted(members) => Ok(members
                    .iter()
                    .filter(|(score, _)| (min..=max).contains(score))
                    .count() as u64),
                _ => Ok(0),
            },
            _ => Ok(0),
        }
    }

    async fn lpush_trim(&self, key: &str, value: &str, keep: usize) -> Result<(), StoreError> {
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: Value::List(Vec::new()),
            expires_at: None,
        });
        match &mut entry.value {
            Value::List(items) => {
                items.insert(0, value.to_string());
                items.truncate(keep);
            }
            other => *other = Value::List(vec![value.to_string()]),
        }
        Ok(())
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, StoreError> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => match &entry.value {
                Value::List(items) if !items.is_empty() => {
                    let len = items.len() as isize;
                    let adjust = |i: isize| if i < 0 { len + i } else { i };
                    let start = adjust(start).max(0);
                    let stop = adjust(stop).min(len - 1);
                    if start > stop {
                        Ok(Vec::new())
                    } else {
                        Ok(items[start as usize..=stop as usize].to_vec())
                    }
                }
                _ => Ok(Vec::new()),
            },
            _ => Ok(Vec::new()),
        }
    }
}
