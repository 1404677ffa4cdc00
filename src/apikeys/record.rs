//! API key records and their document store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::store::StoreError;

/// Prefix identifying platform-issued keys.
pub const KEY_PREFIX: &str = "nuro_";

const KEY_RANDOM_LEN: usize = 32;

/// A stored API key.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRecord {
    pub id: String,
    pub key: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    pub is_active: bool,
}

impl ApiKeyRecord {
    /// Mint a fresh active key owned by the given principal.
    pub fn new(name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            key: generate_key(),
            name: name.into(),
            owner_id: owner_id.into(),
            created_at: now,
            last_used: now,
            is_active: true,
        }
    }
}

fn generate_key() -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{KEY_PREFIX}{random}")
}

/// Document store for API key records.
///
/// The production deployment backs this with the platform's document
/// database; the gatekeeper only needs exact-key lookup and owner-scoped
/// mutation.
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn insert(&self, record: ApiKeyRecord) -> Result<(), StoreError>;

    /// Exact key match, active records only.
    async fn find_active(&self, key: &str) -> Result<Option<ApiKeyRecord>, StoreError>;

    /// Update `last_used` for the record with this key value.
    async fn touch_last_used(&self, key: &str, when: DateTime<Utc>) -> Result<(), StoreError>;

    /// All of an owner's keys, newest first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ApiKeyRecord>, StoreError>;

    /// Rename an owned record; `None` if no such record belongs to the owner.
    async fn rename(
        &self,
        id: &str,
        owner_id: &str,
        name: &str,
    ) -> Result<Option<ApiKeyRecord>, StoreError>;

    /// Delete an owned record; false if no such record belongs to the owner.
    async fn delete(&self, id: &str, owner_id: &str) -> Result<bool, StoreError>;
}

/// In-process [`KeyStore`] for tests and single-node deployments.
#[derive(Default)]
pub struct MemoryKeyStore {
    records: DashMap<String, ApiKeyRecord>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn insert(&self, record: ApiKeyRecord) -> Result<(), StoreError> {
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn find_active(&self, key: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .find(|entry| entry.key == key && entry.is_active)
            .map(|entry| entry.value().clone()))
    }

    async fn touch_last_used(&self, key: &str, when: DateTime<Utc>) -> Result<(), StoreError> {
        for mut entry in self.records.iter_mut() {
            if entry.key == key {
                entry.last_used = when;
                break;
            }
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ApiKeyRecord>, StoreError> {
        let mut keys: Vec<ApiKeyRecord> = self
            .records
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(keys)
    }

    async fn rename(
        &self,
        id: &str,
        owner_id: &str,
        name: &str,
    ) -> Result<Option<ApiKeyRecord>, StoreError> {
        match self.records.get_mut(id) {
            Some(mut entry) if entry.owner_id == owner_id => {
                entry.name = name.to_string();
                Ok(Some(entry.value().clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: &str, owner_id: &str) -> Result<bool, StoreError> {
        let owned = self
            .records
            .get(id)
            .is_some_and(|entry| entry.owner_id == owner_id);
        if owned {
            self.records.remove(id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_have_the_platform_prefix() {
        let record = ApiKeyRecord::new("Default Key", "alice@example.com");
        assert!(record.key.starts_with(KEY_PREFIX));
        assert_eq!(record.key.len(), KEY_PREFIX.len() + KEY_RANDOM_LEN);
        assert!(record.is_active);
    }

    #[tokio::test]
    async fn find_active_skips_inactive_records() {
        let store = MemoryKeyStore::new();
        let mut record = ApiKeyRecord::new("k", "alice");
        record.is_active = false;
        let key = record.key.clone();
        store.insert(record).await.unwrap();

        assert!(store.find_active(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_is_owner_scoped_and_newest_first() {
        let store = MemoryKeyStore::new();
        let mut first = ApiKeyRecord::new("first", "alice");
        first.created_at = Utc::now() - chrono::Duration::hours(1);
        store.insert(first).await.unwrap();
        store.insert(ApiKeyRecord::new("second", "alice")).await.unwrap();
        store.insert(ApiKeyRecord::new("other", "bob")).await.unwrap();

        let keys = store.list_by_owner("alice").await.unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].name, "second");
        assert_eq!(keys[1].name, "first");
    }

    #[tokio::test]
    async fn mutation_requires_ownership() {
        let store = MemoryKeyStore::new();
        let record = ApiKeyRecord::new("k", "alice");
        let id = record.id.clone();
        store.insert(record).await.unwrap();

        assert!(store.rename(&id, "bob", "stolen").await.unwrap().is_none());
        assert!(!store.delete(&id, "bob").await.unwrap());
        assert!(store.delete(&id, "alice").await.unwrap());
    }
}
