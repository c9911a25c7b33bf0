//! # Document Store
//!
//! Whole JSON documents grouped into collections, plus unique string indexes.
//!
//! ## Collections
//!
//! - `users`: user id -> user
//! - `profiles`: owner user id -> profile, so at most one profile per user
//! - `posts`: post id -> post, likes and comments embedded
//!
//! ## Indexes
//!
//! - `users:email`: normalized email -> user id, claimed atomically on registration
//!
//! ## Versions
//!
//! Every stored document has a version kept next to it by the backend. A write
//! names the version it was read at and only lands if that is still current,
//! so two writers racing on the same post cannot silently drop each other's
//! likes or comments. The loser gets [`StoreError::Conflict`].
//!
//! ## Backends
//!
//! - Redis: one hash per collection and a sibling `<collection>:version` hash,
//!   compare-and-set done in a Lua script
//! - Memory: maps behind a tokio `RwLock`, for tests and local runs
use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use async_trait::async_trait;
use models::{Post, Profile, User};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryBackend;
pub use redis_store::{RedisBackend, init_redis};

pub const EMAIL_INDEX: &str = "users:email";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document was modified since it was read")]
    Conflict,

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Corrupt document: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub version: u64,
    pub body: String,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Record>, StoreError>;

    async fn values(&self, collection: &str) -> Result<Vec<String>, StoreError>;

    /// Writes `body` if the stored version equals `expected` (0 when absent).
    /// Returns `false` without writing otherwise.
    async fn put(
        &self,
        collection: &str,
        key: &str,
        expected: u64,
        body: String,
    ) -> Result<bool, StoreError>;

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError>;

    /// Sets `key` in `index` only if absent.
    async fn claim(&self, index: &str, key: &str, value: &str) -> Result<bool, StoreError>;

    async fn lookup(&self, index: &str, key: &str) -> Result<Option<String>, StoreError>;

    async fn release(&self, index: &str, key: &str) -> Result<(), StoreError>;

    /// Drops every entry of `index` that maps to `value`, returning how many.
    async fn release_value(&self, index: &str, value: &str) -> Result<u64, StoreError>;
}

pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn key(&self) -> String;
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Document for Profile {
    const COLLECTION: &'static str = "profiles";

    fn key(&self) -> String {
        self.user.to_string()
    }
}

impl Document for Post {
    const COLLECTION: &'static str = "posts";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// A document together with the version it was read at.
#[derive(Debug)]
pub struct Versioned<T> {
    doc: T,
    version: u64,
}

impl<T> Versioned<T> {
    /// A document that has never been stored.
    pub fn new(doc: T) -> Self {
        Self { doc, version: 0 }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn into_inner(self) -> T {
        self.doc
    }
}

impl<T> Deref for Versioned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.doc
    }
}

impl<T> DerefMut for Versioned<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.doc
    }
}

#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn Backend>,
}

impl Database {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    pub async fn find<T: Document>(&self, key: &str) -> Result<Option<Versioned<T>>, StoreError> {
        match self.backend.get(T::COLLECTION, key).await? {
            Some(record) => Ok(Some(Versioned {
                doc: serde_json::from_str(&record.body)?,
                version: record.version,
            })),
            None => Ok(None),
        }
    }

    pub async fn all<T: Document>(&self) -> Result<Vec<T>, StoreError> {
        self.backend
            .values(T::COLLECTION)
            .await?
            .iter()
            .map(|body| serde_json::from_str(body).map_err(StoreError::from))
            .collect()
    }

    /// Stores `doc`, failing with [`StoreError::Conflict`] if someone else wrote
    /// it after it was read. On success `doc` carries the new version.
    pub async fn save<T: Document>(&self, doc: &mut Versioned<T>) -> Result<(), StoreError> {
        let body = serde_json::to_string(&doc.doc)?;

        if !self
            .backend
            .put(T::COLLECTION, &doc.key(), doc.version, body)
            .await?
        {
            return Err(StoreError::Conflict);
        }

        doc.version += 1;
        Ok(())
    }

    pub async fn remove<T: Document>(&self, key: &str) -> Result<bool, StoreError> {
        self.backend.delete(T::COLLECTION, key).await
    }

    pub async fn claim(&self, index: &str, key: &str, value: &str) -> Result<bool, StoreError> {
        self.backend.claim(index, key, value).await
    }

    pub async fn lookup(&self, index: &str, key: &str) -> Result<Option<String>, StoreError> {
        self.backend.lookup(index, key).await
    }

    pub async fn release(&self, index: &str, key: &str) -> Result<(), StoreError> {
        self.backend.release(index, key).await
    }

    pub async fn release_value(&self, index: &str, value: &str) -> Result<u64, StoreError> {
        self.backend.release_value(index, value).await
    }
}
