//! # Screenwright Store
//!
//! Persistence for whole screenplay documents behind the
//! [`ScreenplayStore`] trait, so the editor never touches a storage
//! backend directly.
//!
//! Implementations:
//! - [`fs::FileStore`]: one pretty-printed JSON file per screenplay,
//!   named by its id, written atomically.
//! - [`memory::MemoryStore`]: in-memory map for tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use screenwright_buffer::{Block, TitlePage};

pub mod fs;
pub mod memory;

/// A persisted screenplay document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredScreenplay {
    pub id: Uuid,
    pub title: String,
    pub title_page: TitlePage,
    pub blocks: Vec<Block>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredScreenplay {
    /// Builds a fresh document with a new id and current timestamps.
    pub fn new(title: impl Into<String>, blocks: Vec<Block>, title_page: TitlePage) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            title_page,
            blocks,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Abstract interface for screenplay persistence.
pub trait ScreenplayStore {
    /// All stored screenplays, newest first.
    fn list(&self) -> StoreResult<Vec<StoredScreenplay>>;

    /// One screenplay by id.
    fn get(&self, id: Uuid) -> StoreResult<StoredScreenplay>;

    /// Persists a new screenplay and returns it with its assigned id.
    fn create(
        &mut self,
        title: &str,
        blocks: Vec<Block>,
        title_page: TitlePage,
    ) -> StoreResult<StoredScreenplay>;

    /// Replaces the content of an existing screenplay, bumping its
    /// `updated_at`.
    fn update(
        &mut self,
        id: Uuid,
        blocks: Vec<Block>,
        title_page: TitlePage,
    ) -> StoreResult<StoredScreenplay>;

    /// Deletes a screenplay permanently.
    fn delete(&mut self, id: Uuid) -> StoreResult<()>;
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors distinguishing "not found" from every other failure, per the
/// editor's error contract.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Screenplay not found: {0}")]
    NotFound(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    /// True iff this is the "not found" case callers may recover from
    /// differently.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
