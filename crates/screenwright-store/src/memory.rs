//! In-memory store for tests and previews. Nothing survives the
//! process.

use std::collections::HashMap;

use uuid::Uuid;

use screenwright_buffer::{Block, TitlePage};

use crate::{ScreenplayStore, StoreError, StoreResult, StoredScreenplay};

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: HashMap<Uuid, StoredScreenplay>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl ScreenplayStore for MemoryStore {
    fn list(&self) -> StoreResult<Vec<StoredScreenplay>> {
        let mut docs: Vec<StoredScreenplay> = self.docs.values().cloned().collect();
        docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(docs)
    }

    fn get(&self, id: Uuid) -> StoreResult<StoredScreenplay> {
        self.docs.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn create(
        &mut self,
        title: &str,
        blocks: Vec<Block>,
        title_page: TitlePage,
    ) -> StoreResult<StoredScreenplay> {
        let doc = StoredScreenplay::new(title, blocks, title_page);
        self.docs.insert(doc.id, doc.clone());
        Ok(doc)
    }

    fn update(
        &mut self,
        id: Uuid,
        blocks: Vec<Block>,
        title_page: TitlePage,
    ) -> StoreResult<StoredScreenplay> {
        let doc = self.docs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        doc.blocks = blocks;
        doc.title_page = title_page;
        doc.updated_at = chrono::Utc::now();
        Ok(doc.clone())
    }

    fn delete(&mut self, id: Uuid) -> StoreResult<()> {
        self.docs
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
