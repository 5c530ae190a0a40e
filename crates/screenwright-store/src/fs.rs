//! File-backed store: `{root}/{uuid}.json`, one document per file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use screenwright_buffer::{Block, TitlePage};

use crate::{ScreenplayStore, StoreError, StoreResult, StoredScreenplay};

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn doc_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn read_doc(&self, path: &Path) -> StoreResult<StoredScreenplay> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Serializes to a sibling temp file, then renames over the target,
    /// so a crash mid-write never corrupts an existing document.
    fn write_doc(&self, doc: &StoredScreenplay) -> StoreResult<()> {
        let path = self.doc_path(doc.id);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        debug!(id = %doc.id, path = %path.display(), "wrote screenplay");
        Ok(())
    }
}

impl ScreenplayStore for FileStore {
    fn list(&self) -> StoreResult<Vec<StoredScreenplay>> {
        let mut docs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                docs.push(self.read_doc(&path)?);
            }
        }
        docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(docs)
    }

    fn get(&self, id: Uuid) -> StoreResult<StoredScreenplay> {
        let path = self.doc_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id));
        }
        self.read_doc(&path)
    }

    fn create(
        &mut self,
        title: &str,
        blocks: Vec<Block>,
        title_page: TitlePage,
    ) -> StoreResult<StoredScreenplay> {
        let doc = StoredScreenplay::new(title, blocks, title_page);
        self.write_doc(&doc)?;
        Ok(doc)
    }

    fn update(
        &mut self,
        id: Uuid,
        blocks: Vec<Block>,
        title_page: TitlePage,
    ) -> StoreResult<StoredScreenplay> {
        let mut doc = self.get(id)?;
        doc.blocks = blocks;
        doc.title_page = title_page;
        doc.updated_at = chrono::Utc::now();
        self.write_doc(&doc)?;
        Ok(doc)
    }

    fn delete(&mut self, id: Uuid) -> StoreResult<()> {
        let path = self.doc_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}
