//! # Screenwright Export
//!
//! Pagination of a screenplay block sequence into fixed-size pages and
//! rendering of those pages as a text-only PDF.

pub mod layout;
pub mod pdf;

pub use layout::{paginate, DrawInstruction, Page, PageLine};
pub use pdf::{render, write_pdf};

use std::path::PathBuf;

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while exporting
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
