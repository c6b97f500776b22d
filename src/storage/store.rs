//! Persistence boundary for map documents and the map index.

use std::fmt;
use std::future::Future;
use std::io;

use crate::models::document::{MapDocument, MapSummary};

#[derive(Debug)]
pub enum StoreError {
    /// The requested map or file does not exist.
    NotFound(String),
    Io(io::Error),
    Parse(String),
    /// The store understood the request but could not complete it.
    Failed(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "not found: {what}"),
            StoreError::Io(e) => write!(f, "io error: {e}"),
            StoreError::Parse(e) => write!(f, "parse error: {e}"),
            StoreError::Failed(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Where map documents and the TOML index live. Paths are store-relative
/// strings because that is how the index records them.
pub trait MapStore: Send + Sync {
    /// Looks a map up in the index by id.
    fn map_summary(&self, id: i64)
    -> impl Future<Output = Result<MapSummary, StoreError>> + Send;

    fn read_document(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<MapDocument, StoreError>> + Send;

    /// On success returns a confirmation line for the log.
    fn write_document(
        &self,
        path: &str,
        document: &MapDocument,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    fn rename_document(
        &self,
        old_path: &str,
        new_path: &str,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Replaces the index entry with the same id as `summary`.
    fn update_summary(
        &self,
        summary: &MapSummary,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;
}
