//! Local JSON catalog
//!
//! Reads `{dir}/{source}.json`, a JSON array of items. Useful for kiosks
//! that sync their content out of band, and for demos without a backend.

use super::{CatalogProvider, FetchError};
use crate::queue::Item;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct DirectoryCatalog {
    dir: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, source: &str) -> Result<PathBuf, FetchError> {
        let invalid = source.is_empty()
            || source.contains(['/', '\\'])
            || source.starts_with('.');
        if invalid {
            return Err(FetchError::NotFound(format!(
                "invalid source name '{}'",
                source
            )));
        }
        Ok(self.dir.join(format!("{}.json", source)))
    }
}

#[async_trait]
impl CatalogProvider for DirectoryCatalog {
    fn name(&self) -> &str {
        "directory"
    }

    async fn fetch_queue(&self, source: &str) -> Result<Vec<Item>, FetchError> {
        let path = self.path_for(source)?;
        debug!("Reading catalog file {}", path.display());

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(FetchError::Network(format!("{}: {}", path.display(), e))),
        };

        serde_json::from_str(&content)
            .map_err(|e| FetchError::Parse(format!("{}: {}", path.display(), e)))
    }
}
