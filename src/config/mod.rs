use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Smallest writer budget tantivy accepts for a single indexing thread.
pub const MIN_WRITER_MEMORY: usize = 15_000_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub library: LibraryConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub recipes_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub snippet_max_chars: usize,
    pub writer_memory_bytes: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            snippet_max_chars: 200,
            writer_memory_bytes: 50_000_000,
        }
    }
}

impl Settings {
    /// Settings for a recipe directory with default search tuning
    pub fn for_recipes(recipes_path: impl Into<PathBuf>) -> Self {
        Self {
            library: LibraryConfig {
                recipes_path: recipes_path.into(),
            },
            search: SearchConfig::default(),
        }
    }

    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let recipes_path = std::env::var("RECIPES_PATH")
            .unwrap_or_else(|_| "./recipes".to_string())
            .into();

        let snippet_max_chars = std::env::var("SNIPPET_MAX_CHARS")
            .unwrap_or_else(|_| "200".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid SNIPPET_MAX_CHARS value".to_string()))?;

        let writer_memory_bytes = std::env::var("INDEX_WRITER_MEMORY")
            .unwrap_or_else(|_| "50000000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid INDEX_WRITER_MEMORY value".to_string()))?;

        Ok(Settings {
            library: LibraryConfig { recipes_path },
            search: SearchConfig {
                snippet_max_chars,
                writer_memory_bytes,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.snippet_max_chars == 0 {
            return Err(Error::Config(
                "Snippet size must be non-zero".to_string(),
            ));
        }

        if self.search.writer_memory_bytes < MIN_WRITER_MEMORY {
            return Err(Error::Config(format!(
                "Index writer memory must be at least {MIN_WRITER_MEMORY} bytes"
            )));
        }

        Ok(())
    }
}
