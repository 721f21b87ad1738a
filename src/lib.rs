pub mod config;
pub mod error;

// Markdown conversion and tag extraction
pub mod markdown;

// Loading, indexing and querying
pub mod indexer;

// Directory watching
pub mod watcher;

// Facade over the index and the recipes directory
pub mod library;

// Command line
pub mod cli;

// Utilities
pub mod utils;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
pub use indexer::{to_webpath, RecipeDocument, SearchIndex, SearchResult, TagGroup};
pub use library::{LoadReport, RecipeLibrary};
