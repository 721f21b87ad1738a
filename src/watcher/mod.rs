// Recipe directory watcher
// Filesystem events are applied to the index one at a time, in arrival
// order, on a dedicated thread

pub mod events;

pub use events::{changes_for, FileChange};

use crate::error::{Error, Result};
use crate::indexer::has_recipe_extension;
use crate::library::RecipeLibrary;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// A registered watch on the recipes directory
pub struct RecipeWatcher {
    path: PathBuf,
    // Keeps the registration (and the sending half of the channel) alive
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
}

impl RecipeWatcher {
    /// Register a watch on `path`.
    ///
    /// Failure here is fatal for the caller: without the watch the index
    /// can drift from the directory unnoticed.
    pub fn new(path: &Path) -> Result<Self> {
        let registration_error = |e: notify::Error| Error::WatchRegistration {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(tx, Config::default()).map_err(registration_error)?;
        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(registration_error)?;

        info!("Watching recipes directory: {:?}", path);

        Ok(Self {
            path: path.to_path_buf(),
            _watcher: watcher,
            events: rx,
        })
    }

    /// Process events until the channel closes
    pub fn run(self, library: &RecipeLibrary) {
        process_events(library, self.events.iter());
        info!("Recipe watcher for {:?} stopped", self.path);
    }

    /// Run the event loop on its own thread
    pub fn spawn(self, library: Arc<RecipeLibrary>) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("recipe-watcher".to_string())
            .spawn(move || self.run(&library))?;
        Ok(handle)
    }
}

/// Apply a sequence of watch events to the library, strictly in order
pub fn process_events<I>(library: &RecipeLibrary, events: I)
where
    I: IntoIterator<Item = notify::Result<Event>>,
{
    for res in events {
        match res {
            Ok(event) => {
                debug!("Event: {:?}", event);
                for change in changes_for(&event) {
                    apply_change(library, &change);
                }
            }
            Err(e) => error!("Watch error: {}", e),
        }
    }
}

/// Apply one change. Failures are logged and the index keeps its prior state.
pub fn apply_change(library: &RecipeLibrary, change: &FileChange) {
    let path = change.path();
    if !has_recipe_extension(path) {
        return;
    }

    match change {
        FileChange::Upsert(path) => match library.upsert_path(path) {
            Ok(true) => info!("Indexed recipe {:?}", path),
            Ok(false) => debug!("Skipped non-recipe path {:?}", path),
            Err(e) => warn!("Failed to index {:?}: {}", path, e),
        },
        FileChange::Remove(path) => {
            let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
                return;
            };
            match library.delete(filename) {
                Ok(()) => info!("Removed recipe {:?}", path),
                Err(e) => warn!("Failed to remove {:?} from index: {}", path, e),
            }
        }
    }
}
