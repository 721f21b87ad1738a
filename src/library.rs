use crate::config::Settings;
use crate::error::{Error, Result};
use crate::indexer::{
    self, has_recipe_extension, to_webpath, webpath_for_filename, Recipe, SearchIndex,
    SearchResult, TagGroup, RECIPE_EXT,
};
use crate::watcher::RecipeWatcher;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// A directory of markdown recipes and the index built from it
pub struct RecipeLibrary {
    recipes_path: PathBuf,
    index: Arc<SearchIndex>,
}

/// Outcome of a bulk load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RecipeLibrary {
    /// Create a library over `settings.library.recipes_path` with an empty index
    pub fn open(settings: &Settings) -> Result<Self> {
        let index = SearchIndex::new(&settings.search)?;
        Ok(Self::with_index(
            settings.library.recipes_path.clone(),
            Arc::new(index),
        ))
    }

    pub fn with_index(recipes_path: PathBuf, index: Arc<SearchIndex>) -> Self {
        Self {
            recipes_path,
            index,
        }
    }

    pub fn recipes_path(&self) -> &Path {
        &self.recipes_path
    }

    pub fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    /// Index every recipe file in the directory.
    ///
    /// A file that cannot be read or converted is logged and counted; the
    /// rest of the directory still loads.
    pub fn load_all(&self) -> Result<LoadReport> {
        info!("Loading recipes from {:?}", self.recipes_path);

        let entries = fs::read_dir(&self.recipes_path).map_err(|source| Error::FileRead {
            path: self.recipes_path.clone(),
            source,
        })?;

        let mut report = LoadReport::default();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    report.failed += 1;
                    continue;
                }
            };

            let path = entry.path();
            match self.upsert_path(&path) {
                Ok(true) => report.loaded += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    warn!("Failed to load recipe {:?}: {}", path, e.log_safe());
                    report.failed += 1;
                }
            }
        }

        info!(
            "Recipe load complete: {} loaded, {} skipped, {} failed",
            report.loaded, report.skipped, report.failed
        );
        Ok(report)
    }

    /// Read and index the recipe at `path`.
    ///
    /// Returns `Ok(false)` when the path is not a recipe file.
    pub fn upsert_path(&self, path: &Path) -> Result<bool> {
        let metadata = fs::metadata(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let filename = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) if metadata.is_file() && has_recipe_extension(path) => name,
            _ => return Ok(false),
        };

        let raw = fs::read(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        self.upsert(filename, &raw)?;
        Ok(true)
    }

    /// Convert `raw` and replace the index entry for `filename`
    pub fn upsert(&self, filename: &str, raw: &[u8]) -> Result<()> {
        let document = indexer::load(filename, raw)?;
        self.index.upsert(&document)
    }

    /// Drop the entry for `filename`, keyed by the name alone
    pub fn delete(&self, filename: &str) -> Result<()> {
        self.index.delete(&webpath_for_filename(filename))
    }

    pub fn get_recipe(&self, webpath: &str) -> Result<Recipe> {
        self.index.get(webpath)
    }

    pub fn list_grouped_by_tag(&self) -> Result<Vec<TagGroup>> {
        indexer::list_grouped_by_tag(&self.index)
    }

    pub fn search_recipes(&self, query: &str) -> Result<Vec<SearchResult>> {
        indexer::search_recipes(&self.index, query)
    }

    /// Name and markdown source of an indexed recipe, for editing
    pub fn recipe_source(&self, webpath: &str) -> Result<(String, String)> {
        let recipe = self.get_recipe(webpath)?;
        let path = self.recipes_path.join(&recipe.filename);
        let markdown = fs::read_to_string(&path)
            .map_err(|source| Error::FileRead { path, source })?;
        Ok((recipe.name, markdown))
    }

    /// Write a recipe to disk and index it, returning its webpath.
    ///
    /// When `previous_filename` names a different file, that file is removed
    /// so the recipe is renamed rather than copied. The watcher will see the
    /// same writes and re-apply them; the repeated upsert is harmless.
    pub fn save_recipe(
        &self,
        name: &str,
        body: &str,
        previous_filename: Option<&str>,
    ) -> Result<String> {
        let name = Path::new(name)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| Error::Validation("Name is required".to_string()))?;

        let filename = format!("{name}{RECIPE_EXT}");
        fs::write(self.recipes_path.join(&filename), body)?;
        debug!("Wrote recipe file {}", filename);

        if let Some(previous) = previous_filename.filter(|previous| *previous != filename) {
            fs::remove_file(self.recipes_path.join(previous))?;
            self.delete(previous)?;
        }

        self.upsert(&filename, body.as_bytes())?;
        Ok(to_webpath(name))
    }

    /// Delete a recipe's file and its index entry.
    ///
    /// A file that is already gone still has its entry removed.
    pub fn remove_recipe(&self, webpath: &str) -> Result<()> {
        let recipe = self.get_recipe(webpath)?;
        match fs::remove_file(self.recipes_path.join(&recipe.filename)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Recipe file {} already removed", recipe.filename);
            }
            Err(e) => return Err(e.into()),
        }
        self.index.delete(webpath)?;
        info!("Removed recipe {}", recipe.filename);
        Ok(())
    }

    /// Start watching the recipes directory on a background thread
    pub fn watch(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        let watcher = RecipeWatcher::new(&self.recipes_path)?;
        watcher.spawn(Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn library(dir: &Path) -> RecipeLibrary {
        RecipeLibrary::open(&Settings::for_recipes(dir)).unwrap()
    }

    #[test]
    fn test_load_all_skips_other_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Bread.md"), "Flour and water.\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a recipe").unwrap();
        fs::create_dir(dir.path().join("drafts.md")).unwrap();

        let library = library(dir.path());
        let report = library.load_all().unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 0);
        assert!(library.get_recipe("Bread").is_ok());
    }

    #[test]
    fn test_load_all_continues_past_bad_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Bad.md"), [0xff, 0xfe, 0xfd]).unwrap();
        fs::write(dir.path().join("Good.md"), "Fine.\n").unwrap();

        let library = library(dir.path());
        let report = library.load_all().unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(report.failed, 1);
        assert!(library.get_recipe("Good").is_ok());
        assert!(library.get_recipe("Bad").unwrap_err().is_not_found());
    }

    #[test]
    fn test_load_all_missing_directory() {
        let dir = tempdir().unwrap();
        let library = library(&dir.path().join("missing"));
        assert!(matches!(
            library.load_all(),
            Err(Error::FileRead { .. })
        ));
    }

    #[test]
    fn test_failed_reload_keeps_previous_entry() {
        let dir = tempdir().unwrap();
        let library = library(dir.path());
        library.upsert("Bread.md", b"tags: baking\n\nRye.\n").unwrap();

        assert!(library.upsert("Bread.md", &[0xff, 0xfe]).is_err());

        let recipe = library.get_recipe("Bread").unwrap();
        assert!(recipe.html.contains("Rye."));
    }

    #[test]
    fn test_save_and_rename_recipe() {
        let dir = tempdir().unwrap();
        let library = library(dir.path());

        let webpath = library
            .save_recipe("apple pie", "tags: dessert\n\nBake.\n", None)
            .unwrap();
        assert_eq!(webpath, "ApplePie");
        assert!(dir.path().join("apple pie.md").exists());

        let webpath = library
            .save_recipe("Apple Tart", "tags: dessert\n\nBake thinner.\n", Some("apple pie.md"))
            .unwrap();
        assert_eq!(webpath, "AppleTart");
        assert!(!dir.path().join("apple pie.md").exists());
        assert!(library.get_recipe("ApplePie").unwrap_err().is_not_found());

        let (name, markdown) = library.recipe_source("AppleTart").unwrap();
        assert_eq!(name, "Apple Tart");
        assert_eq!(markdown, "tags: dessert\n\nBake thinner.\n");
    }

    #[test]
    fn test_save_recipe_requires_name() {
        let dir = tempdir().unwrap();
        let library = library(dir.path());
        assert!(matches!(
            library.save_recipe("", "body", None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            library.save_recipe("..", "body", None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_save_recipe_strips_directories() {
        let dir = tempdir().unwrap();
        let library = library(dir.path());
        let webpath = library.save_recipe("../../Soup", "Hot.\n", None).unwrap();
        assert_eq!(webpath, "Soup");
        assert!(dir.path().join("Soup.md").exists());
    }

    #[test]
    fn test_remove_recipe() {
        let dir = tempdir().unwrap();
        let library = library(dir.path());
        library.save_recipe("Bread", "Knead.\n", None).unwrap();

        library.remove_recipe("Bread").unwrap();

        assert!(!dir.path().join("Bread.md").exists());
        assert!(library.get_recipe("Bread").unwrap_err().is_not_found());
        assert!(library.remove_recipe("Bread").unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove_recipe_with_file_already_gone() {
        let dir = tempdir().unwrap();
        let library = library(dir.path());
        library.save_recipe("Bread", "Knead.\n", None).unwrap();
        fs::remove_file(dir.path().join("Bread.md")).unwrap();

        library.remove_recipe("Bread").unwrap();

        assert!(library.get_recipe("Bread").unwrap_err().is_not_found());
        assert_eq!(library.index().num_docs(), 0);
    }
}
