use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::indexer::recipe::RecipeDocument;
use crate::indexer::schema::RecipeSchema;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tantivy::collector::{DocSetCollector, TopDocs};
use tantivy::query::{AllQuery, QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, OwnedValue};
use tantivy::snippet::{Snippet, SnippetGenerator};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info, warn};

/// In-memory full-text index of recipes, keyed by webpath.
///
/// Writes are serialized through a single writer; every write commits and
/// reloads the reader before the lock is released, so readers always see
/// whole documents.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    schema: RecipeSchema,
    snippet_max_chars: usize,
}

/// The stored parts of a recipe needed to display it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub filename: String,
    pub name: String,
    pub html: String,
}

/// The stored parts of a recipe needed for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecipe {
    pub filename: String,
    pub name: String,
    pub webpath: String,
    pub tags: Vec<String>,
}

/// A ranked match with highlighted fragments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub filename: String,
    pub name: String,
    pub webpath: String,
    pub name_fragment: Option<String>,
    pub body_fragment: Option<String>,
    pub score: f32,
}

impl SearchIndex {
    /// Create an empty in-memory index
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let schema = RecipeSchema::new();
        let index = Index::create_in_ram(schema.schema.clone());
        schema.register_tokenizers(&index);

        let writer: IndexWriter = index
            .writer(config.writer_memory_bytes)
            .map_err(|e| Error::IndexWrite(format!("Failed to create writer: {e}")))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::Search(format!("Failed to create reader: {e}")))?;

        info!("Search index initialized in memory");

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            schema,
            snippet_max_chars: config.snippet_max_chars,
        })
    }

    /// Replace the entry stored under `recipe.webpath`
    pub fn upsert(&self, recipe: &RecipeDocument) -> Result<()> {
        debug!("Indexing recipe: {}", recipe.webpath);

        let mut document = doc!(
            self.schema.filename => recipe.filename.clone(),
            self.schema.webpath => recipe.webpath.clone(),
            self.schema.html => recipe.html.clone(),
            self.schema.name => recipe.name.clone(),
            self.schema.body => recipe.searchable_text.clone(),
        );
        for tag in &recipe.tags {
            document.add_text(self.schema.tags, tag);
        }

        let mut writer = self.writer.lock();
        writer.delete_term(self.webpath_term(&recipe.webpath));
        if let Err(e) = writer.add_document(document) {
            discard_pending(&mut writer);
            return Err(Error::IndexWrite(format!(
                "Failed to add {}: {e}",
                recipe.webpath
            )));
        }
        self.commit(&mut writer)
    }

    /// Remove the entry stored under `webpath`, if any
    pub fn delete(&self, webpath: &str) -> Result<()> {
        debug!("Removing recipe from index: {}", webpath);

        let mut writer = self.writer.lock();
        writer.delete_term(self.webpath_term(webpath));
        self.commit(&mut writer)
    }

    /// Look up a recipe by webpath
    pub fn get(&self, webpath: &str) -> Result<Recipe> {
        let searcher = self.reader.searcher();
        let query = TermQuery::new(self.webpath_term(webpath), IndexRecordOption::Basic);

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(|e| Error::Search(format!("Lookup failed: {e}")))?;

        let (_, address) = top_docs
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("recipe {webpath}")))?;

        let doc: TantivyDocument = searcher
            .doc(address)
            .map_err(|e| Error::Search(format!("Failed to load document: {e}")))?;

        Ok(Recipe {
            filename: text_of(&doc, self.schema.filename),
            name: text_of(&doc, self.schema.name),
            html: text_of(&doc, self.schema.html),
        })
    }

    /// Every indexed recipe, ordered by webpath
    pub fn list_all(&self) -> Result<Vec<StoredRecipe>> {
        let searcher = self.reader.searcher();

        let addresses = searcher
            .search(&AllQuery, &DocSetCollector)
            .map_err(|e| Error::Search(format!("Listing failed: {e}")))?;

        let mut recipes = Vec::with_capacity(addresses.len());
        for address in addresses {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::Search(format!("Failed to load document: {e}")))?;

            recipes.push(StoredRecipe {
                filename: text_of(&doc, self.schema.filename),
                name: text_of(&doc, self.schema.name),
                webpath: text_of(&doc, self.schema.webpath),
                tags: tags_of(&doc, self.schema.tags),
            });
        }

        recipes.sort_by(|a, b| a.webpath.cmp(&b.webpath));
        Ok(recipes)
    }

    /// Free-text search over the name and body fields.
    ///
    /// Hits come back in relevance order, each with the highlighted
    /// fragments of both fields when they matched.
    pub fn search(&self, query_str: &str) -> Result<Vec<SearchHit>> {
        let searcher = self.reader.searcher();

        let query_parser =
            QueryParser::for_index(&self.index, vec![self.schema.name, self.schema.body]);
        let query = query_parser
            .parse_query(query_str)
            .map_err(|e| Error::Query(e.to_string()))?;

        let limit = (searcher.num_docs() as usize).max(1);
        let top_docs = searcher
            .search(&*query, &TopDocs::with_limit(limit))
            .map_err(|e| Error::Search(format!("Search failed: {e}")))?;

        let mut name_snippets = SnippetGenerator::create(&searcher, &*query, self.schema.name)
            .map_err(|e| Error::Search(format!("Failed to highlight: {e}")))?;
        name_snippets.set_max_num_chars(self.snippet_max_chars);

        let mut body_snippets = SnippetGenerator::create(&searcher, &*query, self.schema.body)
            .map_err(|e| Error::Search(format!("Failed to highlight: {e}")))?;
        body_snippets.set_max_num_chars(self.snippet_max_chars);

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::Search(format!("Failed to load document: {e}")))?;

            hits.push(SearchHit {
                filename: text_of(&doc, self.schema.filename),
                name: text_of(&doc, self.schema.name),
                webpath: text_of(&doc, self.schema.webpath),
                name_fragment: highlighted(name_snippets.snippet_from_doc(&doc)),
                body_fragment: highlighted(body_snippets.snippet_from_doc(&doc)),
                score,
            });
        }

        debug!("Query {:?} matched {} recipes", query_str, hits.len());
        Ok(hits)
    }

    /// Number of indexed recipes
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    fn webpath_term(&self, webpath: &str) -> Term {
        Term::from_field_text(self.schema.webpath, webpath)
    }

    /// Commit staged changes and make them visible to readers
    fn commit(&self, writer: &mut IndexWriter) -> Result<()> {
        if let Err(e) = writer.commit() {
            discard_pending(writer);
            return Err(Error::IndexWrite(format!("Failed to commit: {e}")));
        }
        self.reader
            .reload()
            .map_err(|e| Error::IndexWrite(format!("Failed to reload reader: {e}")))
    }
}

/// Drop staged operations so a failed write leaves the previous entry intact.
fn discard_pending(writer: &mut IndexWriter) {
    if let Err(e) = writer.rollback() {
        warn!("Failed to roll back index writer: {}", e);
    }
}

fn highlighted(snippet: Snippet) -> Option<String> {
    if snippet.highlighted().is_empty() {
        None
    } else {
        Some(snippet.to_html())
    }
}

fn text_of(doc: &TantivyDocument, field: Field) -> String {
    match doc.get_first(field) {
        Some(OwnedValue::Str(s)) => s.to_string(),
        _ => String::new(),
    }
}

/// Stored tags arrive either as one value per tag or as a single array
/// value; both shapes flatten to an ordered list here.
fn tags_of(doc: &TantivyDocument, field: Field) -> Vec<String> {
    let mut tags = Vec::new();
    for value in doc.get_all(field) {
        collect_strings(value, &mut tags);
    }
    tags
}

fn collect_strings(value: &OwnedValue, out: &mut Vec<String>) {
    match value {
        OwnedValue::Str(s) => out.push(s.to_string()),
        OwnedValue::Array(values) => {
            for value in values {
                collect_strings(value, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::recipe::load;

    fn index() -> SearchIndex {
        SearchIndex::new(&SearchConfig::default()).unwrap()
    }

    #[test]
    fn test_upsert_and_get() {
        let index = index();
        let doc = load("Chicken Soup.md", b"tags: dinner, soup\n\nSimmer.\n").unwrap();
        index.upsert(&doc).unwrap();

        let recipe = index.get("ChickenSoup").unwrap();
        assert_eq!(recipe.filename, "Chicken Soup.md");
        assert_eq!(recipe.name, "Chicken Soup");
        assert_eq!(recipe.html, doc.html);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let index = index();
        let err = index.get("Nothing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_upsert_replaces_entry() {
        let index = index();
        index
            .upsert(&load("Bread.md", b"tags: baking\n\nRye.\n").unwrap())
            .unwrap();
        index
            .upsert(&load("Bread.md", b"tags: breakfast\n\nSpelt.\n").unwrap())
            .unwrap();

        assert_eq!(index.num_docs(), 1);
        let all = index.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].tags, vec!["breakfast"]);
        assert!(index.search("rye").unwrap().is_empty());
    }

    #[test]
    fn test_delete_absent_is_ok() {
        let index = index();
        assert!(index.delete("NeverIndexed").is_ok());
    }

    #[test]
    fn test_tags_keep_order() {
        let index = index();
        index
            .upsert(&load("Stew.md", b"tags: winter, dinner, beef\n\nBrown.\n").unwrap())
            .unwrap();
        let all = index.list_all().unwrap();
        assert_eq!(all[0].tags, vec!["winter", "dinner", "beef"]);
    }

    #[test]
    fn test_stemmed_search_with_highlights() {
        let index = index();
        index
            .upsert(&load("Apple Pie.md", b"tags: dessert\n\nPeel the apples and bake.\n").unwrap())
            .unwrap();

        let hits = index.search("apple").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].webpath, "ApplePie");
        assert_eq!(hits[0].name_fragment.as_deref(), Some("<b>Apple</b> Pie"));
        assert!(hits[0]
            .body_fragment
            .as_deref()
            .unwrap()
            .contains("<b>apples</b>"));
    }

    #[test]
    fn test_malformed_query_is_query_error() {
        let index = index();
        let err = index.search("calories:200").unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }

    #[test]
    fn test_collect_strings_normalizes_shapes() {
        let mut tags = Vec::new();
        collect_strings(&OwnedValue::Str("soup".to_string()), &mut tags);
        collect_strings(
            &OwnedValue::Array(vec![
                OwnedValue::Str("dinner".to_string()),
                OwnedValue::Str("quick".to_string()),
            ]),
            &mut tags,
        );
        assert_eq!(tags, vec!["soup", "dinner", "quick"]);
    }
}
