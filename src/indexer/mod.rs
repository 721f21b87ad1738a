// Recipe loading, indexing and querying
// Documents are converted from markdown, stored in a tantivy index keyed by
// webpath, and read back as tag listings or highlighted search results

pub mod query;
pub mod recipe;
pub mod schema;
pub mod search;

// Re-exports
pub use query::{clean_snippet, list_grouped_by_tag, search_recipes, RecipeLink, SearchResult, TagGroup};
pub use recipe::{
    has_recipe_extension, load, strip_extension, to_webpath, webpath_for_filename, RecipeDocument,
    RECIPE_EXT,
};
pub use schema::RecipeSchema;
pub use search::{Recipe, SearchHit, SearchIndex, StoredRecipe};
