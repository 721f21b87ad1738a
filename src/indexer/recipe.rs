use crate::error::{Error, Result};
use crate::markdown;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// File extension of recipe documents.
pub const RECIPE_EXT: &str = ".md";

/// A recipe file converted and ready for indexing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDocument {
    pub filename: String,
    pub name: String,
    pub webpath: String,
    pub html: String,
    pub searchable_text: String,
    pub tags: Vec<String>,
}

/// Derive the URL key of a recipe from its name.
///
/// Every word is title-cased and spaces are removed, so
/// `"chicken soup"` and `"Chicken Soup"` both map to `"ChickenSoup"`.
/// Distinct names may collide.
pub fn to_webpath(name: &str) -> String {
    let mut webpath = String::with_capacity(name.len());
    let mut in_word = false;
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_alphanumeric() {
            if in_word {
                webpath.extend(c.to_lowercase());
            } else {
                webpath.extend(c.to_uppercase());
            }
            in_word = true;
            continue;
        }

        // Underscores join words; apostrophes, periods and colons only
        // between letters or digits ("grandma's", "st.louis", "3.5")
        let joins = match c {
            '_' => true,
            '\'' | '\u{2019}' | '.' | ':' => chars.peek().is_some_and(|n| n.is_alphanumeric()),
            _ => false,
        };
        in_word = in_word && joins;

        if c != ' ' {
            webpath.push(c);
        }
    }

    webpath
}

/// Strip the recipe extension from a filename.
pub fn strip_extension(filename: &str) -> &str {
    filename.strip_suffix(RECIPE_EXT).unwrap_or(filename)
}

/// Webpath of the recipe stored in `filename`, derived from the name alone.
pub fn webpath_for_filename(filename: &str) -> String {
    to_webpath(strip_extension(filename))
}

/// Whether a path names a recipe file by extension.
pub fn has_recipe_extension(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(RECIPE_EXT))
}

/// Load one recipe from its raw bytes
pub fn load(filename: &str, raw: &[u8]) -> Result<RecipeDocument> {
    debug!("Loading recipe: {}", filename);

    let source = std::str::from_utf8(raw).map_err(|e| Error::Parse {
        filename: filename.to_string(),
        message: format!("invalid UTF-8: {e}"),
    })?;

    let name = strip_extension(filename).to_string();
    let webpath = to_webpath(&name);

    let html = markdown::convert_to_html(source);
    let text = markdown::convert_to_text(source);

    Ok(RecipeDocument {
        filename: filename.to_string(),
        name,
        webpath,
        html: html.output,
        searchable_text: text.output,
        tags: html.tags,
    })
}
