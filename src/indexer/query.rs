use crate::error::Result;
use crate::indexer::search::SearchIndex;
use crate::utils::escape_html;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Lines shorter than this are trimmed from the edges of a snippet.
const MIN_SNIPPET_LINE_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLink {
    pub name: String,
    pub webpath: String,
}

/// Recipes sharing one tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    pub tag_name: String,
    pub recipes: Vec<RecipeLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Recipe name as HTML, with matched terms highlighted
    pub name: String,
    pub webpath: String,
    /// Cleaned body fragment as HTML
    pub snippet: String,
}

/// Case-insensitive ordering with a byte-order tie break.
fn display_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Group every indexed recipe under each of its tags.
///
/// Groups are ordered by tag name and recipes within a group by name.
pub fn list_grouped_by_tag(index: &SearchIndex) -> Result<Vec<TagGroup>> {
    let mut groups: BTreeMap<String, Vec<RecipeLink>> = BTreeMap::new();

    for recipe in index.list_all()? {
        for tag in &recipe.tags {
            let recipes = groups.entry(tag.trim().to_string()).or_default();
            if recipes.iter().any(|r| r.webpath == recipe.webpath) {
                continue;
            }
            recipes.push(RecipeLink {
                name: recipe.name.clone(),
                webpath: recipe.webpath.clone(),
            });
        }
    }

    let mut result: Vec<TagGroup> = groups
        .into_iter()
        .map(|(tag_name, mut recipes)| {
            recipes.sort_by(|a, b| {
                display_order(&a.name, &b.name).then_with(|| a.webpath.cmp(&b.webpath))
            });
            TagGroup { tag_name, recipes }
        })
        .collect();
    result.sort_by(|a, b| display_order(&a.tag_name, &b.tag_name));

    Ok(result)
}

/// Full-text search, ordered by recipe name.
///
/// Relevance decides which recipes match; the listing itself is
/// alphabetical.
pub fn search_recipes(index: &SearchIndex, query: &str) -> Result<Vec<SearchResult>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut hits = index.search(query)?;
    hits.sort_by(|a, b| display_order(&a.name, &b.name).then_with(|| a.webpath.cmp(&b.webpath)));

    Ok(hits
        .into_iter()
        .map(|hit| SearchResult {
            name: hit.name_fragment.unwrap_or_else(|| escape_html(&hit.name)),
            webpath: hit.webpath,
            snippet: clean_snippet(hit.body_fragment.as_deref().unwrap_or_default()),
        })
        .collect())
}

/// Tidy a highlighted fragment for display.
///
/// Blank lines go, and short lines at either edge (partial words or stray
/// punctuation cut by the fragment boundary) are dropped. If nothing would
/// remain the fragment is returned untouched.
pub fn clean_snippet(snippet: &str) -> String {
    let lines: Vec<&str> = snippet
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let is_long = |line: &&str| line.chars().count() >= MIN_SNIPPET_LINE_CHARS;
    let start = lines.iter().position(is_long);
    let end = lines.iter().rposition(is_long);

    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => snippet.to_string(),
    }
}
