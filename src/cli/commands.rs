use crate::indexer::{SearchResult, TagGroup};
use crate::library::RecipeLibrary;
use crate::Result;
use std::fmt::Write;

/// Print the tag-grouped listing
pub fn tags(library: &RecipeLibrary, json: bool) -> Result<()> {
    let groups = library.list_grouped_by_tag()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        print!("{}", format_tag_groups(&groups));
    }

    Ok(())
}

/// Print search results
pub fn search(library: &RecipeLibrary, query: &str, json: bool) -> Result<()> {
    let results = library.search_recipes(query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No recipes match \"{query}\"");
    } else {
        print!("{}", format_search_results(&results));
    }

    Ok(())
}

/// Print one recipe's HTML
pub fn show(library: &RecipeLibrary, webpath: &str) -> Result<()> {
    let recipe = library.get_recipe(webpath)?;
    println!("<!-- {} ({}) -->", recipe.name, recipe.filename);
    println!("{}", recipe.html);
    Ok(())
}

pub fn format_tag_groups(groups: &[TagGroup]) -> String {
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{} ({})", group.tag_name, group.recipes.len());
        for recipe in &group.recipes {
            let _ = writeln!(out, "  {}  /recipe/{}", recipe.name, recipe.webpath);
        }
    }
    out
}

pub fn format_search_results(results: &[SearchResult]) -> String {
    let mut out = String::new();
    for result in results {
        let _ = writeln!(out, "{}  /recipe/{}", result.name, result.webpath);
        for line in result.snippet.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    out
}
