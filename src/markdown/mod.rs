// Markdown conversion for recipe documents
// Both conversions run the tag directive extractor and hand the tags back
// alongside the rendered output

pub mod tags;
pub mod text;

use pulldown_cmark::{html, CowStr, Event, Options};

pub use tags::{extract_tags, parse_tag_line, render_tag_block, DEFAULT_TAG, TAG_PREFIX};
pub use text::render_text;

/// Output of a markdown conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    /// Rendered HTML or plain text, depending on the conversion.
    pub output: String,
    /// Tags from the directive; `["Other"]` when there are none.
    pub tags: Vec<String>,
}

fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// Convert a recipe to HTML.
///
/// Soft line breaks render as `<br />`, and the tag directive renders as a
/// `<div class="tags">` block where it stood.
pub fn convert_to_html(markdown: &str) -> Converted {
    let extracted = extract_tags(markdown, options());
    let tags = extracted.tags_or_default();

    let mut events: Vec<Event<'_>> = extracted
        .events
        .into_iter()
        .map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        })
        .collect();

    if let (Some(at), Some(directive_tags)) = (extracted.directive_at, extracted.tags.as_deref()) {
        let block = render_tag_block(directive_tags);
        events.insert(at, Event::Html(CowStr::from(block)));
    }

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());

    Converted { output, tags }
}

/// Convert a recipe to plain text for indexing.
pub fn convert_to_text(markdown: &str) -> Converted {
    let extracted = extract_tags(markdown, options());
    let tags = extracted.tags_or_default();

    Converted {
        output: render_text(extracted.events),
        tags,
    }
}
