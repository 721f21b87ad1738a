//! Tag directive extraction.
//!
//! A recipe may open with a metadata line such as `tags: dinner, soup`.
//! The directive is only recognized as the very first block of the
//! document; anywhere else a line starting with `tags:` is ordinary text.

use crate::utils::escape_html;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use std::iter::Peekable;
use std::ops::Range;

pub const TAG_PREFIX: &str = "tags:";

/// Tags assigned to documents without a directive.
pub const DEFAULT_TAG: &str = "Other";

/// Parser events with the tag directive taken out.
pub struct TaggedEvents<'a> {
    /// Events of the document, without the directive line.
    pub events: Vec<Event<'a>>,
    /// Tags parsed from the directive, if the document has one.
    pub tags: Option<Vec<String>>,
    /// Position in `events` where the directive stood.
    pub directive_at: Option<usize>,
}

impl TaggedEvents<'_> {
    /// Extracted tags, or `["Other"]` when there are none.
    pub fn tags_or_default(&self) -> Vec<String> {
        match &self.tags {
            Some(tags) if !tags.is_empty() => tags.clone(),
            _ => vec![DEFAULT_TAG.to_string()],
        }
    }
}

/// Parse a `tags: a, b, c` line.
///
/// Values are split on commas and trimmed. Empty values are kept as-is.
pub fn parse_tag_line(line: &str) -> Option<Vec<String>> {
    let rest = line.strip_prefix(TAG_PREFIX)?;
    Some(rest.split(',').map(|tag| tag.trim().to_string()).collect())
}

/// Run the markdown parser over `source`, pulling out a leading tag directive.
pub fn extract_tags(source: &str, options: Options) -> TaggedEvents<'_> {
    let mut iter = Parser::new_ext(source, options)
        .into_offset_iter()
        .peekable();
    let mut events = Vec::new();
    let mut tags = None;
    let mut directive_at = None;

    match iter.next() {
        Some((Event::Start(Tag::Paragraph), range)) => {
            let first_line = source[range.clone()].lines().next().unwrap_or_default();
            match parse_tag_line(first_line.trim_start()) {
                Some(parsed) => {
                    tags = Some(parsed);
                    directive_at = Some(0);
                    skip_directive_line(&mut iter, range.start + first_line.len(), &mut events);
                }
                None => events.push(Event::Start(Tag::Paragraph)),
            }
        }
        Some((event, _)) => events.push(event),
        None => {}
    }

    events.extend(iter.map(|(event, _)| event));

    TaggedEvents {
        events,
        tags,
        directive_at,
    }
}

/// Drop the events of the directive line. If the opening paragraph has
/// more lines, they stay behind as a paragraph of their own.
fn skip_directive_line<'a, I>(
    iter: &mut Peekable<I>,
    line_end: usize,
    events: &mut Vec<Event<'a>>,
) where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    // Inline spans opened on the directive line are dropped whole, even
    // when they close on a later line
    let mut depth = 0usize;
    while let Some((event, range)) = iter.peek() {
        if depth == 0 {
            if matches!(event, Event::End(TagEnd::Paragraph)) {
                iter.next();
                return;
            }
            if range.start >= line_end {
                break;
            }
        }
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        iter.next();
    }

    if matches!(iter.peek(), Some((Event::SoftBreak | Event::HardBreak, _))) {
        iter.next();
    }

    match iter.peek() {
        Some((Event::End(TagEnd::Paragraph), _)) => {
            iter.next();
        }
        _ => events.push(Event::Start(Tag::Paragraph)),
    }
}

/// Render the tag list as the block shown in place of the directive.
pub fn render_tag_block(tags: &[String]) -> String {
    let mut block = String::from("<div class=\"tags\">");
    for tag in tags {
        block.push_str("<span class=\"tag\">");
        block.push_str(&escape_html(tag));
        block.push_str(" </span>");
    }
    block.push_str("</div>\n");
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_line() {
        assert_eq!(
            parse_tag_line("tags: dinner, soup"),
            Some(vec!["dinner".to_string(), "soup".to_string()])
        );
        assert_eq!(parse_tag_line("Tags: dinner"), None);
        assert_eq!(parse_tag_line("flour: 200g"), None);
    }

    #[test]
    fn test_empty_tag_values_are_preserved() {
        assert_eq!(
            parse_tag_line("tags: a,, b,"),
            Some(vec![
                "a".to_string(),
                String::new(),
                "b".to_string(),
                String::new()
            ])
        );
        assert_eq!(parse_tag_line("tags:"), Some(vec![String::new()]));
    }

    #[test]
    fn test_directive_at_top_is_extracted() {
        let extracted = extract_tags("tags: dinner, soup\n\nSimmer.\n", Options::empty());
        assert_eq!(
            extracted.tags,
            Some(vec!["dinner".to_string(), "soup".to_string()])
        );
        assert_eq!(extracted.directive_at, Some(0));
        assert!(!extracted
            .events
            .iter()
            .any(|e| matches!(e, Event::Text(t) if t.contains("tags:"))));
    }

    #[test]
    fn test_directive_after_content_is_text() {
        let extracted = extract_tags("# Soup\n\ntags: dinner\n", Options::empty());
        assert!(extracted.tags.is_none());
        assert_eq!(extracted.tags_or_default(), vec!["Other".to_string()]);
        assert!(extracted
            .events
            .iter()
            .any(|e| matches!(e, Event::Text(t) if t.contains("tags:"))));
    }

    #[test]
    fn test_rest_of_opening_paragraph_is_kept() {
        let extracted = extract_tags("tags: bread\nKnead well.\n", Options::empty());
        assert_eq!(extracted.tags, Some(vec!["bread".to_string()]));
        assert!(matches!(extracted.events[0], Event::Start(Tag::Paragraph)));
        assert!(extracted
            .events
            .iter()
            .any(|e| matches!(e, Event::Text(t) if t.as_ref() == "Knead well.")));
    }

    #[test]
    fn test_span_crossing_directive_line_is_dropped_whole() {
        let extracted = extract_tags("tags: *a\nb* rest\n\nBody.\n", Options::empty());
        assert_eq!(extracted.tags, Some(vec!["*a".to_string()]));

        let starts = extracted
            .events
            .iter()
            .filter(|e| matches!(e, Event::Start(_)))
            .count();
        let ends = extracted
            .events
            .iter()
            .filter(|e| matches!(e, Event::End(_)))
            .count();
        assert_eq!(starts, ends);
        assert!(!extracted
            .events
            .iter()
            .any(|e| matches!(e, Event::End(TagEnd::Emphasis))));
    }

    #[test]
    fn test_tag_block_escapes_markup() {
        let block = render_tag_block(&["<b>hot</b>".to_string(), "quick".to_string()]);
        assert_eq!(
            block,
            "<div class=\"tags\"><span class=\"tag\">&lt;b&gt;hot&lt;/b&gt; </span>\
             <span class=\"tag\">quick </span></div>\n"
        );
    }
}
