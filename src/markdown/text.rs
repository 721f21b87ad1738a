use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

/// Render parser events as plain text for full-text analysis.
///
/// Raw HTML is dropped, links keep their destination in parentheses and
/// every block ends with a newline.
pub fn render_text<'a, I>(events: I) -> String
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut out = String::new();
    let mut links: Vec<CowStr<'a>> = Vec::new();

    for event in events {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Link { dest_url, .. }) => links.push(dest_url),
            Event::End(TagEnd::Link) => {
                if let Some(dest) = links.pop() {
                    out.push_str(" (");
                    out.push_str(&dest);
                    out.push(')');
                }
            }
            Event::End(TagEnd::TableCell) => out.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::CodeBlock
                | TagEnd::Item
                | TagEnd::TableHead
                | TagEnd::TableRow,
            ) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }

    out
}
