//! Markdown to HTML rendering.
//!
//! Raw HTML passes through untouched, bare URLs become links, and
//! typographic replacements are off. On top of CommonMark the renderer
//! understands `++text++` (rendered as `<ins>`), tables, strikethrough and
//! footnotes. Output is not sanitized.

use lazy_static::lazy_static;
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::collections::HashMap;

use super::bbcode::{underline_to_markdown, UNDERLINE_MARKER};

lazy_static! {
    static ref LINK_RE: Regex = Regex::new(concat!(
        r#"(?i)(?P<url>\b(?:https?://|ftp://|www\.)[^\s<>]*[^\s<>.,:;!?'")\]])"#,
        r"|(?P<email>\b[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b)",
    ))
    .unwrap();
}

/// Convert markdown, with `[u]`/`[/u]` underline tags, to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    render_markdown(&underline_to_markdown(markdown))
}

/// Render markdown to HTML without the BBCode pass.
pub fn render_markdown(source: &str) -> String {
    let (events, origins) = parse_events(source);
    let events = linkify(mark_insertions(source, events, &origins));

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES
}

/// Source offset of each byte of a text event, `None` where the byte does not
/// appear verbatim in the source (entities). Empty for other events.
type Origins = Vec<Vec<Option<usize>>>;

/// Parse `source`, merging adjacent text events and recording where each
/// text byte came from.
fn parse_events(source: &str) -> (Vec<Event<'_>>, Origins) {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut origins: Origins = Vec::new();

    for (event, range) in Parser::new_ext(source, options()).into_offset_iter() {
        let text = match event {
            Event::Text(text) => text,
            other => {
                events.push(other);
                origins.push(Vec::new());
                continue;
            }
        };

        let raw = &source[range.clone()];
        let base = if raw == &*text {
            Some(range.start)
        } else {
            raw.find(&*text).map(|off| range.start + off)
        };
        let positions = (0..text.len()).map(|i| base.map(|b| b + i));

        if let (Some(Event::Text(prev)), Some(prev_origin)) =
            (events.last_mut(), origins.last_mut())
        {
            let mut merged = prev.to_string();
            merged.push_str(&text);
            *prev = CowStr::from(merged);
            prev_origin.extend(positions);
            continue;
        }
        origins.push(positions.collect());
        events.push(Event::Text(text));
    }
    (events, origins)
}

/// Whether the source byte at `pos` is a literal `+`: present verbatim and
/// not backslash-escaped.
fn is_literal_plus(source: &str, pos: Option<usize>) -> bool {
    let Some(pos) = pos else {
        return false;
    };
    if source.as_bytes().get(pos) != Some(&b'+') {
        return false;
    }
    let backslashes = source.as_bytes()[..pos]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    backslashes % 2 == 0
}

fn is_inline_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn is_inline_end(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
    )
}

/// Whether text ending right before `event` touches it without whitespace.
fn touches_following(event: Option<&Event<'_>>) -> bool {
    match event {
        Some(Event::Start(tag)) => is_inline_tag(tag),
        Some(Event::Text(_) | Event::Code(_) | Event::InlineHtml(_)) => true,
        Some(Event::FootnoteReference(_)) => true,
        _ => false,
    }
}

/// Whether text starting right after `event` touches it without whitespace.
fn touches_preceding(event: Option<&Event<'_>>) -> bool {
    match event {
        Some(Event::End(tag)) => is_inline_end(tag),
        Some(Event::Text(_) | Event::Code(_) | Event::InlineHtml(_)) => true,
        Some(Event::FootnoteReference(_)) => true,
        _ => false,
    }
}

/// A `++` found in a text event.
struct Marker {
    event: usize,
    offset: usize,
    /// Innermost inline element (or block) containing the marker.
    container: usize,
    can_open: bool,
    can_close: bool,
}

/// Turn matched `++` pairs into `<ins>` elements.
///
/// A pair must sit in the same inline container; an opener must be followed
/// by non-whitespace and a closer preceded by non-whitespace. Runs of more
/// than two `+`, unmatched markers and escaped or entity-encoded pluses stay
/// literal.
fn mark_insertions<'a>(
    source: &str,
    events: Vec<Event<'a>>,
    origins: &Origins,
) -> Vec<Event<'a>> {
    let mut markers = Vec::new();
    let mut next_id = 0usize;
    let mut block = 0usize;
    let mut inline_stack: Vec<usize> = Vec::new();
    let mut in_code = 0usize;

    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(tag) if is_inline_tag(tag) => {
                next_id += 1;
                inline_stack.push(next_id);
            }
            Event::End(tag) if is_inline_end(tag) => {
                inline_stack.pop();
            }
            Event::Start(tag) => {
                if matches!(tag, Tag::CodeBlock(_)) {
                    in_code += 1;
                }
                next_id += 1;
                block = next_id;
                inline_stack.clear();
            }
            Event::End(tag) => {
                if matches!(tag, TagEnd::CodeBlock) {
                    in_code = in_code.saturating_sub(1);
                }
                next_id += 1;
                block = next_id;
                inline_stack.clear();
            }
            Event::Text(text) if in_code == 0 => {
                let container = inline_stack.last().copied().unwrap_or(block);
                let bytes = text.as_bytes();
                let mut pos = 0;
                while pos < bytes.len() {
                    if bytes[pos] != b'+' {
                        pos += 1;
                        continue;
                    }
                    let start = pos;
                    while pos < bytes.len() && bytes[pos] == b'+' {
                        pos += 1;
                    }
                    if pos - start != UNDERLINE_MARKER.len() {
                        continue;
                    }
                    if !(start..pos).all(|b| is_literal_plus(source, origins[i][b])) {
                        continue;
                    }
                    let before = text[..start].chars().next_back();
                    let after = text[pos..].chars().next();
                    markers.push(Marker {
                        event: i,
                        offset: start,
                        container,
                        can_open: match after {
                            Some(c) => !c.is_whitespace(),
                            None => touches_following(events.get(i + 1)),
                        },
                        can_close: match before {
                            Some(c) => !c.is_whitespace(),
                            None => i > 0 && touches_preceding(events.get(i - 1)),
                        },
                    });
                }
            }
            _ => {}
        }
    }

    // event index -> (byte offset, opens)
    let mut splits: HashMap<usize, Vec<(usize, bool)>> = HashMap::new();
    let mut open: HashMap<usize, usize> = HashMap::new();
    for (idx, marker) in markers.iter().enumerate() {
        match open.get(&marker.container).copied() {
            Some(opener) if marker.can_close => {
                open.remove(&marker.container);
                let opener = &markers[opener];
                splits
                    .entry(opener.event)
                    .or_default()
                    .push((opener.offset, true));
                splits
                    .entry(marker.event)
                    .or_default()
                    .push((marker.offset, false));
            }
            _ if marker.can_open => {
                open.insert(marker.container, idx);
            }
            _ => {}
        }
    }

    if splits.is_empty() {
        return events;
    }

    let mut out = Vec::with_capacity(events.len() + splits.len() * 4);
    for (i, event) in events.into_iter().enumerate() {
        let points = match splits.get_mut(&i) {
            Some(points) => points,
            None => {
                out.push(event);
                continue;
            }
        };
        let text = match event {
            Event::Text(text) => text,
            other => {
                out.push(other);
                continue;
            }
        };
        points.sort_unstable();

        let mut last = 0;
        for &(offset, opens) in points.iter() {
            if offset > last {
                out.push(Event::Text(CowStr::from(text[last..offset].to_owned())));
            }
            let tag = if opens { "<ins>" } else { "</ins>" };
            out.push(Event::InlineHtml(CowStr::Borrowed(tag)));
            last = offset + UNDERLINE_MARKER.len();
        }
        if last < text.len() {
            out.push(Event::Text(CowStr::from(text[last..].to_owned())));
        }
    }
    out
}

/// Turn bare URLs and email addresses in text into links.
///
/// Text inside code blocks, existing links and raw `<a>` elements is left
/// alone.
fn linkify(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut in_link = 0usize;
    let mut in_code = 0usize;
    let mut in_anchor = 0usize;

    for event in events {
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => in_link += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => in_link = in_link.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => in_code += 1,
            Event::End(TagEnd::CodeBlock) => in_code = in_code.saturating_sub(1),
            Event::Html(raw) | Event::InlineHtml(raw) => {
                in_anchor = track_anchor(raw, in_anchor);
            }
            Event::Text(text) if in_link == 0 && in_code == 0 && in_anchor == 0 => {
                if LINK_RE.is_match(text) {
                    split_links(text, &mut out);
                    continue;
                }
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

/// Update the count of open raw `<a>` elements after an HTML fragment.
fn track_anchor(raw: &str, depth: usize) -> usize {
    let lower = raw.to_ascii_lowercase();
    let opens = lower.match_indices("<a").filter(|(i, _)| {
        matches!(lower.as_bytes().get(i + 2), Some(b' ' | b'>' | b'\t' | b'\n'))
    });
    let closes = lower.matches("</a>").count();
    (depth + opens.count()).saturating_sub(closes)
}

/// Extend a URL match over closing parentheses that pair with an opening one
/// inside the URL.
fn balance_parens(text: &str, start: usize, mut end: usize) -> usize {
    while text[end..].starts_with(')') {
        let url = &text[start..end];
        if url.matches('(').count() <= url.matches(')').count() {
            break;
        }
        end += 1;
    }
    end
}

fn split_links<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for caps in LINK_RE.captures_iter(text) {
        let (start, end, link_type) = if let Some(url) = caps.name("url") {
            (url.start(), balance_parens(text, url.start(), url.end()), LinkType::Inline)
        } else if let Some(email) = caps.name("email") {
            (email.start(), email.end(), LinkType::Email)
        } else {
            continue;
        };
        if start < last {
            continue;
        }

        let found = &text[start..end];
        let dest = if link_type == LinkType::Inline
            && found.to_ascii_lowercase().starts_with("www.")
        {
            format!("http://{}", found)
        } else {
            found.to_owned()
        };

        if start > last {
            out.push(Event::Text(CowStr::from(text[last..start].to_owned())));
        }
        out.push(Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::from(dest),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(CowStr::from(found.to_owned())));
        out.push(Event::End(TagEnd::Link));
        last = end;
    }
    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_owned())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty() {
        assert_eq!(markdown_to_html(""), "");
    }

    #[test]
    fn test_plain_paragraph() {
        assert_eq!(markdown_to_html("hello"), "<p>hello</p>\n");
    }

    #[test]
    fn test_underline_tags() {
        assert_eq!(markdown_to_html("[u]hi[/u]"), "<p><ins>hi</ins></p>\n");
    }

    #[test]
    fn test_underline_in_sentence() {
        assert_eq!(
            markdown_to_html("say [u]hi[/u] there"),
            "<p>say <ins>hi</ins> there</p>\n"
        );
    }

    #[test]
    fn test_underline_around_emphasis() {
        assert_eq!(
            render_markdown("++*hi*++"),
            "<p><ins><em>hi</em></ins></p>\n"
        );
    }

    #[test]
    fn test_unbalanced_underline_stays_literal() {
        assert_eq!(markdown_to_html("[u]hi"), "<p>++hi</p>\n");
    }

    #[test]
    fn test_underline_needs_content() {
        assert_eq!(render_markdown("a ++ b ++ c"), "<p>a ++ b ++ c</p>\n");
        assert_eq!(render_markdown("c++++"), "<p>c++++</p>\n");
    }

    #[test]
    fn test_underline_not_in_code() {
        assert_eq!(
            render_markdown("`++x++`"),
            "<p><code>++x++</code></p>\n"
        );
        assert_eq!(
            render_markdown("```\n++x++\n```"),
            "<pre><code>++x++\n</code></pre>\n"
        );
    }

    #[test]
    fn test_escaped_plus_is_not_underline() {
        assert_eq!(render_markdown("\\+\\+hi\\+\\+"), "<p>++hi++</p>\n");
        assert_eq!(render_markdown("\\++hi++"), "<p>++hi++</p>\n");
    }

    #[test]
    fn test_entity_plus_is_not_underline() {
        assert_eq!(
            render_markdown("&#43;&#43;hi&#43;&#43;"),
            "<p>++hi++</p>\n"
        );
    }

    #[test]
    fn test_escaped_backslash_keeps_underline() {
        assert_eq!(
            render_markdown("\\\\++hi++"),
            "<p>\\<ins>hi</ins></p>\n"
        );
    }

    #[test]
    fn test_underline_does_not_cross_emphasis() {
        assert_eq!(
            render_markdown("++a *b++ c*"),
            "<p>++a <em>b++ c</em></p>\n"
        );
    }

    #[test]
    fn test_html_passthrough() {
        assert_eq!(
            markdown_to_html("<span class=\"x\">raw</span>"),
            "<p><span class=\"x\">raw</span></p>\n"
        );
    }

    #[test]
    fn test_no_typographer() {
        assert_eq!(
            markdown_to_html("wait -- what... (c)"),
            "<p>wait -- what... (c)</p>\n"
        );
    }

    #[test]
    fn test_linkify_url() {
        assert_eq!(
            markdown_to_html("see https://www.topcoder.com/challenges."),
            concat!(
                "<p>see <a href=\"https://www.topcoder.com/challenges\">",
                "https://www.topcoder.com/challenges</a>.</p>\n"
            )
        );
    }

    #[test]
    fn test_linkify_keeps_balanced_paren() {
        assert_eq!(
            markdown_to_html("https://example.com/a_(b)"),
            "<p><a href=\"https://example.com/a_(b)\">https://example.com/a_(b)</a></p>\n"
        );
        assert_eq!(
            markdown_to_html("(see https://a.com)"),
            "<p>(see <a href=\"https://a.com\">https://a.com</a>)</p>\n"
        );
    }

    #[test]
    fn test_linkify_www() {
        assert_eq!(
            markdown_to_html("www.example.com"),
            "<p><a href=\"http://www.example.com\">www.example.com</a></p>\n"
        );
    }

    #[test]
    fn test_linkify_email() {
        assert_eq!(
            markdown_to_html("mail support@topcoder.com"),
            "<p>mail <a href=\"mailto:support@topcoder.com\">support@topcoder.com</a></p>\n"
        );
    }

    #[test]
    fn test_existing_links_untouched() {
        assert_eq!(
            markdown_to_html("[https://a.com](https://a.com)"),
            "<p><a href=\"https://a.com\">https://a.com</a></p>\n"
        );
        assert_eq!(
            markdown_to_html("<a href=\"https://a.com\">https://a.com</a>"),
            "<p><a href=\"https://a.com\">https://a.com</a></p>\n"
        );
    }

    #[test]
    fn test_strikethrough_and_tables() {
        assert_eq!(markdown_to_html("~~old~~"), "<p><del>old</del></p>\n");
        let table = markdown_to_html("| a |\n|---|\n| b |");
        assert!(table.contains("<table>"));
        assert!(table.contains("<td>b</td>"));
    }
}
