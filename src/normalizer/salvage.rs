//! Best-effort recovery of feed fields from documents the strict parser rejects.
//!
//! The document is run through an HTML5 tree builder, which never fails and
//! closes whatever the feed left open. `item`/`entry` elements become entry
//! records, the first `channel`/`feed` element becomes the header record.

use ::scraper::{ElementRef, Html, Node};

use crate::normalizer::fields::FieldMap;

#[derive(Debug, Default)]
pub struct Salvaged {
    pub header: FieldMap,
    pub entries: Vec<FieldMap>,
}

impl Salvaged {
    /// Nothing feed-like was found.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.entries.is_empty()
    }
}

pub fn salvage(document: &str) -> Salvaged {
    let html = Html::parse_document(document);
    let mut salvaged = Salvaged::default();
    let mut header_found = false;

    for element in html.root_element().descendants().filter_map(ElementRef::wrap) {
        match element.value().name() {
            "item" | "entry" => salvaged.entries.push(collect_fields(element)),
            "channel" | "feed" if !header_found => {
                salvaged.header = collect_fields(element);
                header_found = true;
            }
            _ => {}
        }
    }

    salvaged
}

fn collect_fields(record: ElementRef) -> FieldMap {
    let mut fields = FieldMap::new();

    for child in record.children().filter_map(ElementRef::wrap) {
        let name = child.value().name();
        if matches!(name, "item" | "entry") {
            continue;
        }

        let value = match name {
            "link" => link_value(child),
            "guid" if child.value().attr("ispermalink") == Some("false") => None,
            _ => Some(field_text(child)),
        };

        if let Some(value) = value {
            fields.insert(name, &value);
        }
    }

    fields
}

fn link_value(link: ElementRef) -> Option<String> {
    if link.value().attr("rel").is_some_and(|rel| rel != "alternate") {
        return None;
    }

    if let Some(href) = link.value().attr("href") {
        return Some(href.to_string());
    }

    let text = field_text(link);
    if !text.trim().is_empty() {
        return Some(text);
    }

    // HTML treats <link> as void, so an RSS link's URL ends up as the next text node
    link.next_sibling()
        .and_then(|node| node.value().as_text().map(|text| unwrap_cdata(text)))
}

/// Text of a field element, with CDATA sections unwrapped.
///
/// The HTML tree builder keeps `<![CDATA[...]]>` verbatim inside raw-text
/// elements such as `<title>` and turns it into a comment everywhere else.
fn field_text(element: ElementRef) -> String {
    let mut text = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(fragment) => text.push_str(fragment),
            Node::Comment(comment) => {
                if let Some(inner) = comment.strip_prefix("[CDATA[") {
                    text.push_str(inner.strip_suffix("]]").unwrap_or(inner));
                }
            }
            _ => {}
        }
    }

    unwrap_cdata(&text)
}

fn unwrap_cdata(text: &str) -> String {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("<![CDATA[")
        .map(|inner| inner.strip_suffix("]]>").unwrap_or(inner))
        .unwrap_or(trimmed)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRUNCATED_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Half a Blog</title>
    <link>https://example.com/</link>
    <description>Cut short</description>
    <item>
      <title>First</title>
      <link>https://example.com/first</link>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Second</title>
      <link>https://example.com/second</link>
      <category>misc</categry>
    </item>
    <item>
      <title>Cut off"#;

    const BROKEN_ATOM: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Blog</title>
  <subtitle>Notes</subtitle>
  <link rel="self" href="https://example.com/atom.xml"/>
  <link href="https://example.com/"/>
  <entry>
    <title>Atom Post</title>
    <link rel="edit" href="https://example.com/edit/1"/>
    <link rel="alternate" href="https://example.com/atom-post"/>
    <published>2024-02-01T00:00:00Z</published>
  </entry>
"#;

    #[test]
    fn test_salvages_rss_items() {
        let salvaged = salvage(TRUNCATED_RSS);

        assert_eq!(salvaged.entries.len(), 3);
        assert_eq!(salvaged.entries[0].get("title"), Some("First"));
        assert_eq!(
            salvaged.entries[0].get("link"),
            Some("https://example.com/first")
        );
        assert_eq!(
            salvaged.entries[0].get("pubDate"),
            Some("Mon, 01 Jan 2024 00:00:00 GMT")
        );
        assert_eq!(
            salvaged.entries[1].get("link"),
            Some("https://example.com/second")
        );
        assert_eq!(salvaged.entries[2].get("title"), Some("Cut off"));
        assert_eq!(salvaged.entries[2].get("link"), None);
    }

    #[test]
    fn test_salvages_rss_header() {
        let salvaged = salvage(TRUNCATED_RSS);

        assert_eq!(salvaged.header.get("title"), Some("Half a Blog"));
        assert_eq!(salvaged.header.get("link"), Some("https://example.com/"));
        assert_eq!(salvaged.header.get("description"), Some("Cut short"));
    }

    #[test]
    fn test_salvages_atom_alternate_links() {
        let salvaged = salvage(BROKEN_ATOM);

        assert_eq!(salvaged.header.get("link"), Some("https://example.com/"));
        assert_eq!(salvaged.header.get("subtitle"), Some("Notes"));
        assert_eq!(salvaged.entries.len(), 1);
        assert_eq!(
            salvaged.entries[0].get("link"),
            Some("https://example.com/atom-post")
        );
        assert_eq!(
            salvaged.entries[0].get("published"),
            Some("2024-02-01T00:00:00Z")
        );
    }

    #[test]
    fn test_unwraps_cdata_sections() {
        let broken = r#"<rss version="2.0"><channel>
<title><![CDATA[Tom & Jerry's Blog]]></title>
<item>
  <title><![CDATA[Hello & World]]></title>
  <link>https://example.com/hello</link>
  <description><![CDATA[Plain words]]></description>
  <category>x</categry>
</item>"#;
        let salvaged = salvage(broken);

        assert_eq!(salvaged.header.get("title"), Some("Tom & Jerry's Blog"));
        assert_eq!(salvaged.entries[0].get("title"), Some("Hello & World"));
        assert_eq!(salvaged.entries[0].get("description"), Some("Plain words"));
        assert_eq!(
            salvaged.entries[0].get("link"),
            Some("https://example.com/hello")
        );
    }

    #[test]
    fn test_keeps_permalink_guids_only() {
        let broken = r#"<rss version="2.0"><channel><title>T</title>
<item><title>One</title><guid isPermaLink="true">https://example.com/one</guid></item>
<item><title>Two</title><guid isPermaLink="false">https://example.com/two</guid></item>
<item><title>Three</title><guid>https://example.com/three</guid>"#;
        let salvaged = salvage(broken);

        assert_eq!(salvaged.entries[0].get("guid"), Some("https://example.com/one"));
        assert_eq!(salvaged.entries[1].get("guid"), None);
        assert_eq!(salvaged.entries[2].get("guid"), Some("https://example.com/three"));
    }

    #[test]
    fn test_plain_text_is_empty() {
        assert!(salvage("this is not a feed").is_empty());
    }
}
