pub mod fields;
pub mod salvage;

use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Feed, FeedType, Link};
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::FeedFailure;
use crate::domain::{FeedMetadata, PostRecord};

pub use fields::{first_field, FieldMap, FieldSource};

const LINK_FIELDS: &[&str] = &["link"];
/// Entry ids that double as the post URL when no link is given.
const PERMALINK_FIELDS: &[&str] = &["guid", "id"];
const TITLE_FIELDS: &[&str] = &["title"];
const PUBLISHED_FIELDS: &[&str] = &["published", "pubDate", "updated"];
const SUBTITLE_FIELDS: &[&str] = &["subtitle", "description"];

/// One feed-level or entry-level record, as handed over by the parser.
#[derive(Debug, Clone)]
pub enum RawRecord {
    /// Feed header from a strict parse, with its entries taken out.
    Channel(Box<Feed>),
    Entry(Box<Entry>),
    /// Fields recovered from a malformed document.
    Fields(FieldMap),
}

impl FieldSource for RawRecord {
    fn attribute(&self, name: &str) -> Option<String> {
        match self {
            Self::Channel(feed) => channel_attribute(feed, name),
            Self::Entry(entry) => entry_attribute(entry, name),
            Self::Fields(_) => None,
        }
    }

    fn key(&self, name: &str) -> Option<String> {
        match self {
            Self::Fields(fields) => fields.key(name),
            _ => None,
        }
    }
}

fn entry_attribute(entry: &Entry, name: &str) -> Option<String> {
    match name {
        "link" => primary_link(&entry.links),
        "title" => entry.title.as_ref().map(|t| t.content.clone()),
        "published" => entry.published.map(rfc2822),
        "updated" => entry.updated.map(rfc2822),
        // feed-rs files RSS <guid> and Atom <id> under the same field
        "guid" | "id" => Some(entry.id.clone()),
        _ => None,
    }
}

fn channel_attribute(feed: &Feed, name: &str) -> Option<String> {
    let is_atom = feed.feed_type == FeedType::Atom;
    match name {
        "link" => primary_link(&feed.links),
        "title" => feed.title.as_ref().map(|t| t.content.clone()),
        // feed-rs files Atom <subtitle> and RSS <description> under the same field
        "subtitle" if is_atom => feed.description.as_ref().map(|d| d.content.clone()),
        "description" if !is_atom => feed.description.as_ref().map(|d| d.content.clone()),
        _ => None,
    }
}

fn rfc2822(date: DateTime<Utc>) -> String {
    date.to_rfc2822()
}

/// The page link: first link without a rel or with rel="alternate", else the first link.
fn primary_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}

fn is_web_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// A parsed feed document.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub header: RawRecord,
    pub entries: Vec<RawRecord>,
}

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse a feed document, tolerating malformed input.
    ///
    /// A document the strict parser rejects is salvaged; it only fails when
    /// nothing feed-like can be recovered from it.
    pub fn parse(&self, body: &[u8]) -> Result<ParsedFeed, FeedFailure> {
        match parser::parse(body) {
            Ok(mut feed) => {
                let entries = std::mem::take(&mut feed.entries)
                    .into_iter()
                    .map(|entry| RawRecord::Entry(Box::new(entry)))
                    .collect();

                Ok(ParsedFeed {
                    header: RawRecord::Channel(Box::new(feed)),
                    entries,
                })
            }
            Err(e) => {
                tracing::warn!("Feed may be malformed. Error: {}", e);

                let salvaged = salvage::salvage(&String::from_utf8_lossy(body));
                if salvaged.is_empty() {
                    return Err(FeedFailure::Parse(e.to_string()));
                }

                tracing::debug!("Salvaged {} entries from malformed feed", salvaged.entries.len());

                Ok(ParsedFeed {
                    header: RawRecord::Fields(salvaged.header),
                    entries: salvaged.entries.into_iter().map(RawRecord::Fields).collect(),
                })
            }
        }
    }

    /// Map one raw entry to a post record. Never fails; validity is the caller's call.
    ///
    /// An entry without a link takes its id as the slug when the id is a web URL.
    pub fn normalize<S: FieldSource + ?Sized>(&self, entry: &S) -> PostRecord {
        let slug = first_field(entry, LINK_FIELDS)
            .or_else(|| first_field(entry, PERMALINK_FIELDS).filter(|id| is_web_url(id)));

        PostRecord {
            title: first_field(entry, TITLE_FIELDS).map(|t| decode_html_entities(&t).to_string()),
            slug,
            pub_date: first_field(entry, PUBLISHED_FIELDS),
        }
    }

    pub fn feed_metadata<S: FieldSource + ?Sized>(&self, header: &S) -> FeedMetadata {
        FeedMetadata {
            title: first_field(header, TITLE_FIELDS).map(|t| decode_html_entities(&t).to_string()),
            subtitle: first_field(header, SUBTITLE_FIELDS)
                .map(|s| decode_html_entities(&s).to_string()),
            link: first_field(header, LINK_FIELDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>https://example.com/</link>
    <description>A test feed</description>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <description>This is item 1</description>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>https://example.com/item2</link>
      <guid>item-2</guid>
      <description>This is item 2</description>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <subtitle>An Atom test feed</subtitle>
  <link rel="self" href="https://example.com/feed.atom"/>
  <link href="https://example.com/"/>
  <id>urn:example:feed</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <title>Atom Entry 1</title>
    <link href="https://example.com/atom1"/>
    <id>atom-entry-1</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <summary>This is Atom entry 1</summary>
  </entry>
</feed>"#;

    const MALFORMED_RSS: &str = r#"<rss version="2.0">
  <channel>
    <title>Broken & Feed</title>
    <item>
      <title>Survivor</title>
      <link>https://example.com/survivor</link>
      <category>misc</categry>
    </item>
"#;

    #[test]
    fn test_parse_rss() {
        let normalizer = Normalizer::new();
        let parsed = normalizer.parse(RSS_SAMPLE.as_bytes()).unwrap();

        assert!(matches!(parsed.header, RawRecord::Channel(_)));
        assert_eq!(parsed.entries.len(), 2);

        let first = normalizer.normalize(&parsed.entries[0]);
        assert_eq!(first.title, Some("Test Item 1".into()));
        assert_eq!(first.slug, Some("https://example.com/item1".into()));
        assert!(first
            .pub_date
            .as_deref()
            .is_some_and(|d| d.contains("Jan 2024 00:00:00")));

        let second = normalizer.normalize(&parsed.entries[1]);
        assert_eq!(second.slug, Some("https://example.com/item2".into()));
        assert_eq!(second.pub_date, None);
    }

    #[test]
    fn test_parse_atom_falls_back_to_updated() {
        let normalizer = Normalizer::new();
        let parsed = normalizer.parse(ATOM_SAMPLE.as_bytes()).unwrap();

        let entry = normalizer.normalize(&parsed.entries[0]);
        assert_eq!(entry.title, Some("Atom Entry 1".into()));
        assert_eq!(entry.slug, Some("https://example.com/atom1".into()));
        assert!(entry.pub_date.is_some());
    }

    #[test]
    fn test_rss_metadata_uses_description() {
        let normalizer = Normalizer::new();
        let parsed = normalizer.parse(RSS_SAMPLE.as_bytes()).unwrap();
        let meta = normalizer.feed_metadata(&parsed.header);

        assert_eq!(meta.title, Some("Test Feed".into()));
        assert_eq!(meta.subtitle, Some("A test feed".into()));
        assert_eq!(meta.link, Some("https://example.com/".into()));
    }

    #[test]
    fn test_atom_metadata_prefers_alternate_link() {
        let normalizer = Normalizer::new();
        let parsed = normalizer.parse(ATOM_SAMPLE.as_bytes()).unwrap();
        let meta = normalizer.feed_metadata(&parsed.header);

        assert_eq!(meta.title, Some("Atom Test Feed".into()));
        assert_eq!(meta.subtitle, Some("An Atom test feed".into()));
        assert_eq!(meta.link, Some("https://example.com/".into()));
    }

    #[test]
    fn test_malformed_feed_is_salvaged() {
        let normalizer = Normalizer::new();
        let parsed = normalizer.parse(MALFORMED_RSS.as_bytes()).unwrap();

        assert!(matches!(parsed.header, RawRecord::Fields(_)));
        let post = normalizer.normalize(&parsed.entries[0]);
        assert_eq!(post.title, Some("Survivor".into()));
        assert_eq!(post.slug, Some("https://example.com/survivor".into()));

        let meta = normalizer.feed_metadata(&parsed.header);
        assert_eq!(meta.title, Some("Broken & Feed".into()));
    }

    #[test]
    fn test_permalink_guid_stands_in_for_missing_link() {
        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Guid Feed</title>
    <item>
      <title>Guid only</title>
      <guid isPermaLink="true">https://blog.example.com/g</guid>
    </item>
    <item>
      <title>Opaque guid</title>
      <guid isPermaLink="false">post-42</guid>
    </item>
    <item>
      <title>Both</title>
      <link>https://blog.example.com/both</link>
      <guid>https://blog.example.com/?p=7</guid>
    </item>
  </channel>
</rss>"#;
        let normalizer = Normalizer::new();
        let parsed = normalizer.parse(feed.as_bytes()).unwrap();
        let slugs: Vec<_> = parsed
            .entries
            .iter()
            .map(|entry| normalizer.normalize(entry).slug)
            .collect();

        assert_eq!(
            slugs,
            vec![
                Some("https://blog.example.com/g".to_string()),
                None,
                Some("https://blog.example.com/both".to_string()),
            ]
        );
    }

    #[test]
    fn test_salvaged_guid_stands_in_for_missing_link() {
        let normalizer = Normalizer::new();
        let entry: FieldMap = [("title", "Guid only"), ("guid", "https://blog.example.com/g")]
            .into_iter()
            .collect();
        assert_eq!(
            normalizer.normalize(&entry).slug,
            Some("https://blog.example.com/g".into())
        );

        let entry: FieldMap = [("title", "Opaque"), ("guid", "post-42")].into_iter().collect();
        assert_eq!(normalizer.normalize(&entry).slug, None);
    }

    #[test]
    fn test_unrecoverable_document_fails() {
        let normalizer = Normalizer::new();
        let err = normalizer.parse(b"definitely not a feed").unwrap_err();
        assert!(matches!(err, FeedFailure::Parse(_)));
    }

    #[test]
    fn test_normalize_field_map_entry() {
        let normalizer = Normalizer::new();
        let entry: FieldMap = [
            ("title", "Caf&eacute; notes"),
            ("link", "https://example.com/cafe"),
            ("pubdate", "Tue, 02 Jan 2024 10:00:00 GMT"),
        ]
        .into_iter()
        .collect();

        let post = normalizer.normalize(&entry);
        assert_eq!(post.title, Some("Café notes".into()));
        assert_eq!(post.slug, Some("https://example.com/cafe".into()));
        assert_eq!(post.pub_date, Some("Tue, 02 Jan 2024 10:00:00 GMT".into()));
    }

    #[test]
    fn test_normalize_missing_fields_never_fails() {
        let normalizer = Normalizer::new();
        let post = normalizer.normalize(&FieldMap::new());
        assert_eq!(post, PostRecord::default());
        assert!(!post.is_listable());
    }
}
