use ::scraper::{ElementRef, Html, Selector};

use crate::app::{BlogError, Result};
use crate::scraper::ScraperConfig;

const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Pulls readable text out of a post page
pub struct ContentExtractor {
    content: Selector,
    skip_tags: Vec<String>,
}

impl ContentExtractor {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let content = Selector::parse(&config.content_selector).map_err(|e| {
            BlogError::Configuration(format!(
                "invalid content selector {:?}: {}",
                config.content_selector, e
            ))
        })?;

        Ok(Self {
            content,
            skip_tags: config.skip_tags.clone(),
        })
    }

    /// Text of the primary content region if it has any, otherwise of the
    /// body (or the whole document when there is no body).
    ///
    /// Text fragments are trimmed, empty ones dropped, and the rest joined
    /// with a blank line.
    pub fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        if let Some(region) = document.select(&self.content).next() {
            let text = self.text_of(region);
            if !text.is_empty() {
                return text;
            }
        }

        let root = document.root_element();
        let body = root
            .children()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "body")
            .unwrap_or(root);

        self.text_of(body)
    }

    fn text_of(&self, element: ElementRef) -> String {
        element
            .descendants()
            .filter_map(|node| {
                let text = node.value().as_text()?;
                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| self.skip_tags.iter().any(|t| t == e.name()))
                });
                (!hidden).then(|| text.trim())
            })
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join(FRAGMENT_SEPARATOR)
    }
}
