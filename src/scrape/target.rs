//! Fetch targets built from URL templates

/// Placeholder for the language key in the topic page template
pub const ENTITY_PLACEHOLDER: &str = "%entity%";

/// Placeholder for the topic in the listing template
pub const TOPIC_PLACEHOLDER: &str = "%topic%";

/// Placeholder for the page number in the listing template
pub const PAGE_PLACEHOLDER: &str = "%page%";

/// One unit of work for the scrape engine: a result key and the URL to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    key: String,
    url: String,
}

impl Target {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
        }
    }

    /// Target for one language's topic page
    pub fn entity(template: &str, name: &str) -> Self {
        Self::new(name, template.replace(ENTITY_PLACEHOLDER, name))
    }

    /// Target for one page of a topic listing, keyed by the page number
    pub fn page(template: &str, topic: &str, page: u32) -> Self {
        let url = template
            .replace(TOPIC_PLACEHOLDER, topic)
            .replace(PAGE_PLACEHOLDER, &page.to_string());
        Self::new(page.to_string(), url)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Targets for pages `1..=max_pages` of a topic listing
///
/// Numbering starts at 1: upstream serves page 1 for page 0, so starting at
/// 0 would count the first page twice.
pub fn listing_targets(template: &str, topic: &str, max_pages: u32) -> Vec<Target> {
    (1..=max_pages)
        .map(|page| Target::page(template, topic, page))
        .collect()
}
