use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure for lang-pulse
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub languages: LanguagesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Addresses of the two scraped sources
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Page holding the ranked top 20 table
    #[serde(rename = "ranking-url")]
    pub ranking_url: String,

    /// Per-language topic page, `%entity%` is replaced by the language key
    #[serde(rename = "entity-url")]
    pub entity_url: String,

    /// Paginated topic listing, `%topic%` and `%page%` are substituted
    #[serde(rename = "topic-url")]
    pub topic_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            ranking_url: "https://www.tiobe.com/tiobe-index/".to_string(),
            entity_url: "https://github.com/topics/%entity%".to_string(),
            topic_url: "https://github.com/topics/%topic%?o=desc&page=%page%".to_string(),
        }
    }
}

/// Scrape engine behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Delays before each retry on a non-success status (milliseconds)
    #[serde(rename = "retry-delays-ms")]
    pub retry_delays_ms: Vec<u64>,

    /// Maximum number of fetches in flight
    #[serde(rename = "max-parallel")]
    pub max_parallel: usize,

    /// Number of listing pages read by the interest scrape
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Topic browsed by the interest scrape
    pub interest: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Display name to URL slug
    pub aliases: HashMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        let aliases = [
            ("C++", "cpp"),
            ("C#", "csharp"),
            ("Delphi/Object Pascal", "delphi"),
            ("Classic Visual Basic", "visual-basic"),
        ]
        .into_iter()
        .map(|(name, slug)| (name.to_string(), slug.to_string()))
        .collect();

        Self {
            retry_delays_ms: vec![300, 600, 1200],
            max_parallel: 5,
            max_pages: 10,
            interest: "sort".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            aliases,
        }
    }
}

/// Language list selection
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LanguagesConfig {
    /// Skip the ranking scrape and use `list` instead
    #[serde(rename = "use-fixed-list")]
    pub use_fixed_list: bool,

    pub list: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the `name,count` result file
    #[serde(rename = "result-path")]
    pub result_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_path: "resultado.txt".to_string(),
        }
    }
}
