use serde::{Deserialize, Serialize};
use strum::Display;

/// Platform category of a matched link, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// Social posts whose preview description is quoted back.
    SocialPost,
    /// Short-post threads (`/status/<id>`) looked up on a reader mirror.
    ShortPost,
    /// Any other approved domain; the page title is posted.
    General,
}

impl Category {
    /// All categories, highest matching priority first.
    pub const ALL: [Category; 3] = [Category::SocialPost, Category::ShortPost, Category::General];
}

/// One matching occurrence of a URL in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub url: String,
    pub category: Category,
}

impl ExtractedLink {
    pub fn new(url: impl Into<String>, category: Category) -> Self {
        Self {
            url: url.into(),
            category,
        }
    }
}

/// Outcome of enriching a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentResult {
    Title(String),
    Description(String),
    MirrorLink(String),
    Absent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// User agent sent with page fetches; some hosts reject default agents.
    pub user_agent: String,
    /// Upper bound for every outbound request.
    pub timeout_secs: u64,
    /// Reader mirror queried for short-post threads.
    pub mirror_base_url: String,
    /// Text placed before a quoted social-post description.
    pub description_prefix: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 5,
            mirror_base_url: "https://threadreaderapp.com".to_string(),
            description_prefix: String::new(),
        }
    }
}
