use regex::Regex;
use std::ops::Range;
use std::sync::Arc;

use super::registry::{DomainList, DomainRegistry};
use super::types::{Category, ExtractedLink};
use crate::error::RegistryError;

/// Compiled link patterns, one per category.
#[derive(Debug)]
pub struct CategoryPatterns {
    social: Regex,
    short_post: Regex,
    general: Regex,
}

impl CategoryPatterns {
    pub fn compile(
        social: &DomainList,
        short_post: &DomainList,
        general: &DomainList,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            social: build(social, |hosts| format!(r"(?i)https?://{hosts}/\S+"))?,
            short_post: build(short_post, |hosts| {
                format!(r"(?i)https?://{hosts}/\S+/status/\d+")
            })?,
            general: build(general, |hosts| {
                format!(r"(?i)https?://(?:www\.)?{hosts}/[a-z0-9@#%&+.=/?-]*")
            })?,
        })
    }

    pub fn pattern(&self, category: Category) -> &Regex {
        match category {
            Category::SocialPost => &self.social,
            Category::ShortPost => &self.short_post,
            Category::General => &self.general,
        }
    }

    /// All link occurrences in `text`, grouped by category priority and
    /// in message order within a category.
    ///
    /// An occurrence overlapping a span already claimed by a higher-priority
    /// category is dropped. Repeated links are kept.
    pub fn find_links(&self, text: &str) -> Vec<ExtractedLink> {
        let mut claimed: Vec<Range<usize>> = Vec::new();
        let mut links = Vec::new();

        for category in Category::ALL {
            for found in self.pattern(category).find_iter(text) {
                let span = found.range();
                if claimed.iter().any(|c| overlaps(c, &span)) {
                    continue;
                }
                claimed.push(span);
                links.push(ExtractedLink::new(found.as_str(), category));
            }
        }

        links
    }
}

/// Host part matching any listed domain or a subdomain of one. Entries are
/// literal hostname suffixes.
fn host_alternation(list: &DomainList) -> String {
    let domains = list
        .domains()
        .iter()
        .map(|d| regex::escape(d))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"(?:[a-z0-9-]+\.)*(?:{domains})")
}

fn build(list: &DomainList, template: impl Fn(&str) -> String) -> Result<Regex, RegistryError> {
    let pattern = template(&host_alternation(list));
    tracing::debug!(category = %list.category(), %pattern, "compiled link pattern");

    Regex::new(&pattern).map_err(|e| RegistryError::Pattern {
        category: list.category(),
        message: e.to_string(),
    })
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Extract categorized links from a chat message.
///
/// Pending reloads happen here, on the first message after the request.
/// A failed reload keeps the previous lists; with no lists at all nothing
/// matches.
pub async fn extract(message: &str, registry: &Arc<DomainRegistry>) -> Vec<ExtractedLink> {
    if registry.needs_reload() {
        tracing::info!("Refreshing domain lists");
        if let Err(e) = registry.reload().await {
            tracing::warn!(error = %e, "domain list reload failed, keeping previous lists");
        }
    }

    let Some(snapshot) = registry.snapshot() else {
        return Vec::new();
    };
    snapshot.patterns().find_links(message)
}
