use super::types::{EnrichmentResult, LinkConfig};

/// Channel line for one enrichment result. `None` for absent results.
pub fn format_reply(result: &EnrichmentResult, config: &LinkConfig) -> Option<String> {
    match result {
        EnrichmentResult::Title(title) => Some(format!("Title: {title}")),
        EnrichmentResult::Description(text) => Some(format!("{}{text}", config.description_prefix)),
        EnrichmentResult::MirrorLink(url) => Some(format!("See also: {url}")),
        EnrichmentResult::Absent => None,
    }
}

/// Channel lines for a message's results, in order.
pub fn format_replies(results: &[EnrichmentResult], config: &LinkConfig) -> Vec<String> {
    results
        .iter()
        .filter_map(|result| format_reply(result, config))
        .collect()
}
