use futures_util::future::join_all;
use reqwest::Client;
use reqwest::redirect::Policy;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use super::types::{Category, EnrichmentResult, ExtractedLink, LinkConfig};
use crate::error::LinkError;

/// Fetches per-category enrichment for extracted links.
///
/// Every failure degrades to [`EnrichmentResult::Absent`]; nothing here
/// returns an error to the message loop.
pub struct Enricher {
    client: Client,
    mirror_client: Client,
    mirror_base_url: String,
}

impl Enricher {
    pub fn new(config: &LinkConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::limited(5))
            .build()?;
        // A redirect from the mirror means it has no copy of the thread.
        let mirror_client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            mirror_client,
            mirror_base_url: config.mirror_base_url.clone(),
        })
    }

    /// Enrich a single link according to its category.
    pub async fn enrich(&self, link: &ExtractedLink) -> EnrichmentResult {
        let outcome = match link.category {
            Category::SocialPost => self
                .fetch_description(&link.url)
                .await
                .map(EnrichmentResult::Description),
            Category::ShortPost => self
                .find_mirror(&link.url)
                .await
                .map(EnrichmentResult::MirrorLink),
            Category::General => self.fetch_title(&link.url).await.map(EnrichmentResult::Title),
        };

        outcome.unwrap_or_else(|e| {
            tracing::debug!(url = %link.url, category = %link.category, error = %e, "link enrichment failed");
            EnrichmentResult::Absent
        })
    }

    /// Enrich every link of one message.
    ///
    /// Fetches run concurrently; results keep the order of `links`. Absent
    /// results are dropped and each mirror link is followed by the mirror
    /// page's title when it has one.
    pub async fn enrich_all(&self, links: &[ExtractedLink]) -> Vec<EnrichmentResult> {
        join_all(links.iter().map(|link| self.enrich_with_followup(link)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn enrich_with_followup(&self, link: &ExtractedLink) -> Vec<EnrichmentResult> {
        match self.enrich(link).await {
            EnrichmentResult::Absent => Vec::new(),
            EnrichmentResult::MirrorLink(mirror) => {
                let title = self.fetch_title(&mirror).await;
                let mut results = vec![EnrichmentResult::MirrorLink(mirror)];
                match title {
                    Ok(title) => results.push(EnrichmentResult::Title(title)),
                    Err(e) => tracing::debug!(error = %e, "mirror title unavailable"),
                }
                results
            }
            found => vec![found],
        }
    }

    /// Page `<title>` text.
    pub async fn fetch_title(&self, url: &str) -> Result<String, LinkError> {
        let body = self.fetch_body(url).await?;
        title_from_html(url, &body)
    }

    /// First line of the `og:description` preview field.
    pub async fn fetch_description(&self, url: &str) -> Result<String, LinkError> {
        let body = self.fetch_body(url).await?;
        description_from_html(url, &body)
    }

    /// Look up a reader mirror for a short-post thread.
    ///
    /// Only a direct success response counts; redirects are not followed.
    pub async fn find_mirror(&self, link: &str) -> Result<String, LinkError> {
        let mirror = mirror_url(&self.mirror_base_url, link);
        let response = self
            .mirror_client
            .get(&mirror)
            .send()
            .await
            .map_err(|source| LinkError::Fetch {
                url: mirror.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::Status {
                url: mirror,
                status,
            });
        }
        Ok(response.url().to_string())
    }

    async fn fetch_body(&self, url: &str) -> Result<String, LinkError> {
        let fetch_failed = |source: reqwest::Error| LinkError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.text().await.map_err(fetch_failed)
    }
}

/// Mirror URL for a short-post link: the final path segment is the thread id.
pub fn mirror_url(mirror_base_url: &str, link: &str) -> String {
    let thread_id = link.rsplit('/').next().unwrap_or_default();
    format!("{}/thread/{thread_id}", mirror_base_url.trim_end_matches('/'))
}

fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    document.select(&sel).next()
}

fn title_from_html(url: &str, html: &str) -> Result<String, LinkError> {
    let document = Html::parse_document(html);
    select_first(&document, "title")
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|t| !t.is_empty())
        .ok_or_else(|| LinkError::Parse {
            url: url.to_string(),
            missing: "title element",
        })
}

fn description_from_html(url: &str, html: &str) -> Result<String, LinkError> {
    let document = Html::parse_document(html);
    select_first(&document, r#"meta[property="og:description"]"#)
        .and_then(|el| el.value().attr("content"))
        .and_then(|content| content.trim().split(['\r', '\n']).next())
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .ok_or_else(|| LinkError::Parse {
            url: url.to_string(),
            missing: "og:description field",
        })
}
