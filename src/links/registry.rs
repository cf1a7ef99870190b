use arc_swap::ArcSwapOption;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::extractor::CategoryPatterns;
use super::types::Category;
use crate::error::RegistryError;

/// Where one category's domain list comes from.
#[derive(Debug, Clone)]
pub enum DomainSource {
    /// Newline-separated file, re-read on every reload.
    File(PathBuf),
    /// Fixed list baked into the configuration.
    Static(Vec<String>),
}

impl DomainSource {
    fn name(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Static(_) => "static list".to_string(),
        }
    }

    fn read(&self) -> std::io::Result<String> {
        match self {
            Self::File(path) => std::fs::read_to_string(path),
            Self::Static(domains) => Ok(domains.join("\n")),
        }
    }
}

/// One source per category.
#[derive(Debug, Clone)]
pub struct DomainSources {
    pub social: DomainSource,
    pub short_post: DomainSource,
    pub general: DomainSource,
}

impl DomainSources {
    pub fn get(&self, category: Category) -> &DomainSource {
        match category {
            Category::SocialPost => &self.social,
            Category::ShortPost => &self.short_post,
            Category::General => &self.general,
        }
    }
}

/// Ordered, lower-cased domain names for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainList {
    category: Category,
    domains: Vec<String>,
}

impl DomainList {
    /// Parse a newline-separated list. Blank lines and `#` comments are skipped.
    pub fn parse(category: Category, text: &str) -> Self {
        let domains = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_ascii_lowercase)
            .collect();
        Self { category, domains }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Immutable set of all three lists plus their compiled patterns.
///
/// Replaced wholesale on reload; readers holding an `Arc` keep the
/// snapshot they started with.
#[derive(Debug)]
pub struct DomainSnapshot {
    social: DomainList,
    short_post: DomainList,
    general: DomainList,
    patterns: CategoryPatterns,
}

impl DomainSnapshot {
    pub fn build(
        social: DomainList,
        short_post: DomainList,
        general: DomainList,
    ) -> Result<Self, RegistryError> {
        let patterns = CategoryPatterns::compile(&social, &short_post, &general)?;
        Ok(Self {
            social,
            short_post,
            general,
            patterns,
        })
    }

    pub fn list(&self, category: Category) -> &DomainList {
        match category {
            Category::SocialPost => &self.social,
            Category::ShortPost => &self.short_post,
            Category::General => &self.general,
        }
    }

    pub fn patterns(&self) -> &CategoryPatterns {
        &self.patterns
    }

    /// Content equality of the lists, ignoring compiled state.
    pub fn same_lists(&self, other: &Self) -> bool {
        self.social == other.social
            && self.short_post == other.short_post
            && self.general == other.general
    }
}

/// Live-reloadable domain lists.
///
/// The active snapshot sits in an `ArcSwapOption` so extraction never
/// blocks and a reload swaps the whole set at once. The refresh flag
/// starts set: the first use loads the lists.
pub struct DomainRegistry {
    sources: DomainSources,
    snapshot: ArcSwapOption<DomainSnapshot>,
    refresh: AtomicBool,
}

impl DomainRegistry {
    pub fn new(sources: DomainSources) -> Self {
        Self {
            sources,
            snapshot: ArcSwapOption::empty(),
            refresh: AtomicBool::new(true),
        }
    }

    /// Registry pre-loaded from fixed lists. Never needs a reload.
    pub fn from_static(
        social: Vec<String>,
        short_post: Vec<String>,
        general: Vec<String>,
    ) -> Result<Self, RegistryError> {
        let registry = Self::new(DomainSources {
            social: DomainSource::Static(social),
            short_post: DomainSource::Static(short_post),
            general: DomainSource::Static(general),
        });
        registry.load()?;
        Ok(registry)
    }

    /// Read all three sources and swap in a fresh snapshot.
    ///
    /// On any failure the previous snapshot stays active and the refresh
    /// flag stays set, so the next message retries.
    pub fn load(&self) -> Result<Arc<DomainSnapshot>, RegistryError> {
        let social = self.read_list(Category::SocialPost)?;
        let short_post = self.read_list(Category::ShortPost)?;
        let general = self.read_list(Category::General)?;

        let fresh = Arc::new(DomainSnapshot::build(social, short_post, general)?);
        self.snapshot.store(Some(Arc::clone(&fresh)));
        self.mark_reloaded();

        tracing::info!(
            social = fresh.social.domains().len(),
            short_post = fresh.short_post.domains().len(),
            general = fresh.general.domains().len(),
            "domain lists loaded"
        );
        Ok(fresh)
    }

    /// [`Self::load`] on the blocking pool, for callers on the runtime.
    pub async fn reload(self: &Arc<Self>) -> Result<Arc<DomainSnapshot>, RegistryError> {
        let registry = Arc::clone(self);
        tokio::task::spawn_blocking(move || registry.load())
            .await
            .map_err(|e| RegistryError::ReloadTask(e.to_string()))?
    }

    fn read_list(&self, category: Category) -> Result<DomainList, RegistryError> {
        let source = self.sources.get(category);
        let unavailable = |reason: String| RegistryError::DomainListUnavailable {
            category,
            source_name: source.name(),
            reason,
        };

        let text = source.read().map_err(|e| unavailable(e.to_string()))?;
        let list = DomainList::parse(category, &text);
        if list.is_empty() {
            return Err(unavailable("no domains listed".to_string()));
        }
        Ok(list)
    }

    pub fn needs_reload(&self) -> bool {
        self.refresh.load(Ordering::Acquire)
    }

    pub fn request_reload(&self) {
        self.refresh.store(true, Ordering::Release);
    }

    pub fn mark_reloaded(&self) {
        self.refresh.store(false, Ordering::Release);
    }

    /// Current snapshot, `None` until the first successful load.
    pub fn snapshot(&self) -> Option<Arc<DomainSnapshot>> {
        self.snapshot.load_full()
    }
}
