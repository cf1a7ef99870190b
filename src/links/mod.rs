pub mod enricher;
pub mod extractor;
pub mod registry;
pub mod reply;
pub mod types;

pub use enricher::{Enricher, mirror_url};
pub use extractor::{CategoryPatterns, extract};
pub use registry::{DomainList, DomainRegistry, DomainSnapshot, DomainSource, DomainSources};
pub use reply::{format_replies, format_reply};
pub use types::{Category, EnrichmentResult, ExtractedLink, LinkConfig};
