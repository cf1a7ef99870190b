pub mod schema;

pub use schema::{Config, DEFAULT_CONFIG_FILE, DomainsConfig, LifecycleConfig};
