use std::path::PathBuf;

use thiserror::Error;

use crate::links::Category;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `unax`.
///
/// Each subsystem defines its own error variant. The link pipeline recovers
/// from [`LinkError`] locally; the binary and the transport keep using
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum UnaxError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Domain registry ─────────────────────────────────────────────────
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    // ── Link enrichment ─────────────────────────────────────────────────
    #[error("link: {0}")]
    Link(#[from] LinkError),

    // ── Transport / Channel ─────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Domain registry errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{category} domain list unavailable ({source_name}): {reason}")]
    DomainListUnavailable {
        category: Category,
        source_name: String,
        reason: String,
    },

    #[error("{category} pattern failed to compile: {message}")]
    Pattern { category: Category, message: String },

    #[error("domain list reload task failed: {0}")]
    ReloadTask(String),
}

// ─── Link enrichment errors ─────────────────────────────────────────────────

/// Failures of a single enrichment fetch. Never escapes the enricher.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },

    #[error("{status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{url} has no {missing}")]
    Parse { url: String, missing: &'static str },
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{transport} not connected")]
    NotConnected { transport: String },

    #[error("{transport} connection failed: {message}")]
    Connection { transport: String, message: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, UnaxError>;
