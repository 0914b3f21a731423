//! Shared state handed to every request handler.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use access::TokenAuthority;
use anyhow::{Context, Result};

use crate::config::Config;

/// Shared server state.
///
/// Cloning is cheap; the token authority is shared between clones.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Canonical share root.
    pub root: PathBuf,
    /// Directory holding static assets.
    pub static_dir: PathBuf,
    /// Upload credentials.
    pub tokens: Arc<TokenAuthority>,
    /// Largest accepted upload body in bytes.
    pub max_upload_size: usize,
}

impl AppState {
    /// Create state for `root`, creating the directory if it is missing.
    pub fn new(root: impl Into<PathBuf>, tokens: TokenAuthority) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create share root: {}", root.display()))?;
        let root = fs::canonicalize(&root)
            .with_context(|| format!("Failed to resolve share root: {}", root.display()))?;

        let defaults = Config::default();
        Ok(Self {
            root,
            static_dir: defaults.storage.static_dir.clone(),
            tokens: Arc::new(tokens),
            max_upload_size: defaults.max_upload_bytes(),
        })
    }

    /// Set the static asset directory.
    pub fn with_static_dir(mut self, static_dir: impl Into<PathBuf>) -> Self {
        self.static_dir = static_dir.into();
        self
    }

    /// Set the upload body limit.
    pub fn with_max_upload_size(mut self, max_upload_size: usize) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }

    /// Build state from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tokens = TokenAuthority::new(
            config.tokens.upload_token.as_deref(),
            config.tokens.super_token.as_deref(),
        );

        let static_dir = &config.storage.static_dir;
        if let Err(e) = fs::create_dir_all(static_dir) {
            tracing::warn!("Failed to create static directory {:?}: {}", static_dir, e);
        }

        Ok(Self::new(&config.storage.root, tokens)?
            .with_static_dir(static_dir)
            .with_max_upload_size(config.max_upload_bytes()))
    }
}
