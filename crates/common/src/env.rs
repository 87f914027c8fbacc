//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the listener binds.

use std::path::Path;

use tracing::{info, warn};

/// Report whether the backing store file is present.
///
/// A missing or unreadable file is not fatal here: every request loads the file
/// again and answers 500 until it shows up. Returns whether the file exists.
pub async fn check_store_file(path: &str) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {
            info!(%path, bytes = meta.len(), "server config file found");
            true
        }
        Ok(_) => {
            warn!(%path, "server config path is not a regular file; requests will fail with 500");
            false
        }
        Err(e) => {
            warn!(%path, error = %e, "server config file not found; requests will fail with 500");
            false
        }
    }
}

/// Ensure the directory that will hold the store file exists.
pub async fn ensure_store_dir(path: &str) -> std::io::Result<()> {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}
