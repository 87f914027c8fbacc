use std::{future::Future, sync::Arc};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::model::{RotateOutcome, RotateRequest};
use crate::repository::ServerCfgRepository;

/// Lookup and token rotation over an injected repository.
///
/// Every call loads the mapping afresh. Rotations are serialized through a
/// single writer lock held from `load` to `save`, so two concurrent POSTs can
/// not both start from the same snapshot and drop each other's change.
pub struct ServerCfgService {
    repo: Arc<dyn ServerCfgRepository>,
    write_lock: Mutex<()>,
}

impl ServerCfgService {
    pub fn new(repo: Arc<dyn ServerCfgRepository>) -> Self {
        Self { repo, write_lock: Mutex::new(()) }
    }

    /// Connection string for `server`, or an empty string when the short name
    /// is missing, unknown, or has none.
    pub async fn lookup(&self, server: Option<&str>) -> Result<String, ServiceError> {
        let cfg = self.repo.load().await?;
        let conn = server.and_then(|name| cfg.connection_string(name)).unwrap_or_default();
        Ok(conn.to_string())
    }

    /// Apply a raw POST body: `{ "GSLT": ..., "ConnString": ... }`.
    pub async fn rotate(&self, body: &[u8]) -> Result<RotateOutcome, ServiceError> {
        self.rotate_with(|| async move { Ok(body) }).await
    }

    /// Like `rotate`, but the body is only fetched once the store has loaded.
    ///
    /// A broken store is therefore reported ahead of a broken or oversized
    /// body. Nothing is written unless exactly one entry holds the token.
    pub async fn rotate_with<F, Fut, B>(&self, read_body: F) -> Result<RotateOutcome, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<B, ServiceError>>,
        B: AsRef<[u8]>,
    {
        let _writer = self.write_lock.lock().await;
        let mut cfg = self.repo.load().await?;
        let body = read_body().await?;
        let req = RotateRequest::parse(body.as_ref())?;

        let outcome = cfg.rotate(req)?;
        match &outcome {
            RotateOutcome::Updated { short_name } => {
                self.repo.save(&cfg).await?;
                info!(event = "rotate", %short_name, "connection string updated");
            }
            RotateOutcome::NotFound => {
                warn!(event = "rotate", "no server holds the posted token");
            }
        }
        Ok(outcome)
    }

    /// Load and discard; used where only the store's health matters.
    pub async fn check_loadable(&self) -> Result<(), ServiceError> {
        self.repo.load().await.map(|_| ())
    }
}
