//! In-process `ServerCfgRepository`, for tests and embedding.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::model::ServerCfg;
use crate::repository::ServerCfgRepository;

#[derive(Debug, Default)]
pub struct InMemoryServerCfgStore {
    cfg: RwLock<ServerCfg>,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
}

impl InMemoryServerCfgStore {
    pub fn new(cfg: ServerCfg) -> Self {
        Self { cfg: RwLock::new(cfg), ..Default::default() }
    }

    /// Make subsequent `load` calls fail with `ConfigLoad`.
    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `save` calls fail with `ConfigSave`.
    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> ServerCfg {
        self.cfg.read().await.clone()
    }
}

#[async_trait::async_trait]
impl ServerCfgRepository for InMemoryServerCfgStore {
    async fn load(&self) -> Result<ServerCfg, ServiceError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(ServiceError::ConfigLoad("in-memory store set to fail".into()));
        }
        Ok(self.cfg.read().await.clone())
    }

    async fn save(&self, cfg: &ServerCfg) -> Result<(), ServiceError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(ServiceError::ConfigSave("in-memory store set to fail".into()));
        }
        *self.cfg.write().await = cfg.clone();
        Ok(())
    }
}
