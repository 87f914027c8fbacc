use crate::errors::ServiceError;
use crate::model::ServerCfg;
use async_trait::async_trait;

/// Trait abstraction over where the server config lives.
/// Implementations can be file-backed, in-memory, or anything else that can
/// hand back and accept the whole mapping at once. No caching is expected:
/// `load` reflects the latest successful `save`.
#[async_trait]
pub trait ServerCfgRepository: Send + Sync {
    async fn load(&self) -> Result<ServerCfg, ServiceError>;
    async fn save(&self, cfg: &ServerCfg) -> Result<(), ServiceError>;
}
