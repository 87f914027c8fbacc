use std::path::PathBuf;

use serde_json::Value;

use crate::errors::ServiceError;
use crate::model::ServerCfg;
use crate::repository::ServerCfgRepository;
use crate::storage::json_map_store::JsonMapFile;

/// `ServerCfg.json` on disk, read and written whole on every call.
/// Only the top level must be a JSON object; entries are kept verbatim.
#[derive(Debug, Clone)]
pub struct FileServerCfgStore {
    file: JsonMapFile<String, Value>,
}

impl FileServerCfgStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file: JsonMapFile::new(path) }
    }
}

#[async_trait::async_trait]
impl ServerCfgRepository for FileServerCfgStore {
    async fn load(&self) -> Result<ServerCfg, ServiceError> {
        self.file.load().await.map(ServerCfg::from)
    }

    async fn save(&self, cfg: &ServerCfg) -> Result<(), ServiceError> {
        self.file.save(cfg.entries()).await
    }
}
