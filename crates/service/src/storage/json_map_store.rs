use std::{
    collections::BTreeMap,
    marker::PhantomData,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};

use crate::errors::ServiceError;

/// Generic JSON file holding a single `BTreeMap<K, V>` object.
///
/// Nothing is cached: every `load` reads the whole file and every `save`
/// rewrites it. Saves go through a sibling `<file>.tmp` that is renamed over
/// the target, so readers never observe a half-written file.
#[derive(Debug, Clone)]
pub struct JsonMapFile<K, V> {
    file_path: PathBuf,
    _entries: PhantomData<fn() -> (K, V)>,
}

impl<K, V> JsonMapFile<K, V>
where
    K: Ord + serde::Serialize + serde::de::DeserializeOwned,
    V: serde::Serialize + serde::de::DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), _entries: PhantomData }
    }

    /// Read and parse the whole file. A missing file is an error, not an empty map.
    pub async fn load(&self) -> Result<BTreeMap<K, V>, ServiceError> {
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::load(&self.file_path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::load(&self.file_path, e))
    }

    /// Serialize the map (2-space pretty JSON) and replace the file with it.
    ///
    /// The temp file is synced to disk before the rename, so after a crash the
    /// target holds either the old or the new content in full.
    pub async fn save(&self, map: &BTreeMap<K, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(map).map_err(|e| ServiceError::save(&self.file_path, e))?;
        let tmp = self.temp_path();
        if let Err(e) = Self::write_synced(&tmp, &data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::save(&self.file_path, e));
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::save(&self.file_path, e));
        }
        Ok(())
    }

    async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        file.sync_all().await
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.file_path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}
