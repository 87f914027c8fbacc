use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Backing file missing, unreadable or not a map of entries.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(String),
    #[error("failed to save configuration: {0}")]
    ConfigSave(String),
    /// POST body that is not `{ "GSLT": string, "ConnString": string }`.
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// More than one short name holds the posted token; carries the short names.
    #[error("token is held by more than one server: {0}")]
    DuplicateToken(String),
}

impl ServiceError {
    pub fn load(path: &std::path::Path, cause: impl std::fmt::Display) -> Self {
        Self::ConfigLoad(format!("{}: {}", path.display(), cause))
    }

    pub fn save(path: &std::path::Path, cause: impl std::fmt::Display) -> Self {
        Self::ConfigSave(format!("{}: {}", path.display(), cause))
    }
}
