//! Service layer for the GSLT listener.
//! - `model`: the `short name -> {GSLT, ConnString}` mapping and the POST payload.
//! - `repository`: the load/save capability the HTTP layer is handed.
//! - `file` / `memory`: JSON-file and in-process implementations of it.
//! - `server_cfg_service`: lookup and token rotation on top of a repository.

pub mod errors;
pub mod model;
pub mod repository;
pub mod storage;
pub mod file;
pub mod memory;
pub mod server_cfg_service;

pub use errors::ServiceError;
pub use model::{RotateOutcome, RotateRequest, ServerCfg, ServerEntry};
pub use repository::ServerCfgRepository;
pub use server_cfg_service::ServerCfgService;
