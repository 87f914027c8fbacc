pub mod server_cfg_store;

pub use server_cfg_store::FileServerCfgStore;
