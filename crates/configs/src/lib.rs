use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STORE_PATH: &str = "ServerCfg.json";
const DEFAULT_WORKER_THREADS: usize = 4;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: DEFAULT_HOST.into(), port: DEFAULT_PORT, worker_threads: Some(DEFAULT_WORKER_THREADS) }
    }
}

/// Location of the `short name -> {GSLT, ConnString}` JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: DEFAULT_STORE_PATH.into() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> String { DEFAULT_HOST.into() }
fn default_port() -> u16 { DEFAULT_PORT }
fn default_store_path() -> String { DEFAULT_STORE_PATH.into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `$CONFIG_PATH`); fall back to environment variables
    /// when the file cannot be read.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if e.downcast_ref::<std::io::Error>().is_some() => {
                Self::from_env_with(|key| std::env::var(key).ok())
            }
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Build a config from `LISTENER_HOST`, `LISTENER_PORT`, `SERVER_CFG_PATH`,
    /// `TOKIO_WORKER_THREADS` and `LOG_FORMAT`, using `lookup` to read each key.
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();
        if let Some(host) = lookup("LISTENER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = lookup("LISTENER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        if let Some(path) = lookup("SERVER_CFG_PATH") {
            cfg.store.path = path;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            cfg.logging.json = format.eq_ignore_ascii_case("json");
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.normalize();
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = DEFAULT_HOST.to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(DEFAULT_WORKER_THREADS),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StoreConfig {
    fn normalize(&mut self) {
        if self.path.trim().is_empty() {
            self.path = DEFAULT_STORE_PATH.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_toml_uses_defaults() -> Result<()> {
        let mut cfg = parse("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.store.path, "ServerCfg.json");
        assert!(!cfg.logging.json);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
        Ok(())
    }

    #[test]
    fn toml_sections_override_defaults() -> Result<()> {
        let cfg = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8088

            [store]
            path = "data/servers.json"

            [logging]
            json = true
            "#,
        )?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8088);
        assert_eq!(cfg.store.path, "data/servers.json");
        assert!(cfg.logging.json);
        Ok(())
    }

    #[test]
    fn normalize_fills_blank_values_and_rejects_port_zero() -> Result<()> {
        let mut cfg = parse(
            r#"
            [server]
            host = "  "
            port = 3000
            worker_threads = 0

            [store]
            path = ""
            "#,
        )?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.store.path, "ServerCfg.json");

        let mut bad = parse("[server]\nport = 0\n")?;
        assert!(bad.normalize_and_validate().is_err());
        Ok(())
    }

    #[test]
    fn env_lookup_fills_config() {
        let vars: HashMap<&str, &str> = [
            ("LISTENER_HOST", "10.0.0.5"),
            ("LISTENER_PORT", "4000"),
            ("SERVER_CFG_PATH", "/srv/ServerCfg.json"),
            ("TOKIO_WORKER_THREADS", "2"),
            ("LOG_FORMAT", "JSON"),
        ]
        .into_iter()
        .collect();
        let cfg = AppConfig::from_env_with(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.bind_addr(), "10.0.0.5:4000");
        assert_eq!(cfg.store.path, "/srv/ServerCfg.json");
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert!(cfg.logging.json);
    }

    #[test]
    fn unparsable_env_port_keeps_default() {
        let cfg = AppConfig::from_env_with(|k| (k == "LISTENER_PORT").then(|| "http".to_string()));
        assert_eq!(cfg.server.port, 3000);
    }
}
