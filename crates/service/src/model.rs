use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ServiceError;

const TOKEN_FIELD: &str = "GSLT";
const CONN_FIELD: &str = "ConnString";

/// Typed view of one registered game server in `ServerCfg.json`.
/// Fields other than `GSLT` / `ConnString` are carried in `extra`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ServerEntry {
    #[serde(rename = "GSLT")]
    pub token: String,
    #[serde(rename = "ConnString", default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerEntry {
    pub fn new(token: impl Into<String>, connection_string: Option<String>) -> Self {
        Self { token: token.into(), connection_string, extra: Map::new() }
    }

    fn into_value(self) -> Value {
        let mut obj = self.extra;
        obj.insert(TOKEN_FIELD.to_string(), Value::String(self.token));
        if let Some(cs) = self.connection_string {
            obj.insert(CONN_FIELD.to_string(), Value::String(cs));
        }
        Value::Object(obj)
    }
}

/// `short name -> entry`, the whole content of the backing file.
///
/// Entries are kept as raw JSON and only interpreted when read or rotated, so
/// an odd or extended entry neither breaks lookups of the others nor loses
/// fields when the file is rewritten.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ServerCfg(BTreeMap<String, Value>);

impl ServerCfg {
    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    /// Typed entry under `short_name`; `None` when absent or not entry-shaped.
    pub fn get(&self, short_name: &str) -> Option<ServerEntry> {
        self.0
            .get(short_name)
            .and_then(|raw| serde_json::from_value(raw.clone()).ok())
    }

    pub fn insert(&mut self, short_name: impl Into<String>, entry: ServerEntry) -> Option<Value> {
        self.0.insert(short_name.into(), entry.into_value())
    }

    /// Connection string registered under `short_name`, if any.
    pub fn connection_string(&self, short_name: &str) -> Option<&str> {
        self.0.get(short_name)?.get(CONN_FIELD)?.as_str()
    }

    /// Short names whose entry carries `token`.
    pub fn holders_of(&self, token: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, raw)| raw.get(TOKEN_FIELD).and_then(Value::as_str) == Some(token))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Replace the entry holding `req.token` with a fresh `{GSLT, ConnString}`
    /// under the same short name. Other entries are left exactly as loaded.
    ///
    /// Never inserts: an unknown token leaves the map untouched and yields `NotFound`.
    /// A token held by several entries is refused.
    pub fn rotate(&mut self, req: RotateRequest) -> Result<RotateOutcome, ServiceError> {
        let short_name = match self.holders_of(&req.token).as_slice() {
            [] => return Ok(RotateOutcome::NotFound),
            [single] => single.to_string(),
            many => return Err(ServiceError::DuplicateToken(many.join(", "))),
        };
        self.0.remove(&short_name);
        self.insert(
            short_name.clone(),
            ServerEntry::new(req.token, Some(req.connection_string)),
        );
        Ok(RotateOutcome::Updated { short_name })
    }
}

impl From<BTreeMap<String, Value>> for ServerCfg {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self(entries)
    }
}

/// POST payload: `{ "GSLT": "...", "ConnString": "..." }`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RotateRequest {
    #[serde(rename = "GSLT")]
    pub token: String,
    #[serde(rename = "ConnString")]
    pub connection_string: String,
}

impl RotateRequest {
    pub fn parse(body: &[u8]) -> Result<Self, ServiceError> {
        serde_json::from_slice(body).map_err(|e| ServiceError::InvalidData(e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RotateOutcome {
    Updated { short_name: String },
    NotFound,
}
