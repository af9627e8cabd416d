//! Pretty-printing of dumped values.
//!
//! The serializer produces plain text; the panel template escapes it, so
//! implementations never need to think about HTML.

use crate::dump::DumpValue;
use crate::error::{MultiDumpError, Result};

/// Turns a dumped value into display text
pub trait ValueSerializer: Send + Sync {
    fn serialize(&self, value: &dyn DumpValue) -> Result<String>;
}

/// Pretty JSON via `serde_json`.
///
/// Bare strings are shown without surrounding quotes so `Debugged` output
/// and plain messages read naturally.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl ValueSerializer for JsonSerializer {
    fn serialize(&self, value: &dyn DumpValue) -> Result<String> {
        let json = value.to_json().map_err(|e| MultiDumpError::Serialize {
            type_name: value.type_name(),
            message: e.to_string(),
        })?;
        match json {
            serde_json::Value::String(s) => Ok(s),
            other => serde_json::to_string_pretty(&other).map_err(|e| MultiDumpError::Serialize {
                type_name: value.type_name(),
                message: e.to_string(),
            }),
        }
    }
}
