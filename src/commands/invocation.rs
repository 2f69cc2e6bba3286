//! The payload handed to an entry point across the process boundary.
//!
//! On the wire it is a single JSON array: the positional arguments followed
//! by one options object. Only the fields of [`CommandOptions`] cross.

use anyhow::{Result, anyhow, bail};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

pub const SCHEMA_VERSION: u32 = 1;

/// Options forwarded to an entry point.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommandOptions {
    pub schema_version: u32,
    /// Logical command name (`init`).
    pub name: String,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub debug: bool,
}

impl CommandOptions {
    pub fn new(name: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name: name.to_string(),
            force: false,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub options: CommandOptions,
}

/// Options keep their declared field order on the wire.
impl Serialize for Invocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.args.len() + 1))?;
        for arg in &self.args {
            seq.serialize_element(arg)?;
        }
        seq.serialize_element(&self.options)?;
        seq.end()
    }
}

impl Invocation {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(payload: &str) -> Result<Self> {
        let mut values: Vec<Value> = serde_json::from_str(payload)?;
        let options = values
            .pop()
            .ok_or_else(|| anyhow!("payload has no options object"))?;
        let options: CommandOptions = serde_json::from_value(options)?;
        if options.schema_version != SCHEMA_VERSION {
            bail!(
                "unsupported payload schema version {} (expected {})",
                options.schema_version,
                SCHEMA_VERSION
            );
        }

        let args = values
            .into_iter()
            .map(|value| match value {
                Value::String(s) => Ok(s),
                other => Err(anyhow!("positional argument is not a string: {}", other)),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { args, options })
    }
}
