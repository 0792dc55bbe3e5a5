//! Low-level discovery (LLD) output
//!
//! The monitoring agent expects discovery results as
//! `{"data": [{"{#MACRO}": "value", ...}, ...]}` where every macro name is the
//! uppercased dimension name with `-` replaced by `_`.

use crate::dimension::Assignment;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Macro key for a dimension name: `status-code` → `{#STATUS_CODE}`
pub fn macro_key(name: &str) -> String {
    format!("{{#{}}}", name.to_uppercase().replace('-', "_"))
}

/// One discovery row, keys in assignment order
struct Row<'a>(&'a Assignment);

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let pairs = self.0.pairs();
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for (name, value) in pairs {
            map.serialize_entry(&macro_key(name.as_str()), value.as_str())?;
        }
        map.end()
    }
}

struct Rows<'a>(&'a [Assignment]);

impl Serialize for Rows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(Row))
    }
}

struct Document<'a>(&'a [Assignment]);

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut doc = serializer.serialize_struct("Document", 1)?;
        doc.serialize_field("data", &Rows(self.0))?;
        doc.end()
    }
}

/// Render assignments as a discovery document
pub fn render(assignments: &[Assignment]) -> serde_json::Result<String> {
    serde_json::to_string(&Document(assignments))
}

/// Parsed form of a discovery document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDocument {
    pub data: Vec<BTreeMap<String, String>>,
}

impl DiscoveryDocument {
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
