use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One attribute mapping of a custom inventory entry.
pub type Attributes = BTreeMap<String, String>;

/// Normalized inventory item handed to the reporting pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryItem {
    pub name: String,
    pub schema_version: String,
    pub capture_time: String, // RFC 3339, UTC, e.g. 2016-07-30T18:15:37Z
    pub content: Vec<Attributes>, // zero or one entry for custom inventory
}

/// Raw shape of a custom inventory fragment file.
///
/// Field names match case-insensitively. Missing or `null` string fields
/// decode as empty so the validator can report them with a precise error
/// instead of a generic decode failure.
#[derive(Debug, Clone, Default)]
pub struct CustomInventoryItem {
    pub type_name: String,
    pub schema_version: String,
    pub content: Option<Value>,
}

impl CustomInventoryItem {
    /// Builds the record from the top-level fields of a fragment object.
    ///
    /// # Errors
    ///
    /// Fails when `TypeName` or `SchemaVersion` holds something other than a
    /// string or `null`.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        Ok(Self {
            type_name: string_field(fields, "TypeName")?,
            schema_version: string_field(fields, "SchemaVersion")?,
            content: match lookup_field(fields, "Content") {
                None | Some(Value::Null) => None,
                Some(value) => Some(value.clone()),
            },
        })
    }
}

/// Looks up `name` in a JSON object, preferring an exact key and falling back
/// to an ASCII case-insensitive match.
pub(crate) fn lookup_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).or_else(|| {
        fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// String field of a JSON object; absent or `null` reads as empty.
pub(crate) fn string_field(
    fields: &Map<String, Value>,
    name: &str,
) -> Result<String, serde_json::Error> {
    match lookup_field(fields, name) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "field {name} must be a string, found {other}"
        ))),
    }
}
