//! Fragment parsing and schema validation.
//!
//! [`convert_to_item`] runs a fixed sequence of checks over one fragment and
//! stops at the first failure:
//!
//! 1. JSON decode
//! 2. `TypeName` (non-empty, length, `Custom:` prefix)
//! 3. `SchemaVersion` (`major.minor`, 1-6 digits each)
//! 4. `Content` (present, an object)
//! 5. attribute count
//! 6. each attribute's name and value, in key order
//!
//! Lengths are measured in bytes of the UTF-8 encoding.

use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::OnceLock;

use crate::gather::traits::{FileSystem, ValidationError};
use crate::model::{Attributes, CustomInventoryItem, InventoryItem};

/// Required prefix distinguishing custom types from built-in ones.
pub const CUSTOM_INVENTORY_TYPE_NAME_PREFIX: &str = "Custom:";
pub const TYPE_NAME_LENGTH_LIMIT: usize = 100;
pub const ATTRIBUTE_COUNT_LIMIT: usize = 50;
pub const ATTRIBUTE_NAME_LENGTH_LIMIT: usize = 64;
pub const ATTRIBUTE_VALUE_LENGTH_LIMIT: usize = 1024;

fn schema_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{1,6}\.[0-9]{1,6}$").expect("schema version pattern is valid")
    })
}

/// Reads one fragment file and converts it into an [`InventoryItem`].
pub fn read_item(fs: &dyn FileSystem, path: &Path) -> Result<InventoryItem, ValidationError> {
    let content = fs.read_file(path).map_err(|source| ValidationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    convert_to_item(&content)
}

/// Decodes and validates fragment bytes, producing a normalized item.
///
/// The capture time is the current UTC instant, so identical input converted
/// twice yields items that differ only in `capture_time`.
pub fn convert_to_item(content: &[u8]) -> Result<InventoryItem, ValidationError> {
    let fields = match serde_json::from_slice(content)? {
        Value::Object(fields) => fields,
        other => {
            return Err(ValidationError::Decode(serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))))
        }
    };
    let raw = CustomInventoryItem::from_fields(&fields)?;

    validate_type_name(&raw.type_name)?;
    validate_schema_version(&raw.type_name, &raw.schema_version)?;
    let attributes = validate_content(&raw.type_name, raw.content.as_ref())?;

    let content = if attributes.is_empty() {
        Vec::new()
    } else {
        vec![attributes]
    };

    Ok(InventoryItem {
        name: raw.type_name,
        schema_version: raw.schema_version,
        capture_time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        content,
    })
}

fn validate_type_name(type_name: &str) -> Result<(), ValidationError> {
    if type_name.is_empty() {
        return Err(ValidationError::EmptyTypeName);
    }
    if type_name.len() > TYPE_NAME_LENGTH_LIMIT {
        return Err(ValidationError::TypeNameTooLong {
            type_name: type_name.to_string(),
            length: type_name.len(),
            limit: TYPE_NAME_LENGTH_LIMIT,
        });
    }
    if !type_name.starts_with(CUSTOM_INVENTORY_TYPE_NAME_PREFIX) {
        return Err(ValidationError::MissingTypeNamePrefix {
            type_name: type_name.to_string(),
            prefix: CUSTOM_INVENTORY_TYPE_NAME_PREFIX,
        });
    }
    Ok(())
}

fn validate_schema_version(type_name: &str, schema_version: &str) -> Result<(), ValidationError> {
    if schema_version.is_empty() {
        return Err(ValidationError::MissingSchemaVersion {
            type_name: type_name.to_string(),
        });
    }
    if !schema_version_pattern().is_match(schema_version) {
        return Err(ValidationError::InvalidSchemaVersion {
            type_name: type_name.to_string(),
            schema_version: schema_version.to_string(),
        });
    }
    Ok(())
}

fn validate_content(
    type_name: &str,
    content: Option<&Value>,
) -> Result<Attributes, ValidationError> {
    let map = match content {
        None => {
            return Err(ValidationError::MissingContent {
                type_name: type_name.to_string(),
            })
        }
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(ValidationError::ContentNotObject {
                type_name: type_name.to_string(),
                found: json_kind(other),
            })
        }
    };

    if map.len() > ATTRIBUTE_COUNT_LIMIT {
        return Err(ValidationError::AttributeCountExceeded {
            type_name: type_name.to_string(),
            count: map.len(),
            limit: ATTRIBUTE_COUNT_LIMIT,
        });
    }

    validate_attributes(type_name, map)
}

fn validate_attributes(
    type_name: &str,
    map: &Map<String, Value>,
) -> Result<Attributes, ValidationError> {
    let mut attributes = Attributes::new();
    for (name, value) in map {
        if name.is_empty() {
            return Err(ValidationError::EmptyAttributeName {
                type_name: type_name.to_string(),
            });
        }
        if name.len() > ATTRIBUTE_NAME_LENGTH_LIMIT {
            return Err(ValidationError::AttributeNameTooLong {
                type_name: type_name.to_string(),
                attribute: name.clone(),
                length: name.len(),
                limit: ATTRIBUTE_NAME_LENGTH_LIMIT,
            });
        }
        let Value::String(value) = value else {
            return Err(ValidationError::AttributeValueNotString {
                type_name: type_name.to_string(),
                attribute: name.clone(),
                found: json_kind(value),
            });
        };
        if value.len() > ATTRIBUTE_VALUE_LENGTH_LIMIT {
            return Err(ValidationError::AttributeValueTooLong {
                type_name: type_name.to_string(),
                attribute: name.clone(),
                length: value.len(),
                limit: ATTRIBUTE_VALUE_LENGTH_LIMIT,
            });
        }
        attributes.insert(name.clone(), value.clone());
    }
    Ok(attributes)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
