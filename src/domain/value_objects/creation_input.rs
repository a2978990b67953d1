//! Creation input - the user's description of a new creature
//!
//! Requests arrive as loosely shaped JSON. [`CreationInput::normalize`] is the
//! only way to obtain a `CreationInput`, so every stage downstream works with
//! the canonical field names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::naming::{fits_folder_name, MAX_NAME_BYTES};

pub const MAX_TEXT_LENGTH: usize = 10000;

/// Canonical field names, in the order they are reported
const REQUIRED_FIELDS: [&str; 4] = ["name", "description", "physical_attr", "ptype"];

/// Legacy or misspelled keys still sent by older clients: (alias, canonical)
const KEY_ALIASES: [(&str, &str); 2] = [("physical_att", "physical_attr"), ("pytpe", "ptype")];

/// Normalized creature description supplied by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationInput {
    pub name: String,
    pub description: String,
    pub physical_attr: String,
    pub ptype: String,
}

/// Reasons a raw request cannot be normalized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Creature data must be a JSON object")]
    NotAnObject,
    #[error("Creature data missing/invalid fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Field '{field}' {reason}")]
    InvalidField { field: String, reason: String },
}

impl CreationInput {
    /// Normalize a raw JSON payload into the canonical input shape
    ///
    /// Known aliases are folded into their canonical key unless the canonical
    /// key is already present. Every required field must be a non-blank
    /// string; all offending fields are reported together.
    pub fn normalize(raw: Value) -> Result<Self, InputError> {
        let Value::Object(mut fields) = raw else {
            return Err(InputError::NotAnObject);
        };

        apply_aliases(&mut fields);

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|key| !matches!(fields.get(**key), Some(Value::String(s)) if !s.trim().is_empty()))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(InputError::MissingFields(missing));
        }

        let take = |fields: &mut Map<String, Value>, key: &str| -> String {
            match fields.remove(key) {
                Some(Value::String(s)) => s.trim().to_string(),
                _ => String::new(),
            }
        };

        let input = Self {
            name: take(&mut fields, "name"),
            description: take(&mut fields, "description"),
            physical_attr: take(&mut fields, "physical_attr"),
            ptype: take(&mut fields, "ptype"),
        };
        input.validate_lengths()?;
        Ok(input)
    }

    /// Same as [`normalize`](Self::normalize), with the display name supplied
    /// separately from the body (it overrides any name in the body)
    pub fn normalize_named(name: &str, raw: Value) -> Result<Self, InputError> {
        let raw = match raw {
            Value::Object(mut fields) => {
                fields.insert("name".to_string(), Value::String(name.to_string()));
                Value::Object(fields)
            }
            other => other,
        };
        Self::normalize(raw)
    }

    fn validate_lengths(&self) -> Result<(), InputError> {
        if !fits_folder_name(&self.name) {
            return Err(InputError::InvalidField {
                field: "name".to_string(),
                reason: format!("cannot exceed {} bytes", MAX_NAME_BYTES),
            });
        }
        for (field, value) in [
            ("description", &self.description),
            ("physical_attr", &self.physical_attr),
            ("ptype", &self.ptype),
        ] {
            if value.chars().count() > MAX_TEXT_LENGTH {
                return Err(InputError::InvalidField {
                    field: field.to_string(),
                    reason: format!("cannot exceed {} characters", MAX_TEXT_LENGTH),
                });
            }
        }
        Ok(())
    }
}

fn apply_aliases(fields: &mut Map<String, Value>) {
    for (alias, canonical) in KEY_ALIASES {
        if let Some(value) = fields.remove(alias) {
            if !fields.contains_key(canonical) {
                fields.insert(canonical.to_string(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_canonical_keys() {
        let input = CreationInput::normalize(json!({
            "name": "Pikachu",
            "description": "yellow electric mouse",
            "physical_attr": "small, red cheeks",
            "ptype": "Electric",
        }))
        .unwrap();

        assert_eq!(input.name, "Pikachu");
        assert_eq!(input.physical_attr, "small, red cheeks");
        assert_eq!(input.ptype, "Electric");
    }

    #[test]
    fn test_normalize_legacy_aliases() {
        let input = CreationInput::normalize(json!({
            "name": "Tsunamidon",
            "description": "A massive armored blue triceratops",
            "physical_att": "Tidal frill, triple horns",
            "pytpe": "Water/Steel",
        }))
        .unwrap();

        assert_eq!(input.physical_attr, "Tidal frill, triple horns");
        assert_eq!(input.ptype, "Water/Steel");
    }

    #[test]
    fn test_canonical_key_wins_over_alias() {
        let input = CreationInput::normalize(json!({
            "name": "Tricklehorn",
            "description": "goofy",
            "physical_attr": "droplet frill",
            "physical_att": "ignored",
            "ptype": "Water",
        }))
        .unwrap();

        assert_eq!(input.physical_attr, "droplet frill");
    }

    #[test]
    fn test_missing_fields_are_all_named() {
        let err = CreationInput::normalize(json!({
            "name": "Nameless",
            "description": "   ",
        }))
        .unwrap_err();

        assert_eq!(
            err,
            InputError::MissingFields(vec![
                "description".to_string(),
                "physical_attr".to_string(),
                "ptype".to_string(),
            ])
        );
        assert!(err.to_string().contains("physical_attr"));
    }

    #[test]
    fn test_non_string_field_counts_as_missing() {
        let err = CreationInput::normalize(json!({
            "name": "Bolt",
            "description": "fast",
            "physical_attr": 12,
            "ptype": "Electric",
        }))
        .unwrap_err();

        assert_eq!(err, InputError::MissingFields(vec!["physical_attr".to_string()]));
    }

    #[test]
    fn test_rejects_non_object() {
        let err = CreationInput::normalize(json!(["name", "Pikachu"])).unwrap_err();
        assert_eq!(err, InputError::NotAnObject);
    }

    #[test]
    fn test_normalize_named_overrides_body_name() {
        let input = CreationInput::normalize_named(
            "Sparky",
            json!({
                "name": "ignored",
                "description": "d",
                "physical_attr": "p",
                "ptype": "t",
            }),
        )
        .unwrap();
        assert_eq!(input.name, "Sparky");
    }

    #[test]
    fn test_name_length_limit() {
        let body = |name: String| {
            json!({
                "name": name,
                "description": "d",
                "physical_attr": "p",
                "ptype": "t",
            })
        };
        assert!(CreationInput::normalize(body("x".repeat(MAX_NAME_BYTES))).is_ok());

        let err = CreationInput::normalize(body("x".repeat(MAX_NAME_BYTES + 1))).unwrap_err();
        assert!(matches!(err, InputError::InvalidField { ref field, .. } if field == "name"));

        // Fewer characters than bytes
        let err = CreationInput::normalize(body("é".repeat(MAX_NAME_BYTES / 2 + 1))).unwrap_err();
        assert!(matches!(err, InputError::InvalidField { ref field, .. } if field == "name"));
    }
}
