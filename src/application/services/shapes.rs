//! Response shapes the text model is asked to produce
//!
//! Each shape carries the strict JSON schema sent with the request and the
//! checks applied after parsing. A response that parses but fails a check is
//! a shape mismatch just like one that does not parse at all.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::application::ports::outbound::{ResponseFormat, StructuredResponse};
use crate::domain::value_objects::{
    ElementType, ExpressionCategory, ExpressionSet, MoveCategory, MoveList,
};

/// Raw answer of the description stage
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DescriptionResponse {
    pub name: String,
    pub description: String,
    pub physical_attributes: String,
    pub image_description: String,
}

impl StructuredResponse for DescriptionResponse {
    type Expect = ();

    fn response_format(_: ()) -> ResponseFormat {
        ResponseFormat {
            name: "creature_description",
            schema: object_schema(&[
                ("name", json!({ "type": "string" })),
                ("description", json!({ "type": "string" })),
                ("physical_attributes", json!({ "type": "string" })),
                ("image_description", json!({ "type": "string" })),
            ]),
        }
    }

    fn validate(&self, _: ()) -> Result<(), String> {
        require_text("description", &self.description)?;
        require_text("physical_attributes", &self.physical_attributes)?;
        require_text("image_description", &self.image_description)
    }
}

impl StructuredResponse for MoveList {
    /// Exact number of moves requested
    type Expect = usize;

    fn response_format(count: usize) -> ResponseFormat {
        let item = object_schema(&[
            ("name", json!({ "type": "string" })),
            ("element", enum_schema(ElementType::ALL.iter().map(|e| e.as_str()))),
            ("category", enum_schema(MoveCategory::ALL.iter().map(|c| c.as_str()))),
            ("power", json!({ "type": ["integer", "null"] })),
            ("accuracy", json!({ "type": ["integer", "null"] })),
            ("description", json!({ "type": "string" })),
            ("sprite_blueprint", json!({ "type": "string" })),
        ]);
        ResponseFormat {
            name: "creature_moveset",
            schema: object_schema(&[("moves", list_schema(item, count))]),
        }
    }

    fn validate(&self, count: usize) -> Result<(), String> {
        check_count("moves", self.moves.len(), count)?;
        for (i, item) in self.moves.iter().enumerate() {
            let at = |field: &str| format!("moves[{}].{}", i, field);
            require_text(&at("name"), &item.name)?;
            require_text(&at("description"), &item.description)?;
            require_text(&at("sprite_blueprint"), &item.sprite_blueprint)?;
            if let Some(accuracy) = item.accuracy {
                if accuracy > 100 {
                    return Err(format!("{} must be at most 100, got {}", at("accuracy"), accuracy));
                }
            }
        }
        Ok(())
    }
}

impl StructuredResponse for ExpressionSet {
    /// Exact number of expressions requested
    type Expect = usize;

    fn response_format(count: usize) -> ResponseFormat {
        let item = object_schema(&[
            ("name", json!({ "type": "string" })),
            ("element", enum_schema(ElementType::ALL.iter().map(|e| e.as_str()))),
            ("category", enum_schema(ExpressionCategory::ALL.iter().map(|c| c.as_str()))),
            ("description", json!({ "type": "string" })),
            ("sprite_blueprint", json!({ "type": "string" })),
        ]);
        ResponseFormat {
            name: "creature_expressions",
            schema: object_schema(&[("expressions", list_schema(item, count))]),
        }
    }

    fn validate(&self, count: usize) -> Result<(), String> {
        check_count("expressions", self.expressions.len(), count)?;
        for (i, item) in self.expressions.iter().enumerate() {
            let at = |field: &str| format!("expressions[{}].{}", i, field);
            require_text(&at("name"), &item.name)?;
            require_text(&at("description"), &item.description)?;
            require_text(&at("sprite_blueprint"), &item.sprite_blueprint)?;
        }
        Ok(())
    }
}

/// Strict object schema: every property required, nothing else allowed
fn object_schema(properties: &[(&str, Value)]) -> Value {
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    let properties: serde_json::Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn list_schema(item: Value, count: usize) -> Value {
    json!({
        "type": "array",
        "items": item,
        "minItems": count,
        "maxItems": count,
    })
}

fn enum_schema<'a>(values: impl Iterator<Item = &'a str>) -> Value {
    json!({ "type": "string", "enum": values.collect::<Vec<_>>() })
}

fn check_count(field: &str, got: usize, expected: usize) -> Result<(), String> {
    if got == expected {
        Ok(())
    } else {
        Err(format!("expected {} {}, got {}", expected, field, got))
    }
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is blank", field))
    } else {
        Ok(())
    }
}
