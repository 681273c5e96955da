//! Schema generation utilities and the reasoning-step schema.

use once_cell::sync::Lazy;
use serde_json::json;

/// Generator for object JSON schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaGenerator {
    properties: Vec<(String, serde_json::Value)>,
    required: Vec<String>,
}

impl SchemaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property and mark it required.
    pub fn add_required(mut self, name: impl Into<String>, schema: serde_json::Value) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.push((name, schema));
        self
    }

    pub fn build(self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("type".into(), json!("object"));

        let mut properties = serde_json::Map::new();
        for (name, schema) in self.properties {
            properties.insert(name, schema);
        }
        map.insert("properties".into(), properties.into());

        if !self.required.is_empty() {
            map.insert("required".into(), self.required.into());
        }

        map.into()
    }
}

pub fn schema_from_type_name(type_name: &str) -> serde_json::Value {
    match type_name {
        "string" => json!({"type": "string"}),
        "integer" => json!({"type": "integer"}),
        "number" => json!({"type": "number"}),
        "boolean" => json!({"type": "boolean"}),
        "array" => json!({"type": "array"}),
        "object" => json!({"type": "object"}),
        "null" => json!({"type": "null"}),
        _ => json!({"type": "object"}),
    }
}

static REASONING_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    let step = SchemaGenerator::new()
        .add_required("title", schema_from_type_name("string"))
        .add_required("content", schema_from_type_name("string"))
        .add_required(
            "next_action",
            json!({"type": "string", "enum": ["continue", "final_answer"]}),
        )
        .build();

    SchemaGenerator::new()
        .add_required("reasoning_steps", json!({"type": "array", "items": step}))
        .add_required("final_answer", schema_from_type_name("string"))
        .build()
});

/// Schema every structured answer is asked to follow:
/// `reasoning_steps` (array of `{title, content, next_action}`) and `final_answer`.
pub fn reasoning_step_schema() -> &'static serde_json::Value {
    &REASONING_SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generator_required_properties() {
        let schema = SchemaGenerator::new()
            .add_required("name", schema_from_type_name("string"))
            .add_required("age", schema_from_type_name("integer"))
            .build();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["name"]["type"], "string");
        assert_eq!(schema["properties"]["age"]["type"], "integer");
        assert_eq!(schema["required"], json!(["name", "age"]));
    }

    #[test]
    fn test_empty_generator_has_no_required_list() {
        let schema = SchemaGenerator::new().build();
        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"], json!({}));
    }

    #[test]
    fn test_reasoning_schema_requirements() {
        let schema = reasoning_step_schema();
        assert_eq!(schema["required"], json!(["reasoning_steps", "final_answer"]));

        let items = &schema["properties"]["reasoning_steps"]["items"];
        assert_eq!(items["required"], json!(["title", "content", "next_action"]));
        assert_eq!(
            items["properties"]["next_action"]["enum"],
            json!(["continue", "final_answer"])
        );
        assert_eq!(schema["properties"]["final_answer"]["type"], "string");
    }
}
