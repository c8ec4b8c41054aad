//! Typed argument shapes derived from provider-declared input schemas.
//!
//! Providers declare parameters as a JSON-schema-like object. [`ArgSchema`]
//! compiles that once into an ordered list of [`ParamSpec`]s so arguments
//! coming from the language model can be validated and coerced before they
//! leave the process.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{McpError, McpResult};

/// Closed set of parameter types understood by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    List,
    Object,
}

impl ParamType {
    /// Map a schema type tag. Unknown or missing tags fall back to `String`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("integer") => ParamType::Integer,
            Some("number") => ParamType::Number,
            Some("boolean") => ParamType::Boolean,
            Some("array") => ParamType::List,
            Some("object") => ParamType::Object,
            _ => ParamType::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::List => "array",
            ParamType::Object => "object",
        }
    }

    /// Coerce a raw value into this type.
    ///
    /// Language models often emit numbers and booleans as strings, so string
    /// inputs are parsed where the declared type needs it.
    fn coerce(&self, value: Value) -> Result<Value, Value> {
        match (self, value) {
            (ParamType::String, Value::String(s)) => Ok(Value::String(s)),
            (ParamType::String, v @ (Value::Number(_) | Value::Bool(_))) => {
                Ok(Value::String(v.to_string()))
            }

            (ParamType::Integer, Value::Number(n)) => {
                if n.is_i64() || n.is_u64() {
                    Ok(Value::Number(n))
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 => Ok(Value::from(f as i64)),
                        _ => Err(Value::Number(n)),
                    }
                }
            }
            (ParamType::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(i) => Ok(Value::from(i)),
                Err(_) => Err(Value::String(s)),
            },

            (ParamType::Number, Value::Number(n)) => Ok(Value::Number(n)),
            (ParamType::Number, Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) => serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or(Value::String(s)),
                Err(_) => Err(Value::String(s)),
            },

            (ParamType::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
            (ParamType::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str()
            {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(Value::String(s)),
            },

            (ParamType::List, v @ Value::Array(_)) => Ok(v),
            (ParamType::Object, v @ Value::Object(_)) => Ok(v),

            (_, other) => Err(other),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Ordered parameter shape of one tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgSchema {
    params: Vec<ParamSpec>,
}

impl ArgSchema {
    /// Compile a declared input schema.
    ///
    /// Never fails: a schema without `properties` yields an empty shape and
    /// malformed property entries are read as untyped strings.
    pub fn from_json_schema(schema: &Map<String, Value>) -> Self {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let params = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, prop)| ParamSpec {
                        name: name.clone(),
                        param_type: ParamType::from_tag(prop.get("type").and_then(Value::as_str)),
                        required: required.contains(&name.as_str()),
                        default: prop.get("default").cloned(),
                        description: prop
                            .get("description")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { params }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Validate raw arguments into an invocation-ready [`ToolArgs`].
    ///
    /// Declared defaults fill absent optional parameters, values are coerced
    /// to their declared types and undeclared keys are dropped. The result
    /// follows declaration order.
    pub fn build(&self, raw: &Map<String, Value>) -> McpResult<ToolArgs> {
        let mut args = Map::new();
        for param in &self.params {
            match raw.get(&param.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    let coerced = param.param_type.coerce(value.clone()).map_err(|bad| {
                        McpError::InvalidArguments(format!(
                            "'{}' expects {}, got {}",
                            param.name, param.param_type, bad
                        ))
                    })?;
                    args.insert(param.name.clone(), coerced);
                }
                None => {
                    if let Some(default) = &param.default {
                        args.insert(param.name.clone(), default.clone());
                    } else if param.required {
                        return Err(McpError::InvalidArguments(format!(
                            "missing required parameter '{}'",
                            param.name
                        )));
                    }
                }
            }
        }
        Ok(ToolArgs(args))
    }
}

/// Validated invocation arguments, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ToolArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl fmt::Display for ToolArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schema(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn event_schema() -> ArgSchema {
        ArgSchema::from_json_schema(&schema(json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "description": "Event title"},
                "start": {"type": "string"},
                "end": {"type": "string"},
                "location": {"type": "string", "default": ""},
                "reminder": {"type": "integer"}
            },
            "required": ["title", "start", "end"]
        })))
    }

    #[test]
    fn test_empty_schema_yields_empty_shape() {
        let shape = ArgSchema::from_json_schema(&Map::new());
        assert!(shape.is_empty());
        let args = shape.build(&Map::new()).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_unknown_type_defaults_to_string() {
        let shape = ArgSchema::from_json_schema(&schema(json!({
            "properties": {
                "when": {"type": "datetime"},
                "anything": {}
            }
        })));
        assert_eq!(shape.param("when").unwrap().param_type, ParamType::String);
        assert_eq!(shape.param("anything").unwrap().param_type, ParamType::String);
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let names: Vec<_> = event_schema()
            .params()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, ["title", "start", "end", "location", "reminder"]);
    }

    #[test]
    fn test_build_fills_defaults_and_drops_unknown_keys() {
        let raw = schema(json!({
            "title": "Lunch",
            "start": "2025-12-15T12:00:00",
            "end": "2025-12-15T13:00:00",
            "color": "blue"
        }));
        let args = event_schema().build(&raw).unwrap();
        assert_eq!(args.get_str("location"), Some(""));
        assert!(args.get("color").is_none());
        assert!(args.get("reminder").is_none());
    }

    #[test]
    fn test_build_rejects_missing_required() {
        let raw = schema(json!({"title": "Lunch"}));
        let err = event_schema().build(&raw).unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments(msg) if msg.contains("start")));
    }

    #[test]
    fn test_build_coerces_stringly_numbers() {
        let raw = schema(json!({
            "title": "Lunch",
            "start": "a",
            "end": "b",
            "reminder": "15"
        }));
        let args = event_schema().build(&raw).unwrap();
        assert_eq!(args.get("reminder"), Some(&json!(15)));
    }

    #[test]
    fn test_build_rejects_uncoercible_values() {
        let raw = schema(json!({
            "title": "Lunch",
            "start": "a",
            "end": "b",
            "reminder": "soon"
        }));
        assert!(event_schema().build(&raw).is_err());
    }

    #[test]
    fn test_boolean_and_number_coercion() {
        let shape = ArgSchema::from_json_schema(&schema(json!({
            "properties": {
                "flag": {"type": "boolean"},
                "ratio": {"type": "number"},
                "tags": {"type": "array"}
            }
        })));
        let args = shape
            .build(&schema(json!({"flag": "TRUE", "ratio": "0.5", "tags": ["a"]})))
            .unwrap();
        assert_eq!(args.get("flag"), Some(&json!(true)));
        assert_eq!(args.get("ratio"), Some(&json!(0.5)));
        assert_eq!(args.get("tags"), Some(&json!(["a"])));
    }
}
