use serde_json::{json, Map, Value};

use crate::error::{BridgeError, Result};

/// The schema notations a tool definition may arrive in.
///
/// Callers describe tool parameters in whatever notation is idiomatic for
/// them; `normalize` folds every variant into one canonical JSON-Schema text
/// before it crosses the bridge to the delegated core.
#[derive(Clone, Debug)]
pub enum ParameterSchema {
    /// Already-serialized JSON-Schema text.
    RawText(String),
    /// A typed schema built with [`TypedSchema`].
    Typed(TypedSchema),
    /// A plain JSON-Schema-shaped value.
    Plain(Value),
}

impl ParameterSchema {
    /// Classify an arbitrary JSON value into a schema variant.
    ///
    /// Strings are taken as raw schema text and objects as plain schema
    /// values; anything else is a programmer error.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(Self::RawText(text)),
            Value::Object(_) => Ok(Self::Plain(value)),
            _ => Err(BridgeError::SchemaKind),
        }
    }

    /// Render the canonical JSON-Schema text for this schema.
    pub fn normalize(&self) -> Result<String> {
        match self {
            // Raw text is trusted to already be valid schema text; the fast
            // path does not re-parse it.
            Self::RawText(text) => Ok(text.clone()),
            Self::Typed(schema) => Ok(serde_json::to_string(&schema.to_draft07())?),
            Self::Plain(value) => Ok(serde_json::to_string(value)?),
        }
    }

    /// The normalized schema parsed back into a JSON value, for validation
    /// and default synthesis.
    pub fn to_value(&self) -> Result<Value> {
        match self {
            Self::RawText(text) => Ok(serde_json::from_str(text)?),
            Self::Typed(schema) => Ok(schema.to_draft07()),
            Self::Plain(value) => Ok(value.clone()),
        }
    }
}

/// The default schema for tools that declare no parameters.
pub fn empty_object_schema() -> ParameterSchema {
    ParameterSchema::Plain(json!({
        "type": "object",
        "properties": {},
        "required": [],
    }))
}

/// Primitive field types expressible in a [`TypedSchema`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
}

impl FieldType {
    fn keyword(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
        }
    }
}

#[derive(Clone, Debug)]
struct SchemaField {
    name: String,
    ty: FieldType,
    description: Option<String>,
    required: bool,
}

/// An object schema with an explicit, ordered property list.
///
/// The declaration order doubles as the positional order used when the core's
/// JSON argument object is mapped onto a host handler's argument list, so the
/// ordering contract lives in the type rather than in key iteration order.
#[derive(Clone, Debug, Default)]
pub struct TypedSchema {
    fields: Vec<SchemaField>,
}

impl TypedSchema {
    pub fn object() -> Self {
        Self::default()
    }

    /// Append a required field. Order of calls is positional order.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(SchemaField {
            name: name.into(),
            ty,
            description: None,
            required: true,
        });
        self
    }

    /// Append an optional field.
    pub fn optional_field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(SchemaField {
            name: name.into(),
            ty,
            description: None,
            required: false,
        });
        self
    }

    /// Attach a description to the most recently appended field.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.description = Some(description.into());
        }
        self
    }

    /// Render as a JSON-Schema draft-07 value.
    pub fn to_draft07(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".into(), Value::String(field.ty.keyword().into()));
            if let Some(description) = &field.description {
                prop.insert("description".into(), Value::String(description.clone()));
            }
            properties.insert(field.name.clone(), Value::Object(prop));
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": Value::Object(properties),
            "required": Value::Array(required),
        })
    }
}

/// Structurally validate `value` against a JSON-Schema value.
///
/// Checks the `type` keyword, `required` property lists, and per-property
/// subschemas. This is not a full draft-07 validator; it covers the shapes
/// tool parameter schemas use.
pub fn validate(schema: &Value, value: &Value) -> Result<()> {
    check(schema, value, "$").map_err(BridgeError::ExtractionMismatch)
}

fn check(schema: &Value, value: &Value, path: &str) -> std::result::Result<(), String> {
    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !type_matches(expected, value) {
            return Err(format!("{path}: expected {expected}"));
        }
    }

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if value.get(name).is_none() {
                return Err(format!("{path}: missing required property `{name}`"));
            }
        }
    }

    if let (Some(properties), Some(object)) = (
        schema.get("properties").and_then(Value::as_object),
        value.as_object(),
    ) {
        for (name, subschema) in properties {
            if let Some(entry) = object.get(name) {
                check(subschema, entry, &format!("{path}.{name}"))?;
            }
        }
    }

    if let (Some(items), Some(entries)) = (schema.get("items"), value.as_array()) {
        for (index, entry) in entries.iter().enumerate() {
            check(items, entry, &format!("{path}[{index}]"))?;
        }
    }

    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}
