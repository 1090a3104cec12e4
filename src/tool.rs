use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::{BridgeError, Result};
use crate::schema::{self, ParameterSchema};

/// A host-side tool implementation.
///
/// Handlers take their arguments positionally so that host code never has to
/// deal in the core's JSON calling convention; the marshaling in
/// [`to_core_handler`] bridges the two.
pub trait ToolHandler: Send + Sync {
    fn invoke(&self, args: Vec<Value>) -> Result<Value>;
}

impl<F> ToolHandler for F
where
    F: Fn(Vec<Value>) -> Result<Value> + Send + Sync,
{
    fn invoke(&self, args: Vec<Value>) -> Result<Value> {
        self(args)
    }
}

/// A core-facing handler: JSON argument text in, JSON result text out.
pub type CoreHandler = Arc<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// A tool definition as supplied by host code.
#[derive(Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
    pub version: String,
    pub author: String,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ParameterSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            version: String::new(),
            author: String::new(),
            handler,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Build the canonical, wire-ready form of this tool.
    ///
    /// Rebuilt on every prompt invocation; canonical tools are never cached
    /// across calls.
    pub fn to_canonical(&self) -> Result<CanonicalTool> {
        Ok(CanonicalTool {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            parameters_json: self.parameters.normalize()?,
            author: self.author.clone(),
            handler: to_core_handler(self),
        })
    }
}

/// A tool in the delegated core's call convention: canonical JSON-Schema text
/// plus a string-in/string-out handler. Immutable once built.
#[derive(Clone)]
pub struct CanonicalTool {
    pub name: String,
    pub version: String,
    pub description: String,
    pub parameters_json: String,
    pub author: String,
    pub handler: CoreHandler,
}

/// Wrap a host handler into the core's string/JSON call convention.
///
/// The argument object's key insertion order is the positional order. The
/// schema's declared property order at definition time must match it; this is
/// the ordering contract tool authors sign up to, not something renegotiated
/// at call time.
pub fn to_core_handler(spec: &ToolSpec) -> CoreHandler {
    let name = spec.name.clone();
    let handler = Arc::clone(&spec.handler);
    Arc::new(move |args_json: &str| {
        let parsed: Value =
            serde_json::from_str(args_json).map_err(|err| BridgeError::ArgDecode(err.to_string()))?;
        let object = match parsed {
            Value::Object(map) => map,
            other => {
                return Err(BridgeError::ArgDecode(format!(
                    "expected a JSON object, got `{other}`"
                )))
            }
        };
        let positional: Vec<Value> = object.into_iter().map(|(_, value)| value).collect();
        let result = handler.invoke(positional).map_err(|err| match err {
            failure @ BridgeError::HandlerFailure { .. } => failure,
            other => BridgeError::HandlerFailure {
                name: name.clone(),
                message: other.to_string(),
            },
        })?;
        Ok(serde_json::to_string(&result)?)
    })
}

/// Fill unsupplied positional arguments with zero values, by declared type.
///
/// Walks the schema's properties in declaration order: a supplied value at
/// that index wins, otherwise "" for strings, 0 for numbers, false for
/// booleans, and null for everything else. Partially-specified calls thus
/// never leave holes for downstream JSON encoding to trip over.
pub fn fill_defaults(schema: &Value, supplied: &[Value]) -> Vec<Value> {
    let properties = match schema.get("properties").and_then(Value::as_object) {
        Some(properties) => properties,
        None => return supplied.to_vec(),
    };
    properties
        .values()
        .enumerate()
        .map(|(index, prop)| supplied.get(index).cloned().unwrap_or_else(|| zero_value(prop)))
        .collect()
}

fn zero_value(prop: &Value) -> Value {
    match prop.get("type").and_then(Value::as_str) {
        Some("string") => Value::String(String::new()),
        Some("number") | Some("integer") => json!(0),
        Some("boolean") => Value::Bool(false),
        _ => Value::Null,
    }
}

/// Assemble a schema-validated value from positional arguments.
///
/// Object-shaped destructuring only applies to object-typed schemas; for any
/// other root type the first positional argument is taken as the whole value
/// and validated directly.
pub fn coerce_positional(schema: &Value, supplied: &[Value]) -> Result<Value> {
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        let value = supplied.first().cloned().unwrap_or(Value::Null);
        schema::validate(schema, &value)?;
        return Ok(value);
    }

    let filled = fill_defaults(schema, supplied);
    let mut object = Map::new();
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (index, name) in properties.keys().enumerate() {
            object.insert(
                name.clone(),
                filled.get(index).cloned().unwrap_or(Value::Null),
            );
        }
    }
    let value = Value::Object(object);
    schema::validate(schema, &value)?;
    Ok(value)
}
