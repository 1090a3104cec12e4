use std::sync::Arc;

use serde_json::Value;

use crate::error::{BridgeError, Result};
use crate::schema::{empty_object_schema, ParameterSchema};
use crate::tool::ToolSpec;

/// A plugin-host action (ElizaOS/AgentKit-style) seen through a capability
/// interface, so foreign callables never cross the bridge as raw closures.
pub trait ForeignAction: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Actions that declare no parameters fall back to the empty object
    /// schema.
    fn parameter_schema(&self) -> Option<ParameterSchema> {
        None
    }

    fn validate(&self, args: &[Value]) -> bool;
    fn handle(&self, args: Vec<Value>) -> std::result::Result<Value, String>;
}

/// Convert a foreign action into exactly one [`ToolSpec`].
///
/// The wrapped handler runs the action's own validate/handle lifecycle and
/// surfaces a `HandlerFailure` when validation returns false or handling
/// reports failure.
pub fn tool_spec_from_action(action: Arc<dyn ForeignAction>) -> ToolSpec {
    let schema = action.parameter_schema().unwrap_or_else(empty_object_schema);
    let name = action.name().to_string();
    let description = action.description().to_string();

    let handler_name = name.clone();
    let handler_action = Arc::clone(&action);
    let handler = move |args: Vec<Value>| -> Result<Value> {
        if !handler_action.validate(&args) {
            return Err(BridgeError::HandlerFailure {
                name: handler_name.clone(),
                message: "action validation returned false".into(),
            });
        }
        handler_action
            .handle(args)
            .map_err(|message| BridgeError::HandlerFailure {
                name: handler_name.clone(),
                message,
            })
    };

    ToolSpec::new(name, description, schema, Arc::new(handler))
}
