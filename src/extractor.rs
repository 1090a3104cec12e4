use std::sync::Arc;

use serde_json::Value;

use crate::agent::Agent;
use crate::error::{BridgeError, Result};
use crate::schema::{self, ParameterSchema};
use crate::tool::{self, ToolSpec};

const EXTRACT_PREAMBLE: &str = "Extract the data structure from the input string.\n\
Note you MUST use the tool named `extractor` to extract the input string to the\n\
data structure.\n";

const EXTRACT_TOOL_DESCRIPTION: &str = "Extract the data structure from the input string.";

/// Coerces free text into a schema-validated value by delegating to a
/// single-tool agent.
///
/// The synthetic `extractor` tool validates whatever positional arguments the
/// core supplies, and the final answer text is parsed and validated again —
/// the core's tool-argument path and its free-text answer path are not
/// guaranteed to carry the same payload.
pub struct Extractor {
    agent: Agent,
    schema: ParameterSchema,
}

impl Extractor {
    pub fn new(agent: &Agent, schema: ParameterSchema) -> Self {
        Self {
            agent: agent.clone(),
            schema,
        }
    }

    pub async fn extract(&self, input: &str) -> Result<Value> {
        let target = self.schema.to_value()?;

        let handler_target = target.clone();
        let handler =
            move |args: Vec<Value>| tool::coerce_positional(&handler_target, &args);

        let delegate = Agent::new(self.agent.core(), self.agent.model())
            .with_name(self.agent.name())
            .with_api_key(self.agent.api_key())
            .with_base_url(self.agent.base_url())
            .with_preamble(EXTRACT_PREAMBLE)
            .with_tool(ToolSpec::new(
                "extractor",
                EXTRACT_TOOL_DESCRIPTION,
                self.schema.clone(),
                Arc::new(handler),
            ));

        let answer = delegate.prompt(input).await.map_err(|err| match err {
            // Handler-side and final-result validation failures collapse into
            // one mismatch; both mean the core did not produce conformant
            // output.
            BridgeError::HandlerFailure { message, .. } => {
                BridgeError::ExtractionMismatch(message)
            }
            other => other,
        })?;

        let value: Value = serde_json::from_str(&answer)
            .map_err(|err| BridgeError::ExtractionMismatch(err.to_string()))?;
        schema::validate(&target, &value)?;
        Ok(value)
    }
}
