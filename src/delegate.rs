use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{BridgeError, Result};
use crate::tool::{CanonicalTool, CoreHandler};

/// The narrow call contract of the external agent core.
///
/// The core owns tool-selection policy, multi-turn tool-call looping, and
/// model invocation; the bridge supplies the tool table and receives the
/// final text.
#[async_trait]
pub trait DelegateCore: Send + Sync {
    async fn prompt_with_tools(&self, prompt: &str, tools: &[CanonicalTool]) -> Result<String>;
}

/// Resolve the tool table the way cores key it: by name, last write wins.
pub fn resolve_handlers(tools: &[CanonicalTool]) -> Vec<(String, CoreHandler)> {
    let mut table: Vec<(String, CoreHandler)> = Vec::new();
    for tool in tools {
        if let Some(entry) = table.iter_mut().find(|(name, _)| *name == tool.name) {
            entry.1 = Arc::clone(&tool.handler);
        } else {
            table.push((tool.name.clone(), Arc::clone(&tool.handler)));
        }
    }
    table
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum StubDirective {
    Respond { content: String },
    CallTool { name: String, arguments: Value },
}

/// A scripted core for tests.
///
/// Replays its directives in order: `call_tool` invokes the named handler
/// with the given arguments, `respond` ends the exchange. A script ending on
/// a tool call returns that tool's output as the answer, which is how
/// extraction-style flows terminate.
pub struct StubCore {
    script: Mutex<VecDeque<String>>,
}

impl StubCore {
    pub fn new(script: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
        })
    }
}

#[async_trait]
impl DelegateCore for StubCore {
    async fn prompt_with_tools(&self, _prompt: &str, tools: &[CanonicalTool]) -> Result<String> {
        let table = resolve_handlers(tools);
        let mut last_output: Option<String> = None;

        loop {
            let raw = {
                let mut locked = self.script.lock().expect("stub core poisoned");
                locked.pop_front()
            };
            let raw = match raw {
                Some(raw) => raw,
                None => {
                    return last_output.ok_or_else(|| {
                        BridgeError::Core("stub core ran out of scripted directives".into())
                    })
                }
            };

            match serde_json::from_str::<StubDirective>(&raw) {
                Ok(StubDirective::Respond { content }) => return Ok(content),
                Ok(StubDirective::CallTool { name, arguments }) => {
                    let handler = table
                        .iter()
                        .find(|(tool_name, _)| *tool_name == name)
                        .map(|(_, handler)| handler)
                        .ok_or_else(|| BridgeError::Core(format!("unknown tool `{name}`")))?;
                    last_output = Some(handler(&serde_json::to_string(&arguments)?)?);
                }
                // Anything unscripted is treated as a literal answer.
                Err(_) => return Ok(raw),
            }
        }
    }
}
