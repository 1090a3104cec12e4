use std::sync::Arc;

use tokio::sync::Mutex;

use crate::delegate::DelegateCore;
use crate::error::Result;
use crate::memory::Memory;
use crate::store::{Store, DEFAULT_SCORE_THRESHOLD, DEFAULT_SEARCH_LIMIT};
use crate::tool::{CanonicalTool, ToolSpec};

/// The composition root: retrieval augmentation, tool-table construction, and
/// delegation to the external core.
///
/// The core is an explicitly constructed, passed-by-reference capability —
/// there is no process-wide runtime singleton, so multiple agents with
/// different cores can coexist in one process.
#[derive(Clone)]
pub struct Agent {
    name: String,
    model: String,
    preamble: String,
    api_key: String,
    base_url: String,
    core: Arc<dyn DelegateCore>,
    tools: Vec<ToolSpec>,
    store: Option<Arc<dyn Store>>,
    memory: Option<Arc<Mutex<dyn Memory>>>,
}

impl Agent {
    pub fn new(core: Arc<dyn DelegateCore>, model: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            model: model.into(),
            preamble: String::new(),
            api_key: String::new(),
            base_url: String::new(),
            core,
            tools: Vec::new(),
            store: None,
            memory: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Attach a conversation memory, possibly shared with other agents.
    pub fn with_memory(mut self, memory: Arc<Mutex<dyn Memory>>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn core(&self) -> Arc<dyn DelegateCore> {
        Arc::clone(&self.core)
    }

    /// The canonical tool table for one invocation, rebuilt every call.
    fn build_tool_table(&self) -> Result<Vec<CanonicalTool>> {
        self.tools.iter().map(ToolSpec::to_canonical).collect()
    }

    /// Resolve one prompt through the delegated core.
    ///
    /// Retrieval is awaited before dispatch and treated as advisory: a failed
    /// search downgrades to "no attachments" instead of aborting the prompt.
    pub async fn prompt(&self, text: &str) -> Result<String> {
        let mut prompt_text = String::new();
        if !self.preamble.is_empty() {
            prompt_text.push_str(&self.preamble);
            prompt_text.push_str("\n\n");
        }
        if let Some(memory) = &self.memory {
            let history = memory.lock().await.render();
            if !history.is_empty() {
                prompt_text.push_str(&history);
                prompt_text.push('\n');
            }
        }
        prompt_text.push_str(text);

        if let Some(store) = &self.store {
            match store
                .search(text, DEFAULT_SEARCH_LIMIT, DEFAULT_SCORE_THRESHOLD)
                .await
            {
                Ok(snippets) if !snippets.is_empty() => {
                    prompt_text.push_str("\n\n<attachments>\n");
                    prompt_text.push_str(&snippets.join(""));
                    prompt_text.push_str("</attachments>\n");
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "retrieval failed, prompting without attachments");
                }
            }
        }

        let table = self.build_tool_table()?;
        tracing::debug!(tools = table.len(), "dispatching prompt to delegated core");
        let answer = self.core.prompt_with_tools(&prompt_text, &table).await?;

        if let Some(memory) = &self.memory {
            let mut memory = memory.lock().await;
            memory.add_user_message(text);
            memory.add_ai_message(&answer);
        }

        Ok(answer)
    }
}
