//! The chat orchestrator: one question in, one reply out.
//!
//! Per request:
//!
//! 1. Validate the message and that a provider is configured
//! 2. Select chapters from the message text
//! 3. Assemble instructions + documents into the system context
//! 4. Send context + history + new message to the provider (once, no retry)
//! 5. Join every text segment of the reply
//!
//! Nothing is cached between requests; selection and context are rebuilt
//! from disk every time.

use std::sync::Arc;
use std::time::Duration;

use coursebot_config::{AppConfig, ConfigError};
use coursebot_core::context::{AssembledContext, ContextAssembler};
use coursebot_core::documents::DocumentStore;
use coursebot_core::error::ChatError;
use coursebot_core::instructions::InstructionSource;
use coursebot_core::message::ChatMessage;
use coursebot_core::provider::{Provider, ProviderRequest, Usage};
use coursebot_core::topics::{KeywordIndex, Selection};
use coursebot_providers::AnthropicProvider;
use tracing::{Instrument, error, info, info_span};

/// Everything needed to turn a question into a system context.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    index: Arc<KeywordIndex>,
    instructions: InstructionSource,
    store: DocumentStore,
    assembler: ContextAssembler,
}

impl ContextBuilder {
    pub fn new(
        index: KeywordIndex,
        instructions: InstructionSource,
        store: DocumentStore,
        assembler: ContextAssembler,
    ) -> Self {
        Self {
            index: Arc::new(index),
            instructions,
            store,
            assembler,
        }
    }

    pub fn index(&self) -> &KeywordIndex {
        &self.index
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn instructions(&self) -> &InstructionSource {
        &self.instructions
    }

    /// Select chapters for `message` and assemble the context. Blocking I/O.
    pub fn build(&self, message: &str) -> (Selection, AssembledContext) {
        let selection = self.index.select(message);
        let instructions = self.instructions.load();
        let context = self.assembler.assemble(&instructions, &selection, &self.store);
        (selection, context)
    }
}

/// A successful chat turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// All text segments of the reply, joined in order
    pub response: String,
    pub model: String,
    pub usage: Option<Usage>,
    pub selection: Selection,
    /// Documents that went into the context
    pub documents: Vec<String>,
}

/// Runs chat turns against the completion service.
pub struct ChatOrchestrator {
    provider: Option<Arc<dyn Provider>>,
    model: String,
    max_tokens: u32,
    context: ContextBuilder,
}

impl ChatOrchestrator {
    /// Create an orchestrator with no provider attached.
    pub fn new(context: ContextBuilder, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            provider: None,
            model: model.into(),
            max_tokens,
            context,
        }
    }

    /// Attach the completion service.
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build from configuration. The Anthropic provider is attached only
    /// when an API key is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let context = ContextBuilder::new(
            config.keyword_index()?,
            config.instruction_source(),
            config.document_store(),
            config.context_assembler(),
        );
        let orchestrator = Self::new(context, config.model.clone(), config.max_tokens);

        let Some(api_key) = config.api_key() else {
            return Ok(orchestrator);
        };

        let mut provider = AnthropicProvider::new(
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        )
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        if let Some(url) = &config.api_url {
            provider = provider.with_base_url(url.clone());
        }

        Ok(orchestrator.with_provider(Arc::new(provider)))
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn context(&self) -> &ContextBuilder {
        &self.context
    }

    /// Answer `message` given the prior `history`.
    pub async fn chat(
        &self,
        message: &str,
        history: Vec<ChatMessage>,
    ) -> Result<ChatReply, ChatError> {
        let span = info_span!("chat", request_id = %uuid::Uuid::new_v4());
        self.run(message, history).instrument(span).await
    }

    async fn run(&self, message: &str, history: Vec<ChatMessage>) -> Result<ChatReply, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::InvalidRequest("No message provided".into()));
        }

        let Some(provider) = self.provider.clone() else {
            error!("Chat request rejected: ANTHROPIC_API_KEY is not configured");
            return Err(ChatError::Misconfigured(
                "ANTHROPIC_API_KEY is not configured on the server".into(),
            ));
        };

        let builder = self.context.clone();
        let question = message.to_string();
        let (selection, context) = tokio::task::spawn_blocking(move || builder.build(&question))
            .await
            .map_err(|e| {
                error!(error = %e, "Context assembly task failed");
                ChatError::Internal(format!("context assembly task failed: {e}"))
            })?;

        info!(
            chapters = %selection,
            fallback = selection.is_fallback(),
            documents = context.included.len(),
            skipped = context.skipped.len(),
            context_tokens = context.estimated_tokens(),
            history = history.len(),
            "Context assembled"
        );

        let mut messages = history;
        messages.push(ChatMessage::user(message));

        let request = ProviderRequest {
            model: self.model.clone(),
            system: Some(context.text),
            messages,
            max_tokens: self.max_tokens,
        };

        let response = provider.complete(request).await.map_err(|e| {
            error!(provider = provider.name(), error = %e, "Completion request failed");
            ChatError::from(e)
        })?;

        if let Some(usage) = &response.usage {
            info!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Completion received"
            );
        }

        Ok(ChatReply {
            response: response.text(),
            model: response.model,
            usage: response.usage,
            selection,
            documents: context.included,
        })
    }
}
