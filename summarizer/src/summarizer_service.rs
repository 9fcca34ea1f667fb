use crate::config::{AppConfig, RESPONDER_CACHE_SEED, RESPONDER_SEED};
use crate::conversation::{DriverAgent, DriverConfig, ResponderAgent, ResponderConfig};
use crate::document_processor::DocumentProcessor;
use crate::error::SummarizerError;
use crate::gemini_service::{ChatModel, GeminiService};
use crate::retry::{initiate_chat_with_retry, RetryPolicy};
use crate::summary::{compose_prompt, summarize_history};
use std::path::PathBuf;
use std::sync::Arc;

/// Prompt -> retried exchange -> truncated summary.
///
/// Built once at startup and shared by every request.
pub struct Summarizer {
    driver: DriverAgent,
    responder: ResponderAgent,
    policy: RetryPolicy,
    max_tokens: Option<u32>,
    document_processor: DocumentProcessor,
}

impl Summarizer {
    pub fn new(
        driver: DriverAgent,
        responder: ResponderAgent,
        policy: RetryPolicy,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            driver,
            responder,
            policy,
            max_tokens,
            document_processor: DocumentProcessor::new(),
        }
    }

    /// Wires the given model into the standard agent pair.
    pub fn with_model(config: &AppConfig, model: Arc<dyn ChatModel>) -> Self {
        let responder = ResponderAgent::new(
            "assistant",
            ResponderConfig {
                model: config.model.clone(),
                seed: RESPONDER_SEED,
                cache_seed: Some(RESPONDER_CACHE_SEED),
                max_output_tokens: Some(config.max_output_tokens),
            },
            model,
        );
        let driver = DriverAgent::new("user_proxy", DriverConfig::default());
        let policy = RetryPolicy {
            max_retries: config.max_retries,
            delay: config.retry_delay,
        };

        Self::new(driver, responder, policy, Some(config.max_output_tokens))
    }

    pub fn from_config(config: &AppConfig) -> Self {
        log::info!("Using Gemini model {}", config.model);
        Self::with_model(config, Arc::new(GeminiService::new(config)))
    }

    pub async fn answer(&self, question: &str, pdf_text: &str) -> Result<String, SummarizerError> {
        let prompt = compose_prompt(question, pdf_text);
        let result = initiate_chat_with_retry(
            &self.driver,
            &self.responder,
            &prompt,
            self.max_tokens,
            self.policy,
        )
        .await?;

        log::info!(
            "Exchange finished with {} turns ({:?})",
            result.history.len(),
            result.termination
        );

        Ok(summarize_history(&result))
    }

    /// Reads a stored upload's text off the request runtime.
    pub async fn extract(&self, file_path: PathBuf) -> Result<String, SummarizerError> {
        self.document_processor
            .extract_text_blocking_safe(file_path)
            .await
    }
}
