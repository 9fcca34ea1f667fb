//! The driver/responder pair and the exchange between them.
//!
//! Agents only hold immutable configuration (plus the responder's bounded
//! reply cache), so one pair can serve concurrent requests. Every call to
//! [`initiate_chat`] starts from an empty history.

use crate::error::ModelError;
use crate::gemini_service::ChatModel;
use crate::models::*;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const TERMINATION_SENTINEL: &str = "TERMINATE";
pub const MAX_CONSECUTIVE_AUTO_REPLY: u32 = 2;
pub const RESPONSE_CACHE_CAPACITY: usize = 128;

/// True when the turn's content, right-trimmed, ends with `TERMINATE`.
pub fn ends_with_terminate(turn: &ChatTurn) -> bool {
    turn.content.trim_end().ends_with(TERMINATION_SENTINEL)
}

#[derive(Clone)]
pub struct DriverConfig {
    pub max_consecutive_auto_reply: u32,
    pub is_termination: fn(&ChatTurn) -> bool,
    pub default_auto_reply: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_consecutive_auto_reply: MAX_CONSECUTIVE_AUTO_REPLY,
            is_termination: ends_with_terminate,
            default_auto_reply: "Continue.".to_string(),
        }
    }
}

/// Sends the opening message and keeps the exchange going automatically.
#[derive(Clone)]
pub struct DriverAgent {
    pub name: String,
    pub config: DriverConfig,
}

impl DriverAgent {
    pub fn new(name: impl Into<String>, config: DriverConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    fn should_stop(&self, reply: &ChatTurn) -> bool {
        (self.config.is_termination)(reply)
    }

    /// The driver is fully automated, so this is always the configured default.
    fn auto_reply(&self) -> ChatTurn {
        ChatTurn::driver(self.config.default_auto_reply.clone())
    }
}

#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub model: String,
    pub seed: i64,
    pub cache_seed: Option<u64>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Default)]
struct CacheEntries {
    replies: HashMap<String, String>,
    order: VecDeque<String>,
}

/// In-memory reply cache keyed by cache seed and a SHA-256 digest of the
/// request. Holds at most `capacity` entries; the oldest insert goes first.
pub struct ResponseCache {
    capacity: usize,
    entries: RwLock<CacheEntries>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_capacity(RESPONSE_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(CacheEntries::default()),
        }
    }

    fn key(cache_seed: u64, request: &ChatRequest) -> String {
        let body = serde_json::to_vec(request).unwrap_or_default();
        format!("{cache_seed}:{}", hex::encode(Sha256::digest(&body)))
    }

    pub async fn get(&self, cache_seed: u64, request: &ChatRequest) -> Option<String> {
        self.entries
            .read()
            .await
            .replies
            .get(&Self::key(cache_seed, request))
            .cloned()
    }

    pub async fn insert(&self, cache_seed: u64, request: &ChatRequest, reply: String) {
        if self.capacity == 0 {
            return;
        }
        let key = Self::key(cache_seed, request);
        let mut entries = self.entries.write().await;

        if entries.replies.insert(key.clone(), reply).is_none() {
            entries.order.push_back(key);
        }
        while entries.replies.len() > self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.replies.remove(&oldest);
                }
                None => break,
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.replies.len()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

/// The model-backed side of the exchange.
pub struct ResponderAgent {
    pub name: String,
    pub config: ResponderConfig,
    model: Arc<dyn ChatModel>,
    cache: ResponseCache,
}

impl ResponderAgent {
    pub fn new(name: impl Into<String>, config: ResponderConfig, model: Arc<dyn ChatModel>) -> Self {
        Self::with_cache(name, config, model, ResponseCache::new())
    }

    pub fn with_cache(
        name: impl Into<String>,
        config: ResponderConfig,
        model: Arc<dyn ChatModel>,
        cache: ResponseCache,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            model,
            cache,
        }
    }

    async fn reply(
        &self,
        history: &[ChatTurn],
        max_tokens: Option<u32>,
    ) -> Result<ChatTurn, ModelError> {
        let request = ChatRequest {
            turns: history.to_vec(),
            max_output_tokens: max_tokens.or(self.config.max_output_tokens),
            seed: Some(self.config.seed),
        };

        if let Some(cache_seed) = self.config.cache_seed {
            if let Some(hit) = self.cache.get(cache_seed, &request).await {
                log::debug!("{}: cache hit (cache_seed={})", self.name, cache_seed);
                return Ok(ChatTurn::responder(hit));
            }
        }

        let content = self.model.generate(&request).await?;

        if let Some(cache_seed) = self.config.cache_seed {
            self.cache.insert(cache_seed, &request, content.clone()).await;
        }

        Ok(ChatTurn::responder(content))
    }
}

/// Runs one full exchange.
///
/// The driver's message goes first. After each responder reply the driver
/// checks the termination predicate, then either stops or auto-replies while
/// its budget lasts. `max_tokens` caps every responder turn.
pub async fn initiate_chat(
    driver: &DriverAgent,
    responder: &ResponderAgent,
    message: &str,
    max_tokens: Option<u32>,
) -> Result<ChatResult, ModelError> {
    let mut history = vec![ChatTurn::driver(message)];
    let mut auto_replies = 0;

    log::info!(
        "{} -> {}: starting exchange ({} chars)",
        driver.name,
        responder.name,
        message.chars().count()
    );

    loop {
        let reply = responder.reply(&history, max_tokens).await?;
        let stop = driver.should_stop(&reply);
        history.push(reply);

        if stop {
            log::info!("{}: termination sentinel received", driver.name);
            return Ok(ChatResult {
                history,
                termination: TerminationReason::Sentinel,
            });
        }

        if auto_replies >= driver.config.max_consecutive_auto_reply {
            log::info!(
                "{}: auto-reply limit ({}) reached",
                driver.name,
                driver.config.max_consecutive_auto_reply
            );
            return Ok(ChatResult {
                history,
                termination: TerminationReason::AutoReplyLimit,
            });
        }

        history.push(driver.auto_reply());
        auto_replies += 1;
    }
}
