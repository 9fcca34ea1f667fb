use crate::conversation::{initiate_chat, DriverAgent, ResponderAgent};
use crate::error::SummarizerError;
use crate::models::ChatResult;
use std::time::Duration;
use tokio::time::sleep;

/// Fixed-delay retry on rate limiting. No jitter, no growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_secs(60),
        }
    }
}

/// Runs [`initiate_chat`], retrying only when the provider rate limits.
///
/// Other model errors are returned after the first attempt. Once
/// `max_retries` attempts have all been rate limited the result is
/// [`SummarizerError::QuotaExceeded`].
pub async fn initiate_chat_with_retry(
    driver: &DriverAgent,
    responder: &ResponderAgent,
    message: &str,
    max_tokens: Option<u32>,
    policy: RetryPolicy,
) -> Result<ChatResult, SummarizerError> {
    for attempt in 1..=policy.max_retries {
        match initiate_chat(driver, responder, message, max_tokens).await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_rate_limited() => {
                if attempt < policy.max_retries {
                    log::warn!(
                        "Quota exceeded. Retrying in {} seconds... (Attempt {}/{})",
                        policy.delay.as_secs(),
                        attempt,
                        policy.max_retries
                    );
                    sleep(policy.delay).await;
                } else {
                    log::warn!(
                        "Quota exceeded on final attempt {}/{}",
                        attempt,
                        policy.max_retries
                    );
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(SummarizerError::QuotaExceeded {
        attempts: policy.max_retries,
    })
}
