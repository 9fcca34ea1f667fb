use crate::config::AppConfig;
use crate::error::ModelError;
use crate::models::*;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// A hosted model that produces the next reply for a conversation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, request: &ChatRequest) -> Result<String, ModelError>;
}

pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request(request: &ChatRequest) -> GeminiRequest {
        let contents = request
            .turns
            .iter()
            .map(|turn| GeminiContent {
                role: Some(
                    match turn.role {
                        Role::Driver => "user",
                        Role::Responder => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: turn.content.clone(),
                }],
            })
            .collect();

        let generation_config = if request.max_output_tokens.is_some() || request.seed.is_some() {
            Some(GeminiGenerationConfig {
                max_output_tokens: request.max_output_tokens,
                seed: request.seed,
            })
        } else {
            None
        };

        GeminiRequest {
            contents,
            generation_config,
        }
    }

    fn classify_failure(status: StatusCode, retry_after: Option<u64>, body: &str) -> ModelError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return ModelError::RateLimited {
                retry_after_secs: retry_after,
            };
        }

        match serde_json::from_str::<GeminiErrorEnvelope>(body) {
            Ok(envelope) if envelope.error.status == "RESOURCE_EXHAUSTED" => {
                ModelError::RateLimited {
                    retry_after_secs: retry_after,
                }
            }
            Ok(envelope) => ModelError::Api {
                status: status.as_u16(),
                message: envelope.error.message,
            },
            Err(_) => ModelError::Api {
                status: status.as_u16(),
                message: body.to_string(),
            },
        }
    }
}

#[async_trait]
impl ChatModel for GeminiService {
    async fn generate(&self, request: &ChatRequest) -> Result<String, ModelError> {
        let body = Self::build_request(request);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::classify_failure(status, retry_after, &error_text));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        let answer = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn service(base_url: String) -> GeminiService {
        let config = AppConfig::from_lookup(|name| match name {
            "GEMINI_API_KEY" => Some("test-key".to_string()),
            "GEMINI_MODEL" => Some("gemini-test".to_string()),
            "GEMINI_BASE_URL" => Some(base_url.clone()),
            _ => None,
        })
        .unwrap();
        GeminiService::new(&config)
    }

    fn request() -> ChatRequest {
        ChatRequest {
            turns: vec![
                ChatTurn::driver("question"),
                ChatTurn::responder("first"),
                ChatTurn::driver("Continue."),
            ],
            max_output_tokens: Some(50),
            seed: Some(42),
        }
    }

    #[tokio::test]
    async fn sends_turns_and_generation_config() {
        async fn handler(
            Path(model): Path<String>,
            Query(query): Query<HashMap<String, String>>,
            Json(body): Json<Value>,
        ) -> Json<Value> {
            let roles: Vec<&str> = body["contents"]
                .as_array()
                .unwrap()
                .iter()
                .map(|c| c["role"].as_str().unwrap())
                .collect();
            let text = format!(
                "{}|{}|{}|{}|{}",
                model,
                query.get("key").cloned().unwrap_or_default(),
                roles.join(","),
                body["generationConfig"]["maxOutputTokens"],
                body["generationConfig"]["seed"],
            );
            Json(json!({
                "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
            }))
        }

        let base = spawn_stub(Router::new().route("/v1beta/models/:model", post(handler))).await;
        let reply = service(base).generate(&request()).await.unwrap();

        assert_eq!(
            reply,
            "gemini-test:generateContent|test-key|user,model,user|50|42"
        );
    }

    #[tokio::test]
    async fn joins_multiple_parts() {
        async fn handler() -> Json<Value> {
            Json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "a" }, { "text": "b" }] } }]
            }))
        }

        let base = spawn_stub(Router::new().route("/v1beta/models/:model", post(handler))).await;
        assert_eq!(service(base).generate(&request()).await.unwrap(), "ab");
    }

    #[tokio::test]
    async fn empty_candidates_give_empty_reply() {
        async fn handler() -> Json<Value> {
            Json(json!({ "candidates": [] }))
        }

        let base = spawn_stub(Router::new().route("/v1beta/models/:model", post(handler))).await;
        assert_eq!(service(base).generate(&request()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn status_429_is_rate_limited() {
        async fn handler() -> (AxumStatus, HeaderMap, &'static str) {
            let mut headers = HeaderMap::new();
            headers.insert("retry-after", "17".parse().unwrap());
            (AxumStatus::TOO_MANY_REQUESTS, headers, "slow down")
        }

        let base = spawn_stub(Router::new().route("/v1beta/models/:model", post(handler))).await;
        let err = service(base).generate(&request()).await.unwrap_err();
        assert_eq!(
            err,
            ModelError::RateLimited {
                retry_after_secs: Some(17)
            }
        );
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        async fn handler() -> (AxumStatus, Json<Value>) {
            (
                AxumStatus::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "code": 500, "message": "internal", "status": "INTERNAL" } })),
            )
        }

        let base = spawn_stub(Router::new().route("/v1beta/models/:model", post(handler))).await;
        let err = service(base).generate(&request()).await.unwrap_err();
        assert_eq!(
            err,
            ModelError::Api {
                status: 500,
                message: "internal".into()
            }
        );
    }

    #[test]
    fn resource_exhausted_body_is_rate_limited() {
        let body = r#"{"error":{"code":403,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = GeminiService::classify_failure(StatusCode::FORBIDDEN, None, body);
        assert!(err.is_rate_limited());
    }

    #[test]
    fn non_json_error_body_is_kept() {
        let err = GeminiService::classify_failure(StatusCode::BAD_GATEWAY, None, "upstream down");
        assert_eq!(
            err,
            ModelError::Api {
                status: 502,
                message: "upstream down".into()
            }
        );
    }

    #[test]
    fn no_generation_config_without_limits() {
        let req = ChatRequest {
            turns: vec![ChatTurn::driver("hi")],
            max_output_tokens: None,
            seed: None,
        };
        let body = serde_json::to_value(GeminiService::build_request(&req)).unwrap();
        assert!(body.get("generationConfig").is_none());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
    }
}
