//! OpenAI-compatible chat completion client.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use halo_assistant::types::{ChatMessage, SourceReference};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ModelConfig;

/// Tracing target for chat model calls.
pub const TRACING_TARGET: &str = "halo_assistant_server::model";

/// Connection establishment timeout for the completion service.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sampling temperature of every completion request.
const TEMPERATURE: f64 = 0.2;

/// Instructions placed first in every completion request.
const SYSTEM_PROMPT: &str =
    "你是一个网站 AI 助手，会参考提供的知识片段，用简体中文回答问题，并在需要时引用来源标题。";

/// Errors raised while asking the chat model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The API key cannot be sent as a header value.
    #[error("API key is not a valid header value")]
    InvalidApiKey,

    /// The request could not be sent or the response not read.
    #[error("completion request failed")]
    Request(#[from] reqwest::Error),

    /// The service answered with something other than 200.
    #[error("completion service responded with HTTP {0}")]
    Status(u16),

    /// The response held no usable answer.
    #[error("completion response has no answer")]
    EmptyAnswer,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: Cow<'a, str>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

struct ChatModelInner {
    http: Client,
    config: ModelConfig,
}

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatModel {
    inner: Arc<ChatModelInner>,
}

impl std::fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ChatModel {
    /// Creates a model client, or `None` when no API key is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client cannot be created.
    pub fn from_config(config: &ModelConfig) -> Result<Option<Self>, ModelError> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };

        let mut authorization = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| ModelError::InvalidApiKey)?;
        authorization.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        let http = Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout())
            .build()?;

        tracing::debug!(
            target: TRACING_TARGET,
            url = %config.completions_url(),
            model = %config.model,
            "Chat model configured"
        );

        Ok(Some(Self {
            inner: Arc::new(ChatModelInner {
                http,
                config: config.clone(),
            }),
        }))
    }

    /// Asks the model to answer `question` with the retrieved sources as context.
    ///
    /// History messages with blank content are skipped.
    pub async fn complete(
        &self,
        question: &str,
        history: &[ChatMessage],
        sources: &[SourceReference],
    ) -> Result<String, ModelError> {
        let started_at = Instant::now();
        let config = &self.inner.config;

        let mut messages = vec![CompletionMessage {
            role: "system",
            content: Cow::Borrowed(SYSTEM_PROMPT),
        }];
        messages.extend(
            history
                .iter()
                .filter(|message| !message.content.trim().is_empty())
                .map(|message| {
                    let role: &'static str = message.role.into();
                    CompletionMessage {
                        role,
                        content: Cow::Borrowed(message.content.as_str()),
                    }
                }),
        );
        messages.push(CompletionMessage {
            role: "user",
            content: Cow::Owned(user_prompt(question, sources)),
        });

        let request = CompletionRequest {
            model: &config.model,
            messages,
            temperature: TEMPERATURE,
        };

        let response = self
            .inner
            .http
            .post(config.completions_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                target: TRACING_TARGET,
                status,
                body = %body,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Chat model rejected the request"
            );
            return Err(ModelError::Status(status));
        }

        let completion: CompletionResponse = response.json().await?;
        let answer = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ModelError::EmptyAnswer)?;

        tracing::debug!(
            target: TRACING_TARGET,
            answer_chars = answer.chars().count(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Chat model answered"
        );

        Ok(answer)
    }
}

/// Builds the final user turn: the retrieved context followed by the question.
fn user_prompt(question: &str, sources: &[SourceReference]) -> String {
    let mut prompt = String::new();

    if sources.is_empty() {
        prompt.push_str("没有检索到相关知识，请根据你已有的知识回答问题。");
    } else {
        prompt.push_str("以下是与问题相关的知识片段：\n");
        for source in sources {
            prompt.push_str(&format!(
                "- 标题：{}\n  摘要：{}\n",
                source.title, source.snippet
            ));
        }
        prompt.push_str("\n请结合上述内容，用简体中文回答用户的问题，并在需要时提到对应的知识条目标题。");
    }

    prompt.push_str("\n\n用户问题：");
    prompt.push_str(question);
    prompt
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::post;
    use axum::{Json, extract::State};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    use super::*;

    type Captured = Arc<Mutex<Vec<(String, Value)>>>;

    async fn serve_completions(status: StatusCode, answer: Value) -> (String, Captured) {
        let captured = Captured::default();
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    move |State(captured): State<Captured>,
                          headers: AxumHeaders,
                          Json(body): Json<Value>| {
                        let answer = answer.clone();
                        async move {
                            let authorization = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or_default()
                                .to_owned();
                            captured.lock().await.push((authorization, body));
                            (status, Json(answer))
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}/"), captured)
    }

    fn model(base_url: &str) -> ChatModel {
        let config = ModelConfig::default()
            .with_api_key("sk-test")
            .with_base_url(base_url);
        ChatModel::from_config(&config).unwrap().unwrap()
    }

    fn source(title: &str, snippet: &str) -> SourceReference {
        SourceReference {
            id: "kb-1".into(),
            title: title.into(),
            snippet: snippet.into(),
        }
    }

    #[test]
    fn test_no_api_key_means_no_model() {
        assert!(ChatModel::from_config(&ModelConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_user_prompt_lists_sources() {
        let prompt = user_prompt("什么是 Halo？", &[source("关于", "Halo 是一个建站工具")]);
        assert!(prompt.starts_with("以下是与问题相关的知识片段：\n- 标题：关于\n  摘要：Halo 是一个建站工具\n"));
        assert!(prompt.ends_with("\n\n用户问题：什么是 Halo？"));

        let prompt = user_prompt("q", &[]);
        assert!(prompt.starts_with("没有检索到相关知识"));
    }

    #[tokio::test]
    async fn test_complete_sends_conversation() {
        let (base_url, captured) = serve_completions(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "role": "assistant", "content": "答案" } }] }),
        )
        .await;

        let history = [
            ChatMessage::user("hi"),
            ChatMessage::assistant("   "),
            ChatMessage::assistant("hello"),
        ];
        let answer = model(&base_url)
            .complete("q", &history, &[source("T", "S")])
            .await
            .unwrap();
        assert_eq!(answer, "答案");

        let captured = captured.lock().await;
        let (authorization, body) = &captured[0];
        assert_eq!(authorization, "Bearer sk-test");
        assert_eq!(body["model"], "gpt-4.1-mini");
        assert_eq!(body["temperature"], json!(0.2));

        let roles: Vec<&str> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn test_complete_rejects_error_status() {
        let (base_url, _) =
            serve_completions(StatusCode::UNAUTHORIZED, json!({ "error": "bad key" })).await;

        let error = model(&base_url).complete("q", &[], &[]).await.unwrap_err();
        assert!(matches!(error, ModelError::Status(401)));
    }

    #[tokio::test]
    async fn test_complete_rejects_blank_answer() {
        let (base_url, _) = serve_completions(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "content": "  " } }] }),
        )
        .await;
        let error = model(&base_url).complete("q", &[], &[]).await.unwrap_err();
        assert!(matches!(error, ModelError::EmptyAnswer));

        let (base_url, _) = serve_completions(StatusCode::OK, json!({ "choices": [] })).await;
        let error = model(&base_url).complete("q", &[], &[]).await.unwrap_err();
        assert!(matches!(error, ModelError::EmptyAnswer));
    }
}
