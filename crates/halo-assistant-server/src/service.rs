//! Retrieval-augmented answers.

use halo_assistant::types::{ChatMessage, ChatResponse, SourceReference};

use crate::model::ChatModel;
use crate::store::KnowledgeStore;

/// Tracing target for chat answers.
pub const TRACING_TARGET: &str = "halo_assistant_server::service";

/// Number of sources retrieved when the request does not ask for a positive count.
pub const DEFAULT_TOP_K: usize = 5;

/// Answer given to a blank question.
pub const BLANK_QUESTION_ANSWER: &str = "问题不能为空。";

/// Answers questions from the knowledge store, phrased by the chat model
/// when one is configured.
#[derive(Debug, Clone)]
pub struct AssistantService {
    store: KnowledgeStore,
    model: Option<ChatModel>,
}

impl AssistantService {
    /// Creates the service. Without a model every answer is a fallback.
    pub fn new(store: KnowledgeStore, model: Option<ChatModel>) -> Self {
        Self { store, model }
    }

    /// Returns whether a chat model is configured.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Answers `question`, citing up to `top_k` knowledge items.
    ///
    /// A model failure never fails the request; the answer falls back to a
    /// listing of the retrieved sources.
    pub async fn chat(
        &self,
        question: &str,
        history: &[ChatMessage],
        top_k: usize,
    ) -> ChatResponse {
        if question.trim().is_empty() {
            return ChatResponse {
                answer: BLANK_QUESTION_ANSWER.to_owned(),
                sources: Vec::new(),
            };
        }

        let sources = self.store.search(question, top_k).await;

        let answer = match &self.model {
            Some(model) => match model.complete(question, history, &sources).await {
                Ok(answer) => answer,
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %error,
                        sources = sources.len(),
                        "Chat model failed, answering from sources"
                    );
                    fallback_answer(&sources)
                }
            },
            None => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    "No chat model API key configured, answering from sources"
                );
                fallback_answer(&sources)
            }
        };

        ChatResponse { answer, sources }
    }
}

/// Builds an answer that only lists the retrieved sources.
pub fn fallback_answer(sources: &[SourceReference]) -> String {
    if sources.is_empty() {
        return "暂时无法连接到大模型服务，但已经为你检索了相关知识条目。请检查环境变量 \
                AI_ASSISTANT_API_KEY / AI_ASSISTANT_BASE_URL / AI_ASSISTANT_MODEL 是否配置正确。"
            .to_owned();
    }

    let mut answer =
        String::from("暂时无法连接到大模型服务，但已经为你检索到以下相关知识条目，可供参考：\n");
    for source in sources {
        answer.push_str(&format!("- 标题：{}；摘要：{}\n", source.title, source.snippet));
    }
    answer.push_str("\n请根据这些内容自行理解和整理答案。");
    answer
}
