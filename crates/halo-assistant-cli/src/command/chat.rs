//! One-shot and interactive chat.

use std::io::Write;

use halo_assistant::AssistantClient;
use halo_assistant::types::{ChatMessage, ChatRequest, ChatResponse};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::TRACING_TARGET_COMMAND;

/// Conversation state kept by the console between questions.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    top_k: Option<u32>,
    system: Option<String>,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    /// Creates an empty session.
    pub fn new(top_k: Option<u32>, system: Option<String>) -> Self {
        Self {
            top_k,
            system,
            history: Vec::new(),
        }
    }

    /// Builds the request for the next question.
    ///
    /// History is only attached when there is something to send.
    pub fn request(&self, question: &str) -> ChatRequest {
        let history: Vec<ChatMessage> = self
            .system
            .iter()
            .map(|system| ChatMessage::system(system.as_str()))
            .chain(self.history.iter().cloned())
            .collect();

        let mut request = ChatRequest::new(question);
        if !history.is_empty() {
            request = request.with_history(history);
        }
        if let Some(top_k) = self.top_k {
            request = request.with_top_k(top_k);
        }
        request
    }

    /// Records a completed exchange.
    pub fn record(&mut self, question: &str, answer: &str) {
        self.history.push(ChatMessage::user(question));
        self.history.push(ChatMessage::assistant(answer));
    }

    /// Forgets every recorded exchange.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Returns the number of recorded exchanges.
    pub fn turns(&self) -> usize {
        self.history.len() / 2
    }
}

/// Asks a single question.
pub(super) async fn run_once<W: Write>(
    client: &AssistantClient,
    session: &ChatSession,
    question: &str,
    json: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let response = client.chat(&session.request(question)).await?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &response)?;
        writeln!(out)?;
    } else {
        render_response(&response, out)?;
    }
    Ok(())
}

/// Reads questions line by line until `/exit` or end of input.
///
/// A failed question is reported and the conversation continues without
/// recording it.
pub(super) async fn run_interactive<R, W>(
    client: &AssistantClient,
    mut session: ChatSession,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    prompt(out)?;

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "/exit" | "/quit" => break,
            "/reset" => {
                session.reset();
                writeln!(out, "(history cleared)")?;
            }
            question => match client.chat(&session.request(question)).await {
                Ok(response) => {
                    render_response(&response, out)?;
                    session.record(question, &response.answer);
                }
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET_COMMAND,
                        error = %error,
                        turns = session.turns(),
                        "Chat request failed"
                    );
                    writeln!(out, "error: {error}")?;
                }
            },
        }
        prompt(out)?;
    }

    writeln!(out)?;
    Ok(())
}

fn prompt<W: Write>(out: &mut W) -> std::io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

/// Prints the answer followed by its numbered sources.
pub(super) fn render_response<W: Write>(
    response: &ChatResponse,
    out: &mut W,
) -> std::io::Result<()> {
    writeln!(out, "{}", response.answer.trim_end())?;

    if response.has_sources() {
        writeln!(out)?;
        writeln!(out, "Sources:")?;
        for (index, source) in response.sources.iter().enumerate() {
            writeln!(out, "  [{}] {} ({})", index + 1, source.title, source.id)?;
            if !source.snippet.is_empty() {
                writeln!(out, "      {}", source.snippet.trim())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use halo_assistant::ClientConfig;
    use halo_assistant::transport::MockTransport;
    use halo_assistant::types::{Role, SourceReference};
    use serde_json::json;

    use super::*;

    fn client(transport: &MockTransport) -> AssistantClient {
        let config = ClientConfig::default().with_origin("http://localhost:8090");
        AssistantClient::with_transport(config, transport.clone())
    }

    fn sent_request(transport: &MockTransport, index: usize) -> ChatRequest {
        transport.requests()[index].json_body().unwrap().unwrap()
    }

    #[test]
    fn test_first_request_has_no_history() {
        let request = ChatSession::new(None, None).request("hi");
        assert_eq!(request, ChatRequest::new("hi"));
    }

    #[test]
    fn test_request_carries_system_and_history() {
        let mut session = ChatSession::new(Some(4), Some("Be brief.".into()));
        session.record("q1", "a1");

        let request = session.request("q2");
        let history = request.history.unwrap();
        let roles: Vec<Role> = history.iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::System, Role::User, Role::Assistant]);
        assert_eq!(history[2].content, "a1");
        assert_eq!(request.top_k, Some(4));
        assert_eq!(session.turns(), 1);
    }

    #[test]
    fn test_render_response_lists_sources() {
        let response = ChatResponse {
            answer: "Halo is a CMS.\n".into(),
            sources: vec![SourceReference {
                id: "k1".into(),
                title: "About".into(),
                snippet: "Halo is...".into(),
            }],
        };

        let mut out = Vec::new();
        render_response(&response, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Halo is a CMS.\n\nSources:\n  [1] About (k1)\n      Halo is...\n"
        );
    }

    #[tokio::test]
    async fn test_run_once_prints_json() {
        let transport = MockTransport::new();
        transport.push_json(200, &json!({ "answer": "42", "sources": [] }));

        let mut out = Vec::new();
        run_once(
            &client(&transport),
            &ChatSession::default(),
            "meaning?",
            true,
            &mut out,
        )
        .await
        .unwrap();

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed, json!({ "answer": "42", "sources": [] }));
    }

    #[tokio::test]
    async fn test_interactive_keeps_history() {
        let transport = MockTransport::new();
        transport.push_json(200, &json!({ "answer": "a1", "sources": [] }));
        transport.push_json(200, &json!({ "answer": "a2", "sources": [] }));
        transport.push_json(200, &json!({ "answer": "a3", "sources": [] }));

        let input: &[u8] = b"q1\nq2\n/reset\nq3\n/exit\nignored\n";
        let mut out = Vec::new();
        run_interactive(&client(&transport), ChatSession::default(), input, &mut out)
            .await
            .unwrap();

        assert_eq!(transport.requests().len(), 3);
        assert!(sent_request(&transport, 0).history.is_none());
        assert_eq!(
            sent_request(&transport, 1).history.unwrap(),
            vec![ChatMessage::user("q1"), ChatMessage::assistant("a1")]
        );
        assert!(sent_request(&transport, 2).history.is_none());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("a2"));
        assert!(text.contains("(history cleared)"));
    }

    #[tokio::test]
    async fn test_interactive_survives_errors() {
        let transport = MockTransport::new();
        transport.push_json(500, &json!({ "message": "boom" }));
        transport.push_json(200, &json!({ "answer": "ok", "sources": [] }));

        let input: &[u8] = b"q1\nq2\n";
        let mut out = Vec::new();
        run_interactive(&client(&transport), ChatSession::default(), input, &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("error: "));
        assert!(text.contains("ok"));
        assert!(sent_request(&transport, 1).history.is_none());
    }
}
