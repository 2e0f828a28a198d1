//! Stateful multi-turn chat session with the Aura persona.

use tracing::error;

use crate::error::AiError;
use crate::model::{ChatTurn, GenerateRequest, GenerativeModel};

/// Persona, tone, and behavioral constraints seeded at session creation.
const SYSTEM_INSTRUCTION: &str = "You are Aura, an expert financial analyst AI. Your goal is to provide clear, friendly, and helpful insights into a user's financial situation. Be conversational, and ask one clarifying question at a time to better understand the user's goals. Do not give prescriptive financial advice. Keep your replies structured and easy to read.";

/// Synthetic first turn; its reply becomes the first transcript entry.
const PRIMING_MESSAGE: &str = "Introduce yourself and ask me about my primary financial goal.";

/// Substituted when the priming call fails, so the transcript is never empty.
const PRIMING_FALLBACK: &str = "Hello! I'm Aura, your AI finance assistant. Unfortunately, I'm having a little trouble connecting right now. Please try again in a moment.";

/// Canned apology appended after a failed send, preserving conversational
/// continuity instead of an error banner.
pub const SEND_FALLBACK: &str = "I'm sorry, I encountered an error. Could you please try rephrasing your message?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    fn wire_name(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One transcript entry. Appended once, never mutated; the sequence is
/// cleared only by starting a new session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    /// Number of recent messages resent as context on each exchange.
    /// The stored transcript itself is never trimmed.
    pub max_turns_context: usize,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            max_turns_context: 12,
        }
    }
}

/// A chat session owns its history exclusively. `send` takes `&mut self`,
/// which makes "at most one outstanding send per session" hold at compile
/// time rather than by UI convention.
pub struct ChatSession<M> {
    model: M,
    options: ChatOptions,
    history: Vec<ChatMessage>,
}

impl<M: GenerativeModel> ChatSession<M> {
    /// Open a session and run the priming exchange. On priming failure the
    /// canned introduction is substituted, so the transcript always starts
    /// with a model message.
    pub async fn start(model: M, options: ChatOptions) -> ChatSession<M> {
        let mut session = ChatSession {
            model,
            options,
            history: Vec::new(),
        };
        if let Err(e) = session.exchange(PRIMING_MESSAGE).await {
            error!(error = ?e, "chat priming failed");
            session.history.clear();
            session.history.push(ChatMessage {
                role: ChatRole::Model,
                text: PRIMING_FALLBACK.to_string(),
            });
        }
        session
    }

    /// Send one user turn and return the model's reply. On failure the user
    /// turn stays in the transcript and the caller substitutes the canned
    /// apology via [`ChatSession::append_fallback`].
    pub async fn send(&mut self, text: &str) -> Result<String, AiError> {
        self.exchange(text).await.map_err(|e| {
            error!(error = ?e, "chat send failed");
            AiError::SendFailed
        })
    }

    /// Append the canned apology as a model turn after a failed send.
    pub fn append_fallback(&mut self) -> &'static str {
        self.history.push(ChatMessage {
            role: ChatRole::Model,
            text: SEND_FALLBACK.to_string(),
        });
        SEND_FALLBACK
    }

    /// User-visible messages. The synthetic priming turn is not part of it.
    pub fn transcript(&self) -> &[ChatMessage] {
        let start = self
            .history
            .iter()
            .position(|m| m.role == ChatRole::Model)
            .unwrap_or(self.history.len());
        &self.history[start..]
    }

    async fn exchange(&mut self, text: &str) -> anyhow::Result<String> {
        self.history.push(ChatMessage {
            role: ChatRole::User,
            text: text.to_string(),
        });

        let reply = self.model.generate(&self.build_request()).await?;
        if reply.is_empty() {
            anyhow::bail!("model returned an empty reply");
        }

        self.history.push(ChatMessage {
            role: ChatRole::Model,
            text: reply.clone(),
        });
        Ok(reply)
    }

    fn build_request(&self) -> GenerateRequest {
        // Only the recent window is resent to keep requests small.
        let start = self
            .history
            .len()
            .saturating_sub(self.options.max_turns_context);
        let turns = self.history[start..]
            .iter()
            .map(|m| ChatTurn {
                role: m.role.wire_name().to_string(),
                content: m.text.clone(),
            })
            .collect();

        GenerateRequest {
            system_instruction: Some(SYSTEM_INSTRUCTION.to_string()),
            turns,
            response_schema: None,
            json_output: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::Mutex;

    struct ScriptedModel {
        replies: Mutex<Vec<Result<String, String>>>,
        requests: Mutex<Vec<GenerateRequest>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<String> {
            self.requests.lock().unwrap().push(req.clone());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                bail!("script exhausted");
            }
            replies.remove(0).map_err(|m| anyhow::anyhow!(m))
        }
    }

    #[tokio::test]
    async fn test_priming_reply_opens_the_transcript() {
        let model = ScriptedModel::new(vec![Ok("Hi, I'm Aura. What's your goal?".to_string())]);
        let session = ChatSession::start(model, ChatOptions::default()).await;

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, ChatRole::Model);
        assert_eq!(transcript[0].text, "Hi, I'm Aura. What's your goal?");
    }

    #[tokio::test]
    async fn test_priming_failure_substitutes_canned_greeting() {
        let model = ScriptedModel::new(vec![Err("offline".to_string())]);
        let session = ChatSession::start(model, ChatOptions::default()).await;

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, ChatRole::Model);
        assert!(transcript[0].text.starts_with("Hello! I'm Aura"));
    }

    #[tokio::test]
    async fn test_send_appends_user_and_model_turns() {
        let model = ScriptedModel::new(vec![
            Ok("Hi!".to_string()),
            Ok("Saving is a great goal.".to_string()),
        ]);
        let mut session = ChatSession::start(model, ChatOptions::default()).await;

        let reply = session.send("I want to save more").await.unwrap();
        assert_eq!(reply, "Saving is a great goal.");

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].role, ChatRole::User);
        assert_eq!(transcript[2].text, "Saving is a great goal.");
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_turn_and_fallback_appends() {
        let model = ScriptedModel::new(vec![Ok("Hi!".to_string()), Err("timeout".to_string())]);
        let mut session = ChatSession::start(model, ChatOptions::default()).await;

        let err = session.send("hello?").await.unwrap_err();
        assert_eq!(err, AiError::SendFailed);

        session.append_fallback();
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].text, "hello?");
        assert_eq!(transcript[2].text, SEND_FALLBACK);
    }

    #[tokio::test]
    async fn test_requests_carry_persona_but_no_schema() {
        let model = ScriptedModel::new(vec![Ok("Hi!".to_string())]);
        let session = ChatSession::start(model, ChatOptions::default()).await;

        let requests = session.model.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert!(req.system_instruction.as_deref().unwrap().contains("Aura"));
        assert!(req.response_schema.is_none());
        assert!(!req.json_output);
        assert_eq!(req.turns[0].role, "user");
    }

    #[tokio::test]
    async fn test_context_window_is_trimmed() {
        let replies: Vec<Result<String, String>> =
            (0..6).map(|i| Ok(format!("reply {i}"))).collect();
        let model = ScriptedModel::new(replies);
        let mut session = ChatSession::start(
            model,
            ChatOptions {
                max_turns_context: 4,
            },
        )
        .await;

        for i in 0..5 {
            session.send(&format!("message {i}")).await.unwrap();
        }

        let requests = session.model.requests.lock().unwrap();
        let last = requests.last().unwrap();
        assert_eq!(last.turns.len(), 4);
        // The full transcript keeps everything.
        drop(requests);
        assert_eq!(session.transcript().len(), 11);
    }
}
