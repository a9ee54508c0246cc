//! Chat orchestration: system prompt + normalized history → model reply.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::history::normalize_history;
use crate::llm::{ChatProvider, LlmError};
use crate::models::chat::Message;
use crate::prompt::PromptSource;

/// Result of one successful chat exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    /// The assistant's reply text.
    pub reply: String,
    /// Normalized history, ending with the user turn and the assistant reply.
    /// The system prompt is not included.
    pub transcript: Vec<Message>,
}

/// Assembles the model request for a chat turn and invokes the provider.
#[derive(Clone)]
pub struct ChatOrchestrator {
    provider: Arc<dyn ChatProvider>,
    prompt: PromptSource,
}

impl ChatOrchestrator {
    pub fn new(provider: Arc<dyn ChatProvider>, prompt: PromptSource) -> Self {
        Self { provider, prompt }
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Build the ordered message list sent to the model, returning it together
    /// with the normalized history it was built from.
    pub async fn build_messages(
        &self,
        message: &str,
        history: &Value,
    ) -> (Vec<Message>, Vec<Message>) {
        let normalized = normalize_history(history, message);
        let system_prompt = self.prompt.load().await;

        let mut outbound = Vec::with_capacity(normalized.len() + 1);
        outbound.push(Message::system(system_prompt));
        outbound.extend(normalized.iter().cloned());
        (outbound, normalized)
    }

    /// Run one exchange: normalize, prepend the system prompt, ask the model.
    pub async fn reply(&self, message: &str, history: &Value) -> Result<ChatTurn, LlmError> {
        let (outbound, mut transcript) = self.build_messages(message, history).await;
        debug!(
            provider = self.provider.name(),
            messages = outbound.len(),
            "requesting chat completion"
        );

        let reply = self.provider.complete(&outbound).await?;
        transcript.push(Message::assistant(reply.clone()));

        Ok(ChatTurn { reply, transcript })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::models::chat::Role;

    #[derive(Default)]
    struct RecordingProvider {
        seen: Mutex<Vec<Vec<Message>>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            if self.fail {
                return Err(LlmError::Request("connection refused".into()));
            }
            Ok(format!("echo: {}", messages.last().map(|m| m.content.as_str()).unwrap_or("")))
        }
    }

    fn orchestrator(provider: Arc<RecordingProvider>) -> ChatOrchestrator {
        ChatOrchestrator::new(
            provider,
            PromptSource::new(None, Some("be kind".into()), PathBuf::new()),
        )
    }

    #[tokio::test]
    async fn system_prompt_is_prepended_to_normalized_history() {
        let provider = Arc::new(RecordingProvider::default());
        let orch = orchestrator(provider.clone());

        let history = json!([
            {"role": "User", "content": "hi"},
            {"role": "assistant", "content": "hello"},
            {"role": "bogus", "content": "dropped"}
        ]);
        let turn = orch.reply("how are you?", &history).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            vec![
                Message::system("be kind"),
                Message::user("hi"),
                Message::assistant("hello"),
                Message::user("how are you?"),
            ]
        );
        assert_eq!(turn.reply, "echo: how are you?");
        assert_eq!(
            turn.transcript,
            vec![
                Message::user("hi"),
                Message::assistant("hello"),
                Message::user("how are you?"),
                Message::assistant("echo: how are you?"),
            ]
        );
    }

    #[tokio::test]
    async fn transcript_never_contains_the_system_prompt() {
        let provider = Arc::new(RecordingProvider::default());
        let turn = orchestrator(provider).reply("hello", &json!([])).await.unwrap();
        assert!(turn.transcript.iter().all(|m| m.role != Role::System));
        assert_eq!(turn.transcript.len(), 2);
    }

    #[tokio::test]
    async fn provider_errors_are_returned() {
        let provider = Arc::new(RecordingProvider {
            fail: true,
            ..Default::default()
        });
        let err = orchestrator(provider).reply("hello", &json!([])).await.unwrap_err();
        assert!(matches!(err, LlmError::Request(_)));
    }
}
