//! Streaming conversation with rollback
//!
//! A [`Conversation`] is the short-lived message history of one phase. A
//! turn either completes (user and assistant messages both recorded) or
//! leaves the history exactly as it was before the turn.

use crate::ports::llm_gateway::{ChatRequest, GatewayError, LlmGateway};
use crate::ports::progress::PlanningProgress;
use planner_domain::{Message, StreamEvent};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct Conversation {
    model: String,
    system_prompt: String,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Send `content` and stream the reply.
    ///
    /// Each fragment goes to `sink` as it arrives and is accumulated. On
    /// gateway failure, stream error or cancellation the user message is
    /// removed again and the partial reply is dropped.
    pub async fn send_streaming(
        &mut self,
        gateway: &dyn LlmGateway,
        content: &str,
        sink: &dyn PlanningProgress,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        self.messages.push(Message::user(content));

        match self.stream_reply(gateway, sink, cancel).await {
            Ok(reply) => {
                self.messages.push(Message::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                debug!("Rolling back user turn: {}", e);
                self.messages.pop();
                Err(e)
            }
        }
    }

    async fn stream_reply(
        &self,
        gateway: &dyn LlmGateway,
        sink: &dyn PlanningProgress,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let request = ChatRequest {
            model: self.model.clone(),
            system_prompt: self.system_prompt.clone(),
            messages: self.messages.clone(),
        };

        let mut handle = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
            handle = gateway.stream_chat(request) => handle?,
        };

        let mut full_text = String::new();
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                event = handle.receiver.recv() => event,
            };

            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    sink.on_fragment(&chunk);
                    full_text.push_str(&chunk);
                }
                Some(StreamEvent::Completed(text)) => {
                    if full_text.is_empty() && !text.is_empty() {
                        sink.on_fragment(&text);
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                Some(StreamEvent::Error(e)) => return Err(GatewayError::RequestFailed(e)),
                None => {
                    return Err(GatewayError::RequestFailed(
                        "stream ended before completion".to_string(),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGateway, RecordingProgress, Scripted};
    use planner_domain::Role;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fragments_forwarded_and_accumulated() {
        let gateway = MockGateway::new(vec![Scripted::Reply(vec!["Hel".into(), "lo".into()])]);
        let progress = RecordingProgress::default();
        let mut conversation = Conversation::new("sonnet", "system");

        let reply = conversation
            .send_streaming(&gateway, "hi", &progress, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(reply, "Hello");
        assert_eq!(*progress.fragments.lock().unwrap(), vec!["Hel", "lo"]);
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.messages()[1].role, Role::Assistant);

        let requests = gateway.requests();
        assert_eq!(requests[0].model, "sonnet");
        assert_eq!(requests[0].system_prompt, "system");
        assert_eq!(requests[0].messages, vec![Message::user("hi")]);
    }

    #[tokio::test]
    async fn test_completed_without_deltas_is_one_fragment() {
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        tx.send(StreamEvent::Completed("whole reply".into()))
            .await
            .unwrap();
        drop(tx);

        struct OneShot(std::sync::Mutex<Option<tokio::sync::mpsc::Receiver<StreamEvent>>>);
        #[async_trait::async_trait]
        impl LlmGateway for OneShot {
            async fn stream_chat(
                &self,
                _request: ChatRequest,
            ) -> Result<crate::ports::llm_gateway::StreamHandle, GatewayError> {
                let rx = self.0.lock().unwrap().take().unwrap();
                Ok(crate::ports::llm_gateway::StreamHandle::new(rx))
            }
        }

        let gateway = OneShot(std::sync::Mutex::new(Some(rx)));
        let progress = RecordingProgress::default();
        let mut conversation = Conversation::new("claude", "system");
        let reply = conversation
            .send_streaming(&gateway, "hi", &progress, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(reply, "whole reply");
        assert_eq!(*progress.fragments.lock().unwrap(), vec!["whole reply"]);
    }

    #[tokio::test]
    async fn test_stream_error_rolls_back() {
        let gateway = MockGateway::new(vec![Scripted::StreamError(
            vec!["partial".into()],
            "overloaded".into(),
        )]);
        let mut conversation = Conversation::new("sonnet", "system");

        let err = conversation
            .send_streaming(&gateway, "hi", &RecordingProgress::default(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::RequestFailed(m) if m == "overloaded"));
        assert!(conversation.messages().is_empty());
    }

    #[tokio::test]
    async fn test_stream_closed_without_completion_rolls_back() {
        let gateway = MockGateway::new(vec![Scripted::Truncated(vec![
            "```yaml\nlayers:\n".into(),
        ])]);
        let progress = RecordingProgress::default();
        let mut conversation = Conversation::new("sonnet", "system");

        let err = conversation
            .send_streaming(&gateway, "hi", &progress, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::RequestFailed(m) if m.contains("before completion")));
        assert!(conversation.messages().is_empty());
        assert_eq!(progress.text(), "```yaml\nlayers:\n");
    }

    #[tokio::test]
    async fn test_gateway_failure_rolls_back() {
        let gateway = MockGateway::new(vec![Scripted::Fail(GatewayError::ConnectionError(
            "refused".into(),
        ))]);
        let mut conversation = Conversation::new("sonnet", "system");

        let result = conversation
            .send_streaming(&gateway, "hi", &RecordingProgress::default(), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(GatewayError::ConnectionError(_))));
        assert!(conversation.messages().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_rolls_back() {
        let gateway = MockGateway::new(vec![Scripted::Hang(vec!["half".into()])]);
        let progress = RecordingProgress::default();
        let cancel = CancellationToken::new();
        let mut conversation = Conversation::new("sonnet", "system");

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = conversation
            .send_streaming(&gateway, "hi", &progress, &cancel)
            .await;

        assert!(matches!(result, Err(GatewayError::Cancelled)));
        assert!(conversation.messages().is_empty());
        assert_eq!(progress.text(), "half");
    }

    #[tokio::test]
    async fn test_second_turn_keeps_history() {
        let gateway = MockGateway::new(vec![Scripted::reply("one"), Scripted::reply("two")]);
        let mut conversation = Conversation::new("sonnet", "system");
        let sink = RecordingProgress::default();
        let cancel = CancellationToken::new();

        conversation.send_streaming(&gateway, "a", &sink, &cancel).await.unwrap();
        conversation.send_streaming(&gateway, "b", &sink, &cancel).await.unwrap();

        assert_eq!(gateway.requests()[1].messages.len(), 3);
        assert_eq!(conversation.messages().len(), 4);
    }
}
