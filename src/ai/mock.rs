use super::{Capability, GenerationService, InputItem};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A call observed by [`MockGenerationClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub capability: Capability,
    pub inputs: Vec<InputItem>,
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Text(String),
    Failure(String),
}

#[derive(Clone)]
pub struct MockGenerationClient {
    outcomes: Arc<Mutex<Vec<MockOutcome>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push(MockOutcome::Text(response.into()));
        self
    }

    /// Queue an upstream failure carrying `message`.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push(MockOutcome::Failure(message.into()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate(&self, capability: Capability, inputs: &[InputItem]) -> Result<String> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                capability,
                inputs: inputs.to_vec(),
            });
            calls.len()
        };

        let outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            // Default mock response
            return Ok(format!("Mock {} response to {} input(s)", capability, inputs.len()));
        }

        match &outcomes[(count - 1) % outcomes.len()] {
            MockOutcome::Text(text) => Ok(text.clone()),
            MockOutcome::Failure(message) => Err(Error::AiProvider(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let client = MockGenerationClient::new();

        let text = client
            .generate(Capability::Text, &[InputItem::Text("hello".into())])
            .await
            .unwrap();
        assert_eq!(text, "Mock text response to 1 input(s)");
    }

    #[tokio::test]
    async fn test_mock_custom_responses_cycle() {
        let client = MockGenerationClient::new()
            .with_response("first")
            .with_error("quota exceeded");

        assert_eq!(client.generate(Capability::Text, &[]).await.unwrap(), "first");

        let err = client.generate(Capability::Text, &[]).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(msg) if msg == "quota exceeded"));

        // Should cycle back
        assert_eq!(client.generate(Capability::Text, &[]).await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let client = MockGenerationClient::new();
        assert_eq!(client.get_call_count(), 0);

        let inputs = vec![
            InputItem::Text("what is this".into()),
            InputItem::Image {
                mime_type: "image/png".into(),
                bytes: vec![0x89, 0x50],
            },
        ];
        client
            .generate(Capability::Multimodal, &inputs)
            .await
            .unwrap();

        assert_eq!(client.get_call_count(), 1);
        assert_eq!(
            client.calls()[0],
            RecordedCall {
                capability: Capability::Multimodal,
                inputs,
            }
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let client = MockGenerationClient::new();
        let observer = client.clone();

        client.generate(Capability::Text, &[]).await.unwrap();
        assert_eq!(observer.get_call_count(), 1);
    }
}
