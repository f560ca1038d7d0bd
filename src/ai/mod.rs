//! Upstream generative-AI integration
//!
//! Handlers talk to the upstream only through [`GenerationService`], which
//! takes an ordered list of text and image inputs and returns the generated
//! text. The Gemini implementation lives in [`gemini`]; [`MockGenerationClient`]
//! stands in for it in tests.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiGenerationClient;
pub use mock::{MockGenerationClient, RecordedCall};

use crate::Result;
use async_trait::async_trait;
use std::fmt;

/// Which upstream model family a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Text,
    Multimodal,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Text => f.write_str("text"),
            Capability::Multimodal => f.write_str("multimodal"),
        }
    }
}

/// One item of upstream input, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputItem {
    Text(String),
    Image { mime_type: String, bytes: Vec<u8> },
}

impl InputItem {
    pub fn is_image(&self) -> bool {
        matches!(self, InputItem::Image { .. })
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Issue exactly one upstream call and return its combined text output.
    async fn generate(&self, capability: Capability, inputs: &[InputItem]) -> Result<String>;
}
