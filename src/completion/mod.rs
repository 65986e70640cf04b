//! Single-shot text completion used to synthesize answers.

mod openai;

pub use openai::OpenAICompleter;

use crate::error::Result;
use async_trait::async_trait;

/// Stateless prompt-in, text-out language model call.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Complete `prompt` and return the model's text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
