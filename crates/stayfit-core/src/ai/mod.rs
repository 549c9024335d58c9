//! Generative-text service interface.
//!
//! The planner only needs raw text back for a prompt; everything about the
//! answer's structure is handled by [`crate::plan::parse_diet_plan`].

pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;

pub use gemini::{GeminiClient, GeminiConfig};

/// A service that turns a prompt into free-form text.
///
/// Object-safe so it can be held as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short name for logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send `prompt` and return the model's raw answer.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn TextGenerator) {}
};
