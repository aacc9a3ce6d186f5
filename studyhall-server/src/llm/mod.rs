// Copyright 2025 Studyhall Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Completion relay: one provider interface with two delivery modes.
//!
//! `complete` returns the whole result; `stream` hands back a channel of raw
//! text chunks. Endpoints pick a mode, never a provider; provider selection
//! and the model identifier are fixed by configuration. No retries, no
//! caching, no per-user limits.

use crate::config::LlmConfig;
use dashmap::DashMap;
use std::sync::Arc;
use studyhall_core::{ChatMessage, RecallCard};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub mod prompts;
mod providers;
pub use providers::{GroqProvider, OllamaProvider};

/// Title prompts carry at most this many characters of note content.
pub const TITLE_SNIPPET_CHARS: usize = 500;

/// A whole-result completion.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub duration_ms: u32,
}

#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
    ) -> anyhow::Result<Completion>;

    /// Chunks are raw text deltas; the channel closing is the only
    /// end-of-stream signal. Errors after the first chunk close the channel
    /// early rather than surfacing.
    async fn stream(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
    ) -> anyhow::Result<mpsc::Receiver<String>>;

    fn name(&self) -> &str;
}

pub struct CompletionRelay {
    providers: DashMap<String, Arc<dyn LlmProvider>>,
    default_provider: String,
    model: String,
}

impl CompletionRelay {
    pub fn from_config(config: &LlmConfig) -> anyhow::Result<Self> {
        let providers: DashMap<String, Arc<dyn LlmProvider>> = DashMap::new();

        if let Some(key) = &config.groq_api_key {
            let provider = GroqProvider::new(key.clone(), config.groq_base_url.clone());
            providers.insert("groq".to_string(), Arc::new(provider) as Arc<dyn LlmProvider>);
            info!("Initialized Groq provider");
        } else {
            warn!("GROQ_API_KEY not set, Groq provider disabled");
        }

        if let Some(base_url) = &config.ollama_base_url {
            let provider = OllamaProvider::new(base_url.clone());
            providers.insert(
                "ollama".to_string(),
                Arc::new(provider) as Arc<dyn LlmProvider>,
            );
            info!("Initialized Ollama provider");
        }

        if providers.is_empty() {
            anyhow::bail!("No completion provider configured");
        }
        if !providers.contains_key(&config.provider) {
            anyhow::bail!("Configured provider '{}' is not available", config.provider);
        }

        Ok(Self {
            providers,
            default_provider: config.provider.clone(),
            model: config.model.clone(),
        })
    }

    /// Build a relay around one explicit provider. Used by tests to install
    /// a scripted model.
    pub fn with_provider(
        name: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let providers = DashMap::new();
        providers.insert(name.clone(), provider);
        Self {
            providers,
            default_provider: name,
            model: model.into(),
        }
    }

    fn provider(&self) -> anyhow::Result<Arc<dyn LlmProvider>> {
        self.providers
            .get(&self.default_provider)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| anyhow::anyhow!("Provider not found: {}", self.default_provider))
    }

    /// Prepend the system instruction to the outgoing transcript.
    fn assemble(system: &str, messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(messages.len() + 1);
        out.push(ChatMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
        out.extend(messages);
        out
    }

    pub async fn complete(
        &self,
        system: &str,
        messages: Vec<ChatMessage>,
    ) -> anyhow::Result<Completion> {
        let provider = self.provider()?;
        provider
            .complete(Self::assemble(system, messages), &self.model)
            .await
    }

    pub async fn stream(
        &self,
        system: &str,
        messages: Vec<ChatMessage>,
    ) -> anyhow::Result<mpsc::Receiver<String>> {
        let provider = self.provider()?;
        provider
            .stream(Self::assemble(system, messages), &self.model)
            .await
    }

    /// Short title for a note; only a snippet of the content is sent.
    pub async fn generate_title(&self, content: &str) -> anyhow::Result<String> {
        let prompt = format!(
            "Generate a title for this content: {}",
            title_snippet(content)
        );
        let completion = self
            .complete(prompts::TITLE, vec![ChatMessage::user(prompt)])
            .await?;
        Ok(completion.content.trim().to_string())
    }

    /// Five Q/A pairs generated from the given notes context.
    pub async fn generate_recall_cards(&self, context: &str) -> anyhow::Result<Vec<RecallCard>> {
        let prompt = format!("Notes context: {}", context);
        let completion = self
            .complete(prompts::RECALL, vec![ChatMessage::user(prompt)])
            .await?;
        parse_recall_cards(&completion.content)
    }
}

/// First [`TITLE_SNIPPET_CHARS`] characters of the content, on character
/// boundaries.
pub fn title_snippet(content: &str) -> String {
    content.chars().take(TITLE_SNIPPET_CHARS).collect()
}

/// Remove markdown code-fence artifacts by literal string removal.
///
/// Idempotent and content-preserving: applying it to already-clean text
/// returns the text unchanged (modulo surrounding whitespace).
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the model's flashcard output, tolerating code fences.
pub fn parse_recall_cards(text: &str) -> anyhow::Result<Vec<RecallCard>> {
    let clean = strip_code_fences(text);
    Ok(serde_json::from_str(&clean)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_stripping_is_idempotent_and_content_preserving() {
        let fenced = "```json\n[{\"q\":\"Q\",\"a\":\"A\"}]\n```";
        let once = strip_code_fences(fenced);
        let twice = strip_code_fences(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "[{\"q\":\"Q\",\"a\":\"A\"}]");
    }

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let plain = "[{\"q\":\"What is 2+2?\",\"a\":\"4\"}]";
        let fenced = format!("```json\n{}\n```", plain);
        assert_eq!(
            parse_recall_cards(plain).unwrap(),
            parse_recall_cards(&fenced).unwrap()
        );
    }

    #[test]
    fn parse_failure_is_an_error() {
        assert!(parse_recall_cards("Sorry, I cannot do that.").is_err());
    }

    #[test]
    fn title_snippet_respects_char_boundaries() {
        let content = "é".repeat(600);
        let snippet = title_snippet(&content);
        assert_eq!(snippet.chars().count(), TITLE_SNIPPET_CHARS);

        let short = "mitosis notes";
        assert_eq!(title_snippet(short), short);
    }
}
