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

use super::{Completion, LlmProvider};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client as OpenAIClient,
};
use serde_json::json;
use std::time::Instant;
use studyhall_core::ChatMessage;
use tokio::sync::mpsc;

// Groq provider (OpenAI-compatible API)
pub struct GroqProvider {
    client: OpenAIClient<OpenAIConfig>,
}

impl GroqProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: OpenAIClient::with_config(config),
        }
    }

    fn convert_messages(messages: Vec<ChatMessage>) -> Vec<ChatCompletionRequestMessage> {
        messages
            .into_iter()
            .filter_map(|msg| match msg.role.as_str() {
                "system" => ChatCompletionRequestSystemMessageArgs::default()
                    .content(msg.content)
                    .build()
                    .ok()
                    .map(ChatCompletionRequestMessage::System),
                "user" => ChatCompletionRequestUserMessageArgs::default()
                    .content(msg.content)
                    .build()
                    .ok()
                    .map(ChatCompletionRequestMessage::User),
                "assistant" => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(msg.content)
                    .build()
                    .ok()
                    .map(ChatCompletionRequestMessage::Assistant),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl LlmProvider for GroqProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
    ) -> anyhow::Result<Completion> {
        let start = Instant::now();

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(Self::convert_messages(messages))
            .build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(Completion {
            content,
            provider: "groq".to_string(),
            model: model.to_string(),
            duration_ms: start.elapsed().as_millis() as u32,
        })
    }

    async fn stream(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
    ) -> anyhow::Result<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(100);

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(Self::convert_messages(messages))
            .build()?;

        let mut stream = self.client.chat().create_stream(request).await?;

        tokio::spawn(async move {
            use futures::StreamExt;
            while let Some(result) = stream.next().await {
                match result {
                    Ok(response) => {
                        if let Some(choice) = response.choices.first() {
                            if let Some(content) = &choice.delta.content {
                                if tx.send(content.clone()).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    // Mid-stream failures end the body early; the client
                    // sees a truncated answer, not an error frame.
                    Err(_) => break,
                }
            }
        });

        Ok(rx)
    }

    fn name(&self) -> &str {
        "Groq"
    }
}

// Ollama provider (local)
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn format_messages(messages: &[ChatMessage]) -> Vec<serde_json::Value> {
        messages
            .iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect()
    }
}

#[async_trait::async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
    ) -> anyhow::Result<Completion> {
        let start = Instant::now();

        let body = json!({
            "model": model,
            "messages": Self::format_messages(&messages),
            "stream": false,
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        let json: serde_json::Value = response.json().await?;

        let content = json["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        Ok(Completion {
            content,
            provider: "ollama".to_string(),
            model: model.to_string(),
            duration_ms: start.elapsed().as_millis() as u32,
        })
    }

    async fn stream(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
    ) -> anyhow::Result<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(100);

        let body = json!({
            "model": model,
            "messages": Self::format_messages(&messages),
            "stream": true,
        });

        let client = self.client.clone();
        let url = format!("{}/api/chat", self.base_url);

        tokio::spawn(async move {
            let response = match client.post(&url).json(&body).send().await {
                Ok(response) => response,
                Err(_) => return,
            };

            use futures::StreamExt;
            let mut stream = response.bytes_stream();
            // Ollama streams newline-delimited JSON; chunks can split lines.
            let mut buffer = String::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(_) => break,
                };
                match std::str::from_utf8(&bytes) {
                    Ok(text) => buffer.push_str(text),
                    Err(_) => break,
                }

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_string();
                    buffer.drain(..=pos);
                    if line.is_empty() {
                        continue;
                    }

                    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&line) {
                        if let Some(delta) = value["message"]["content"].as_str() {
                            if !delta.is_empty() && tx.send(delta.to_string()).await.is_err() {
                                return;
                            }
                        }
                        if value["done"].as_bool() == Some(true) {
                            return;
                        }
                    }
                }
            }
        });

        Ok(rx)
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
