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

//! In-memory chat transcript reducer.
//!
//! Models the browser-side behavior: the user message is appended
//! optimistically before the network call resolves, a placeholder assistant
//! message is appended when the stream opens, and its content is replaced
//! wholesale with the accumulated buffer on every chunk. Nothing here is
//! persisted; a transcript lives and dies with its view.

use serde::Serialize;

use crate::models::ChatMessage;

/// Where the current exchange is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamPhase {
    Idle,
    AwaitingFirstChunk,
    Streaming,
    Complete,
    Errored,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    phase: StreamPhase,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            phase: StreamPhase::Idle,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Optimistic append: the user's message enters the transcript before
    /// the request is sent.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// The request went out: append the empty placeholder the stream will
    /// fill in.
    pub fn begin_stream(&mut self) {
        self.messages.push(ChatMessage::assistant(""));
        self.phase = StreamPhase::AwaitingFirstChunk;
    }

    /// Full-buffer replace: `buffer` is the accumulated text so far, not a
    /// delta.
    pub fn apply_chunk(&mut self, buffer: &str) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == "assistant" {
                last.content.clear();
                last.content.push_str(buffer);
                self.phase = StreamPhase::Streaming;
            }
        }
    }

    /// The stream closed normally. A stream that ends without ever
    /// producing a chunk completes with an empty assistant message, which
    /// is what the browser shows for a truncated-before-start response.
    pub fn complete(&mut self) {
        if matches!(
            self.phase,
            StreamPhase::AwaitingFirstChunk | StreamPhase::Streaming
        ) {
            self.phase = StreamPhase::Complete;
        }
    }

    /// Failure before or during the stream. The transcript is kept as-is:
    /// a partial answer stays visible as a partial answer.
    pub fn fail(&mut self) {
        self.phase = StreamPhase::Errored;
    }

    /// Ready for the next exchange once the previous one settled.
    pub fn reset_phase(&mut self) {
        self.phase = StreamPhase::Idle;
    }
}
