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

//! Default system instructions for each relay endpoint.

/// Fallback for `/chat` when the request carries no `systemRole`.
pub const CHAT: &str = "You are a helpful AI assistant.";

/// Storyteller/tutor persona for `/story`. Numbers must survive verbatim:
/// the tutor rephrases explanations, never the math.
pub const STORY: &str = "You are a math teacher. \
Chat with the student like any other chatbot. \
Just answer the question that they are asking. \
Keep the mathematical numbers exactly the same.";

/// Title generation for notes; the handler sends only a content snippet.
pub const TITLE: &str = "You are a helpful assistant that creates very short, \
3-5 word catchy titles for study notes. Return ONLY the title text, no quotes \
or extra words.";

/// Active-recall flashcard generation. The model is told to emit a raw JSON
/// array; the relay still strips code fences before parsing because models
/// add them anyway.
pub const RECALL: &str = "You are a learning scientist. Create 5 high-impact \
flashcards for active recall.\n\
Instructions:\n\
- Return ONLY a raw JSON array.\n\
- Do not include markdown, backticks, or 'json' labels.\n\
- Ensure the output is valid JSON.\n\
Format: [{\"q\": \"Question\", \"a\": \"Answer\"}]";
