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

//! SQLite implementations of the repository traits.
//!
//! Owner scoping is enforced in SQL: child rows are addressed through a
//! subquery on `students.external_id` in the same predicate as the row id,
//! so a mismatch in either is indistinguishable from the row not existing.

mod mastery;
mod notes;
mod students;
mod tools;

pub use mastery::SqliteMasteryRepository;
pub use notes::SqliteNoteRepository;
pub use students::SqliteStudentRepository;
pub use tools::SqliteToolResultRepository;
