// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Non-fatal configuration advisories.

use std::sync::Mutex;

/// Receiver of warnings that never fail validation.
pub trait AdvisorySink {
    /// Report a non-fatal condition
    fn warn(&self, message: &str);
}

/// Emits advisories as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAdvisory;

impl AdvisorySink for TracingAdvisory {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "tlsgate::advisory", "{}", message);
    }
}

/// Keeps advisories in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingAdvisory {
    messages: Mutex<Vec<String>>,
}

impl RecordingAdvisory {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the advisories seen so far
    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AdvisorySink for RecordingAdvisory {
    fn warn(&self, message: &str) {
        match self.messages.lock() {
            Ok(mut messages) => messages.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
