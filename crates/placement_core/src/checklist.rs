//! crates/placement_core/src/checklist.rs
//!
//! User-editable study checklist. Lives only in the user's dashboard state.

use serde::Serialize;

use crate::error::{require, GuidanceError, GuidanceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistEntry {
    pub id: u64,
    pub text: String,
    pub done: bool,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Checklist {
    entries: Vec<ChecklistEntry>,
    next_id: u64,
}

impl Checklist {
    /// Adds an entry. `key_points` is a comma-separated list.
    pub fn add(&mut self, text: &str, key_points: &str) -> GuidanceResult<&ChecklistEntry> {
        require(text, "Task text")?;
        self.next_id += 1;
        self.entries.push(ChecklistEntry {
            id: self.next_id,
            text: text.trim().to_string(),
            done: false,
            key_points: split_key_points(key_points),
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Flips the done flag and returns the new value.
    pub fn toggle(&mut self, id: u64) -> GuidanceResult<bool> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| unknown_entry(id))?;
        entry.done = !entry.done;
        Ok(entry.done)
    }

    pub fn remove(&mut self, id: u64) -> GuidanceResult<ChecklistEntry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| unknown_entry(id))?;
        Ok(self.entries.remove(pos))
    }

    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.entries
    }
}

fn unknown_entry(id: u64) -> GuidanceError {
    GuidanceError::Validation(format!("No checklist entry with id {}", id))
}

fn split_key_points(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}
