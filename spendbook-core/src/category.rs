//! Registry of known category labels.
//!
//! The registry starts from a fixed default set and grows when the user enters a
//! custom label. It lives as long as the session that owns it and is never written
//! to disk.

use std::collections::BTreeSet;

/// Selecting this label asks the user for a custom one.
pub const OTHER_CATEGORY: &str = "other";

pub const DEFAULT_CATEGORIES: [&str; 4] = ["food", "transport", "shopping", OTHER_CATEGORY];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    labels: BTreeSet<String>,
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            labels: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl CategorySet {
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label.trim())
    }

    /// Labels in sorted order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Registry with `label` added. Blank labels leave it unchanged.
    #[must_use]
    pub fn with(mut self, label: &str) -> Self {
        let label = label.trim();
        if !label.is_empty() {
            self.labels.insert(label.to_string());
        }
        self
    }

    /// 1-based lookup used by numbered menus.
    pub fn nth(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.labels.iter().nth(i))
            .map(String::as_str)
    }
}
