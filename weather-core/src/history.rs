use serde::{Deserialize, Serialize};

/// Maximum number of remembered searches.
pub const HISTORY_LIMIT: usize = 5;

/// Recently searched city names, most recent first.
///
/// Names are unique under case-insensitive comparison and keep the casing
/// of the latest query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new history with `city` moved (or added) to the front.
    pub fn record(&self, city: &str) -> SearchHistory {
        let entries = std::iter::once(city.to_string())
            .chain(
                self.entries
                    .iter()
                    .filter(|existing| !same_city(existing, city))
                    .cloned(),
            )
            .take(HISTORY_LIMIT)
            .collect();

        SearchHistory { entries }
    }

    /// In-place variant of [`SearchHistory::record`].
    pub fn push(&mut self, city: &str) {
        *self = self.record(city);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn same_city(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
