use std::collections::VecDeque;

/// The last few click labels, oldest first
#[derive(Debug, Clone)]
pub struct ClickPath {
    entries: VecDeque<String>,
    limit: usize,
}

impl ClickPath {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// Append a label, evicting the oldest past the limit. Empty labels are ignored.
    pub fn record(&mut self, label: &str) {
        if label.is_empty() {
            return;
        }
        self.entries.push_back(label.to_string());
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Labels joined with `" > "`
    pub fn joined(&self) -> String {
        self.entries.iter().map(String::as_str).collect::<Vec<_>>().join(" > ")
    }
}
