pub const DEFAULT_HISTORY_LENGTH: usize = 1000;

/// Line-indexed command log. Indices are 1-based.
///
/// The host appends each input line before running it, so during a `run`
/// the last slot holds the in-progress entry.
pub trait History {
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> Option<String>;
    fn replace(&mut self, index: usize, text: &str);
    fn append(&mut self, text: &str);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recent entry at or below `upto` starting with `prefix`.
    fn find_latest(&self, prefix: &str, upto: usize) -> Option<usize> {
        (1..=upto.min(self.len()))
            .rev()
            .find(|&i| self.get(i).is_some_and(|t| t.starts_with(prefix)))
    }
}

#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    max_len: usize,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_HISTORY_LENGTH)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_len: max_len.max(1),
        }
    }

    /// Starts from previously saved entries, oldest first.
    pub fn from_entries<I, S>(entries: I, max_len: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut history = Self::with_max_len(max_len);
        for entry in entries {
            history.append(entry.as_ref());
        }
        history
    }

    fn trim(&mut self) {
        if self.entries.len() > self.max_len {
            let excess = self.entries.len() - self.max_len;
            self.entries.drain(..excess);
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for MemoryHistory {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, index: usize) -> Option<String> {
        index.checked_sub(1).and_then(|i| self.entries.get(i)).cloned()
    }

    fn replace(&mut self, index: usize, text: &str) {
        if let Some(slot) = index.checked_sub(1).and_then(|i| self.entries.get_mut(i)) {
            *slot = text.to_string();
        }
    }

    fn append(&mut self, text: &str) {
        self.entries.push(text.to_string());
        self.trim();
    }
}
