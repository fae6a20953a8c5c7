use std::{
    fmt::{self, Display, Formatter},
    slice,
};
use tracing::debug;

/// A single formatted line in the [`History`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryEntry(String);

impl HistoryEntry {
    pub fn new<S: Into<String>>(text: S) -> Self { HistoryEntry(text.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl Display for HistoryEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<String> for HistoryEntry {
    fn from(text: String) -> Self { HistoryEntry(text) }
}

impl From<&str> for HistoryEntry {
    fn from(text: &str) -> Self { HistoryEntry(text.to_string()) }
}

impl AsRef<str> for HistoryEntry {
    fn as_ref(&self) -> &str { &self.0 }
}

/// The log of everything calculated during a session, oldest first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self { History::default() }

    pub fn append<E: Into<HistoryEntry>>(&mut self, entry: E) {
        let entry = entry.into();
        debug!(entry = entry.as_str(), "Recording history");
        self.entries.push(entry);
    }

    /// Forget everything.
    pub fn reset_all(&mut self) {
        debug!(count = self.entries.len(), "Clearing history");
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] { &self.entries }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> slice::Iter<'_, HistoryEntry> { self.entries.iter() }
}

impl<'a> IntoIterator for &'a History {
    type IntoIter = slice::Iter<'a, HistoryEntry>;
    type Item = &'a HistoryEntry;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_kept_in_order() {
        let mut history = History::new();

        history.append("1 + 1 = 2");
        history.append(String::from("Sine(90) = 1"));
        history.append("1 + 1 = 2");

        let got: Vec<_> = history.iter().map(HistoryEntry::as_str).collect();
        assert_eq!(got, vec!["1 + 1 = 2", "Sine(90) = 1", "1 + 1 = 2"]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn reset_then_append() {
        let mut history = History::new();
        history.append("old");
        history.append("older");

        history.reset_all();
        history.append("e");

        assert_eq!(history.entries(), &[HistoryEntry::new("e")]);
    }

    #[test]
    fn resetting_is_idempotent() {
        let mut history = History::new();

        history.reset_all();
        history.reset_all();

        assert!(history.is_empty());
        assert_eq!(history, History::new());
    }

    #[test]
    fn iterate_by_reference() {
        let mut history = History::new();
        history.append("a");

        let mut seen = Vec::new();
        for entry in &history {
            seen.push(entry.to_string());
        }

        assert_eq!(seen, vec!["a"]);
    }
}
