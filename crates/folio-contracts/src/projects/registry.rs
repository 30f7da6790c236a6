use std::fmt;

use indexmap::IndexMap;

/// Ordered, immutable mapping from display name to routine.
///
/// Insertion order is presentation order. Building from an iterator that
/// repeats a name keeps the first position and the last routine.
#[derive(Clone)]
pub struct ProjectRegistry<R> {
    entries: IndexMap<String, R>,
}

impl<R> ProjectRegistry<R> {
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&R> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Name at a 0-based menu position.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.entries
            .get_index(index)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R, S: Into<String>> FromIterator<(S, R)> for ProjectRegistry<R> {
    fn from_iter<I: IntoIterator<Item = (S, R)>>(iter: I) -> Self {
        let mut entries = IndexMap::new();
        for (name, routine) in iter {
            entries.insert(name.into(), routine);
        }
        Self { entries }
    }
}

impl<R> fmt::Debug for ProjectRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectRegistry")
            .field("names", &self.names().collect::<Vec<&str>>())
            .finish()
    }
}
