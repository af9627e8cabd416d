use indexmap::IndexMap;

use super::entry::DumpEntry;

/// Section that is always created first, so it renders as the leftmost column.
pub const PRIMARY_SECTION: &str = "primary";

/// Default section for plain dumps.
pub const SECONDARY_SECTION: &str = "secondary";

/// Dumped values grouped by section
///
/// Sections keep first-use order and entries keep call order. The registry is
/// append-only between resets.
#[derive(Debug, Default, Clone)]
pub struct ValueRegistry {
    sections: IndexMap<String, Vec<DumpEntry>>,
}

impl ValueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to `section`, creating the section on first use.
    ///
    /// The primary section is seeded ahead of any other on the first append.
    pub fn push(&mut self, section: &str, entry: DumpEntry) {
        self.open_section(section).push(entry);
    }

    /// Create `section` (after seeding the primary section) without adding
    /// entries. Existing sections keep their position.
    pub fn open_section(&mut self, section: &str) -> &mut Vec<DumpEntry> {
        if !self.sections.contains_key(PRIMARY_SECTION) {
            self.sections.insert(PRIMARY_SECTION.to_string(), Vec::new());
        }
        self.sections.entry(section.to_string()).or_default()
    }

    /// All sections in render order.
    pub fn get_all(&self) -> &IndexMap<String, Vec<DumpEntry>> {
        &self.sections
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &[DumpEntry])> {
        self.sections
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    pub fn section(&self, name: &str) -> Option<&[DumpEntry]> {
        self.sections.get(name).map(Vec::as_slice)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Total number of entries across all sections.
    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every section. Only call between requests.
    pub fn reset(&mut self) {
        self.sections.clear();
    }
}
