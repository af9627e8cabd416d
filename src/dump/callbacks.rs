use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::dump::AppContext;

/// Deferred, render-time contribution to a section
///
/// Runs once while the panel is rendered and returns an HTML fragment that is
/// inserted verbatim above the section's dumped values. It may dump further
/// values through [`AppContext::dump`]; those land in the same panel.
pub trait RenderCallback: Send + Sync {
    fn render(&self, ctx: &AppContext) -> String;
}

impl<F> RenderCallback for F
where
    F: Fn(&AppContext) -> String + Send + Sync,
{
    fn render(&self, ctx: &AppContext) -> String {
        self(ctx)
    }
}

/// A registered callback and its optional subheader.
#[derive(Clone)]
pub struct CallbackEntry {
    pub callback: Arc<dyn RenderCallback>,
    pub title: Option<String>,
}

impl fmt::Debug for CallbackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackEntry")
            .field("callback", &"<callback>")
            .field("title", &self.title)
            .finish()
    }
}

/// Render callbacks grouped by section, in registration order
#[derive(Debug, Default, Clone)]
pub struct CallbackRegistry {
    sections: IndexMap<String, Vec<CallbackEntry>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: &str, entry: CallbackEntry) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .push(entry);
    }

    pub fn section(&self, name: &str) -> &[CallbackEntry] {
        self.sections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&mut self) {
        self.sections.clear();
    }
}
