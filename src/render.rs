//! # Renderer
//!
//! Builds the sections fragment of the panel from a request's [`DumpContext`].
//!
//! ## Pipeline
//!
//! 1. Count the entries dumped so far (baseline).
//! 2. Let the host's [`DefaultItems`] add standard diagnostics to the primary section.
//! 3. Count what step 2 added.
//! 4. Run every section's render callbacks once, in registration order, and
//!    keep their HTML. The request's context is current while they run, so
//!    callbacks may dump more values through [`AppContext::dump`] or the global
//!    functions; those are picked up by the final pass below and never
//!    rendered twice.
//! 5. The trigger badge counts the entries dumped by callbacks: total minus
//!    (baseline + defaults).
//! 6. Emit one column per section: header, cached callback blocks, then one
//!    block per entry (custom title, or `file:line` plus `Module::function`).
//!
//! A value that fails to serialize, or a serializer that panics, turns into a
//! placeholder for that entry only. A panicking callback is skipped.
//!
//! [`DumpContext`]: crate::dump::DumpContext

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use askama::Template;
use tracing::{debug, warn};

use crate::dump::{scope, AppContext, DumpEntry, DumpValue, RenderCallback};
use crate::error::Result;
use crate::serializer::{JsonSerializer, ValueSerializer};
use crate::trace::{RustPathNames, TypeNames};

/// Host-provided standard diagnostics (session, request parameters, cookies,
/// current user) dumped into the panel right before rendering.
pub trait DefaultItems {
    fn collect(&self, ctx: &AppContext);
}

/// Output of one render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPanel {
    /// Concatenated section columns
    pub sections_html: String,
    /// Entries dumped by render callbacks, shown on the trigger button
    pub badge: usize,
    /// Environment label shown on the trigger button
    pub environment: String,
    /// Total entries rendered
    pub entry_count: usize,
}

/// A callback's cached output.
#[derive(Debug, Clone)]
struct CallbackBlock {
    title: Option<String>,
    html: String,
}

#[derive(Debug)]
struct ItemView {
    title: Option<String>,
    location: Option<String>,
    trace_class: Option<String>,
    trace_function: Option<String>,
    type_name: String,
    body: String,
    failed: bool,
}

#[derive(Debug)]
struct SectionView {
    header: String,
    callbacks: Vec<CallbackBlock>,
    items: Vec<ItemView>,
}

#[derive(Template)]
#[template(path = "sections.html")]
struct SectionsTemplate<'a> {
    prefix: &'a str,
    sections: Vec<SectionView>,
}

/// Renders a request's dumps into HTML
#[derive(Clone)]
pub struct Renderer {
    serializer: Arc<dyn ValueSerializer>,
    names: Arc<dyn TypeNames>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Arc::new(JsonSerializer), Arc::new(RustPathNames))
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(serializer: Arc<dyn ValueSerializer>, names: Arc<dyn TypeNames>) -> Self {
        Self { serializer, names }
    }

    /// Render the sections of `app`'s dump context, namespacing CSS classes with `prefix`.
    pub fn render(
        &self,
        app: &AppContext,
        defaults: Option<&dyn DefaultItems>,
        prefix: &str,
    ) -> Result<RenderedPanel> {
        let dumps = app.dumps();
        let baseline = dumps.len();
        if let Some(defaults) = defaults {
            defaults.collect(app);
        }
        let added_by_defaults = dumps.len().saturating_sub(baseline);

        let callbacks = dumps.callbacks();
        let section_names: Vec<String> = dumps
            .values()
            .section_names()
            .map(str::to_string)
            .collect();

        // The global dump functions inside callbacks append to this request.
        let guard = scope::enter(dumps);
        let mut cached: Vec<(String, Vec<CallbackBlock>)> = Vec::new();
        for section in &section_names {
            let mut blocks = Vec::new();
            for entry in callbacks.section(section) {
                let callback = Arc::clone(&entry.callback);
                match catch_unwind(AssertUnwindSafe(|| callback.render(app))) {
                    Ok(html) => blocks.push(CallbackBlock {
                        title: entry.title.clone(),
                        html,
                    }),
                    Err(_) => warn!(
                        section = %section,
                        title = ?entry.title,
                        "render callback panicked; skipped"
                    ),
                }
            }
            if !blocks.is_empty() {
                cached.push((section.clone(), blocks));
            }
        }
        drop(guard);

        let values = dumps.values();
        let badge = values.len().saturating_sub(baseline + added_by_defaults);

        let sections: Vec<SectionView> = values
            .get_all()
            .iter()
            .map(|(name, entries)| SectionView {
                header: name.to_uppercase(),
                callbacks: cached
                    .iter()
                    .find(|(section, _)| section == name)
                    .map(|(_, blocks)| blocks.clone())
                    .unwrap_or_default(),
                items: entries.iter().map(|entry| self.item_view(entry)).collect(),
            })
            .collect();

        let template = SectionsTemplate { prefix, sections };
        let sections_html = template.render()?;

        debug!(
            sections = template.sections.len(),
            entries = values.len(),
            badge,
            "dump panel rendered"
        );

        Ok(RenderedPanel {
            sections_html,
            badge,
            environment: app.environment.clone(),
            entry_count: values.len(),
        })
    }

    fn item_view(&self, entry: &DumpEntry) -> ItemView {
        let value = entry.value();
        let type_name = self.names.short_name(value.type_name());
        let serializer = Arc::clone(&self.serializer);
        let (body, failed) = match catch_unwind(AssertUnwindSafe(|| serializer.serialize(value))) {
            Ok(Ok(text)) => (text, false),
            Ok(Err(err)) => {
                warn!(error = %err, "dumped value could not be serialized");
                (format!("[unable to dump {}: {}]", type_name, err), true)
            }
            Err(_) => {
                warn!(value_type = %type_name, "serializer panicked");
                (format!("[unable to dump {}: serializer panicked]", type_name), true)
            }
        };

        if let Some(title) = entry.title() {
            return ItemView {
                title: Some(title.to_string()),
                location: None,
                trace_class: None,
                trace_function: None,
                type_name,
                body,
                failed,
            };
        }

        let location = match (entry.source_file(), entry.source_line()) {
            (Some(file), Some(line)) => Some(format!("{}:{}", basename(file), line)),
            _ => None,
        };
        ItemView {
            title: None,
            location,
            trace_class: entry
                .caller_class()
                .filter(|c| !c.is_empty())
                .map(|c| self.names.short_name(c)),
            trace_function: entry
                .caller_function()
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            type_name,
            body,
            failed,
        }
    }
}

fn basename(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}
