use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use http::Method;
use tracing::debug;

use super::callbacks::{CallbackEntry, CallbackRegistry, RenderCallback};
use super::entry::{DumpEntry, DumpValue};
use super::registry::{ValueRegistry, PRIMARY_SECTION, SECONDARY_SECTION};
use crate::ids::RequestId;
use crate::trace::CallSite;

/// Request-scoped dump state
///
/// Owns the value and callback registries for exactly one request. Cloning is
/// cheap and yields a handle to the same state, so the context can travel
/// with the request into handler threads. A fresh context is created per
/// request; nothing is shared between requests.
#[derive(Clone, Default)]
pub struct DumpContext {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    values: Mutex<ValueRegistry>,
    callbacks: Mutex<CallbackRegistry>,
}

impl DumpContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump `value` into the secondary section.
    #[track_caller]
    pub fn dump<V: DumpValue + 'static>(&self, value: V) {
        self.record(SECONDARY_SECTION, None, CallSite::caller(), Arc::new(value));
    }

    /// Dump `value` into `section`.
    #[track_caller]
    pub fn dump_in<V: DumpValue + 'static>(&self, section: &str, value: V) {
        self.record(section, None, CallSite::caller(), Arc::new(value));
    }

    /// Dump `value` into `section` under a custom title.
    #[track_caller]
    pub fn dump_titled<V: DumpValue + 'static>(&self, section: &str, title: &str, value: V) {
        self.record(
            section,
            Some(title.to_string()),
            CallSite::caller(),
            Arc::new(value),
        );
    }

    /// Append a fully labelled entry.
    pub fn record(
        &self,
        section: &str,
        title: Option<String>,
        call_site: CallSite,
        value: Arc<dyn DumpValue>,
    ) {
        debug!(
            section = %section,
            value_type = value.type_name(),
            file = ?call_site.file,
            line = ?call_site.line,
            "value dumped"
        );
        self.lock_values()
            .push(section, DumpEntry::new(value, title, call_site));
    }

    /// Register a render-time callback for `section`.
    pub fn extend<C: RenderCallback + 'static>(&self, section: &str, callback: C) {
        self.register(section, None, Arc::new(callback));
    }

    /// Register a render-time callback for `section` with a subheader.
    pub fn extend_titled<C: RenderCallback + 'static>(
        &self,
        section: &str,
        title: &str,
        callback: C,
    ) {
        self.register(section, Some(title.to_string()), Arc::new(callback));
    }

    /// Register a callback; the section is created so callback-only
    /// sections still render.
    pub fn register(&self, section: &str, title: Option<String>, callback: Arc<dyn RenderCallback>) {
        self.lock_values().open_section(section);
        self.lock_callbacks()
            .push(section, CallbackEntry { callback, title });
    }

    /// Snapshot of the value registry.
    pub fn values(&self) -> ValueRegistry {
        self.lock_values().clone()
    }

    /// Snapshot of the callback registry.
    pub fn callbacks(&self) -> CallbackRegistry {
        self.lock_callbacks().clone()
    }

    /// Total dumped entries so far.
    pub fn len(&self) -> usize {
        self.lock_values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear both registries.
    pub fn reset(&self) {
        self.lock_values().reset();
        self.lock_callbacks().reset();
    }

    // A panic while a guard is held can only come from our own push/clear,
    // which leave the registry consistent, so poisoning is ignored.
    fn lock_values(&self) -> MutexGuard<'_, ValueRegistry> {
        self.inner
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_callbacks(&self) -> MutexGuard<'_, CallbackRegistry> {
        self.inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for DumpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DumpContext")
            .field("entries", &self.len())
            .field("callbacks", &self.lock_callbacks().len())
            .finish()
    }
}

/// What render callbacks are allowed to see of the host application
///
/// A narrow, read-only description of the current request plus a handle for
/// dumping more values while rendering.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub environment: String,
    pub route: Option<String>,
    pub method: Method,
    pub path: String,
    pub sub_request: bool,
    pub request_id: RequestId,
    dumps: DumpContext,
}

impl AppContext {
    pub fn new(environment: impl Into<String>, dumps: DumpContext) -> Self {
        Self {
            environment: environment.into(),
            route: None,
            method: Method::GET,
            path: "/".to_string(),
            sub_request: false,
            request_id: RequestId::new(),
            dumps,
        }
    }

    pub fn with_route(mut self, route: Option<String>) -> Self {
        self.route = route;
        self
    }

    pub fn with_request(mut self, method: Method, path: impl Into<String>) -> Self {
        self.method = method;
        self.path = path.into();
        self
    }

    pub fn with_sub_request(mut self, sub_request: bool) -> Self {
        self.sub_request = sub_request;
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// The request's dump state.
    pub fn dumps(&self) -> &DumpContext {
        &self.dumps
    }

    /// Dump into `section` from inside a render callback.
    #[track_caller]
    pub fn dump<V: DumpValue + 'static>(&self, section: &str, value: V) {
        self.dumps
            .record(section, None, CallSite::caller(), Arc::new(value));
    }
}

/// Default section used by `extend` when none is given.
pub const DEFAULT_EXTEND_SECTION: &str = PRIMARY_SECTION;

/// Default section used by `dump` when none is given.
pub const DEFAULT_DUMP_SECTION: &str = SECONDARY_SECTION;
