//! Thread-local "current request" for the global dump functions.
//!
//! Application code should not have to thread a [`DumpContext`] through every
//! call just to inspect a value. The service enters the request's context on
//! the handling thread for the duration of the handler, and the renderer
//! enters it again while render callbacks run; the free functions
//! here and the [`mdump!`](crate::mdump) / [`mextend!`](crate::mextend) macros
//! append to whatever context is current. Outside a request they do nothing.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use super::callbacks::RenderCallback;
use super::context::{DumpContext, DEFAULT_DUMP_SECTION, DEFAULT_EXTEND_SECTION};
use super::entry::DumpValue;
use crate::trace::CallSite;

thread_local! {
    static CURRENT: RefCell<Vec<DumpContext>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a context current until dropped. Not `Send`: it must be dropped on
/// the thread that entered it.
#[must_use = "the context is only current while the guard is alive"]
pub struct ScopeGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        CURRENT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Make `ctx` the current context on this thread.
///
/// Scopes nest: entering a sub-request's context shadows the outer one until
/// its guard is dropped.
pub fn enter(ctx: &DumpContext) -> ScopeGuard {
    CURRENT.with(|stack| stack.borrow_mut().push(ctx.clone()));
    ScopeGuard {
        _not_send: PhantomData,
    }
}

/// The context current on this thread, if any.
pub fn current() -> Option<DumpContext> {
    CURRENT.with(|stack| stack.borrow().last().cloned())
}

fn with_current(f: impl FnOnce(&DumpContext)) {
    match current() {
        Some(ctx) => f(&ctx),
        None => debug!("dump outside of a request scope ignored"),
    }
}

/// Dump `value` into the secondary section of the current request.
#[track_caller]
pub fn dump<V: DumpValue + 'static>(value: V) {
    let site = CallSite::caller();
    with_current(|ctx| ctx.record(DEFAULT_DUMP_SECTION, None, site, Arc::new(value)));
}

/// Dump `value` into `section` of the current request.
#[track_caller]
pub fn dump_in<V: DumpValue + 'static>(section: &str, value: V) {
    let site = CallSite::caller();
    with_current(|ctx| ctx.record(section, None, site, Arc::new(value)));
}

/// Dump `value` into `section` of the current request under `title`.
#[track_caller]
pub fn dump_titled<V: DumpValue + 'static>(section: &str, title: &str, value: V) {
    let site = CallSite::caller();
    with_current(|ctx| ctx.record(section, Some(title.to_string()), site, Arc::new(value)));
}

/// Register a render callback on the primary section of the current request.
pub fn extend<C: RenderCallback + 'static>(callback: C) {
    extend_in(DEFAULT_EXTEND_SECTION, None, callback);
}

/// Register a render callback on `section`, optionally titled.
pub fn extend_in<C: RenderCallback + 'static>(section: &str, title: Option<&str>, callback: C) {
    with_current(|ctx| ctx.register(section, title.map(str::to_string), Arc::new(callback)));
}

/// Register a titled render callback on `section` of the current request.
pub fn extend_titled<C: RenderCallback + 'static>(section: &str, title: &str, callback: C) {
    extend_in(section, Some(title), callback);
}

#[doc(hidden)]
pub fn __mdump<V: DumpValue + 'static>(
    section: &str,
    title: Option<&str>,
    file: &str,
    line: u32,
    enclosing: &str,
    value: V,
) {
    let site = CallSite::from_wrapper(file, line, enclosing);
    with_current(|ctx| ctx.record(section, title.map(str::to_string), site, Arc::new(value)));
}

/// Dump a value into the current request, labelled with the calling function.
///
/// ```rust,ignore
/// mdump!(user);                          // secondary section
/// mdump!(order, "primary");              // explicit section
/// mdump!(cart, "secondary", "cart");     // explicit section and title
/// ```
#[macro_export]
macro_rules! mdump {
    ($value:expr) => {
        $crate::mdump!($value, $crate::dump::DEFAULT_DUMP_SECTION)
    };
    ($value:expr, $section:expr) => {
        $crate::dump::scope::__mdump(
            $section,
            ::core::option::Option::None,
            ::core::file!(),
            ::core::line!(),
            $crate::__enclosing_function!(),
            $value,
        )
    };
    ($value:expr, $section:expr, $title:expr) => {
        $crate::dump::scope::__mdump(
            $section,
            ::core::option::Option::Some($title),
            ::core::file!(),
            ::core::line!(),
            $crate::__enclosing_function!(),
            $value,
        )
    };
}

/// Register a render callback on the current request.
///
/// ```rust,ignore
/// mextend!(|ctx| format!("<p>{}</p>", ctx.path));                    // primary
/// mextend!("secondary", |ctx| String::from("<hr>"));                  // section
/// mextend!("primary", "Pool", |ctx| pool_status_html(ctx));           // titled
/// ```
#[macro_export]
macro_rules! mextend {
    ($callback:expr) => {
        $crate::dump::scope::extend_in(
            $crate::dump::DEFAULT_EXTEND_SECTION,
            ::core::option::Option::None,
            $callback,
        )
    };
    ($section:expr, $callback:expr) => {
        $crate::dump::scope::extend_in($section, ::core::option::Option::None, $callback)
    };
    ($section:expr, $title:expr, $callback:expr) => {
        $crate::dump::scope::extend_in($section, ::core::option::Option::Some($title), $callback)
    };
}
