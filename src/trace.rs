//! # Trace Resolver
//!
//! Attaches "who dumped this, from where" labels to dump entries.
//!
//! Rust has no stable way to walk a live call stack by index, so call-site
//! metadata is captured explicitly at the call boundary: the `#[track_caller]`
//! dump functions contribute the caller's file and line, and the [`mdump!`]
//! macro additionally contributes the enclosing function path. Both produce a
//! short list of [`Frame`]s, innermost first, which [`resolve`] reduces to a
//! [`CallSite`].
//!
//! ## Fixed-offset resolution
//!
//! Frame 0 is always the registry call itself. When frame 1 belongs to the
//! convenience wrapper ([`WRAPPER_FUNCTION`]), exactly one frame is skipped.
//! The frame at the resulting index supplies file and line; the next outer
//! frame supplies the caller's class (module path) and function. This is a
//! fixed offset, not a search: frames shaped differently from this are
//! mislabelled rather than hunted for.
//!
//! [`mdump!`]: crate::mdump

use std::panic::Location;

/// Name under which the convenience wrapper reports itself in a frame list.
pub const WRAPPER_FUNCTION: &str = "mdump";

/// Name of the innermost frame recorded by every dump call.
pub const DUMP_FUNCTION: &str = "dump";

/// One level of captured call-site metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Source file of the call made from this frame
    pub file: Option<String>,
    /// Line of the call made from this frame
    pub line: Option<u32>,
    /// Owning module or type path, when known
    pub class: Option<String>,
    /// Function executing in this frame
    pub function: Option<String>,
}

impl Frame {
    /// Frame for a call made at `file:line` into `function`.
    pub fn call(file: &str, line: u32, function: &str) -> Self {
        Self {
            file: Some(file.to_string()),
            line: Some(line),
            class: None,
            function: Some(function.to_string()),
        }
    }

    /// Frame for the function enclosing a call, from its full Rust path.
    ///
    /// `my_app::controllers::index` becomes class `my_app::controllers` and
    /// function `index`. Closure markers are dropped so dumps inside closures
    /// are attributed to the surrounding function.
    pub fn enclosing(function_path: &str) -> Self {
        let (class, function) = split_function_path(function_path);
        Self {
            file: None,
            line: None,
            class,
            function,
        }
    }
}

/// Resolved labels for one dump entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub class: Option<String>,
    pub function: Option<String>,
}

impl CallSite {
    /// Capture the caller of a `#[track_caller]` dump function.
    ///
    /// Only file and line are known this way; caller labels stay empty.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        resolve(
            &[Frame::call(location.file(), location.line(), DUMP_FUNCTION)],
            WRAPPER_FUNCTION,
        )
    }

    /// Capture a call made through the [`mdump!`](crate::mdump) wrapper at
    /// `file:line`, inside `enclosing_function`.
    pub fn from_wrapper(file: &str, line: u32, enclosing_function: &str) -> Self {
        let frames = [
            Frame::call(file!(), line!(), DUMP_FUNCTION),
            Frame::call(file, line, WRAPPER_FUNCTION),
            Frame::enclosing(enclosing_function),
        ];
        resolve(&frames, WRAPPER_FUNCTION)
    }
}

/// Reduce an innermost-first frame list to a [`CallSite`].
///
/// Missing frames leave the corresponding labels empty; this never fails.
pub fn resolve(frames: &[Frame], wrapper: &str) -> CallSite {
    let mut index = 0;
    if frames.get(1).and_then(|f| f.function.as_deref()) == Some(wrapper) {
        index += 1;
    }

    let mut site = CallSite::default();
    if let Some(frame) = frames.get(index) {
        site.file = frame.file.clone();
        site.line = frame.line;
    }
    if let Some(frame) = frames.get(index + 1) {
        site.class = frame.class.clone();
        site.function = frame.function.clone();
    }
    site
}

/// Split `a::b::func` into (`Some("a::b")`, `Some("func")`).
pub fn split_function_path(path: &str) -> (Option<String>, Option<String>) {
    let mut path = path;
    while let Some(stripped) = path.strip_suffix("::{{closure}}") {
        path = stripped;
    }
    if path.is_empty() {
        return (None, None);
    }
    match path.rsplit_once("::") {
        Some((class, function)) => (Some(class.to_string()), Some(function.to_string())),
        None => (None, Some(path.to_string())),
    }
}

/// Turns fully qualified Rust paths into display names
///
/// The renderer depends on this rather than on any particular path format so
/// hosts can plug in their own naming (e.g. mapping modules to controllers).
pub trait TypeNames: Send + Sync {
    /// Short name of a module or type path, e.g. `ExampleController` for
    /// `app::controllers::ExampleController`.
    fn short_name(&self, path: &str) -> String;
}

/// Default [`TypeNames`]: keeps the last `::` segment of every path component,
/// including those nested in generic arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustPathNames;

impl TypeNames for RustPathNames {
    fn short_name(&self, path: &str) -> String {
        let mut out = String::with_capacity(path.len());
        let mut token = String::new();
        for c in path.chars() {
            if c.is_alphanumeric() || c == '_' || c == ':' {
                token.push(c);
            } else {
                push_last_segment(&mut out, &token);
                token.clear();
                out.push(c);
            }
        }
        push_last_segment(&mut out, &token);
        out
    }
}

fn push_last_segment(out: &mut String, token: &str) {
    out.push_str(token.rsplit("::").next().unwrap_or(token));
}

/// Full path of the function this macro is expanded in.
#[doc(hidden)]
#[macro_export]
macro_rules! __enclosing_function {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}
