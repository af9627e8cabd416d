//! # multidump
//!
//! **multidump** is a development-time debug overlay. Application code dumps
//! values during a request; when the response is about to leave, the dumps are
//! rendered into a floating HTML panel and spliced into the page.
//!
//! ## Overview
//!
//! Every request owns a [`dump::DumpContext`]. While a handler runs, that
//! context is the current scope, so the global [`dump::dump`] functions and the
//! [`mdump!`] macro record into it from anywhere on the handler's thread. Values
//! are grouped into named sections (`primary`, `secondary`, or any other name);
//! sections are rendered as columns in first-use order.
//!
//! Render callbacks ([`dump::extend`], [`mextend!`]) contribute HTML blocks at
//! render time and may dump further values themselves; the trigger badge counts
//! those late dumps.
//!
//! ## Architecture
//!
//! - **[`dump`]** - value and callback registries, request scope, global dump API
//! - **[`trace`]** - call-site capture and resolution
//! - **[`serializer`]** - value-to-text conversion
//! - **[`render`]** - sections fragment rendering (askama)
//! - **[`inject`]** - panel shell and body splicing
//! - **[`middleware`]** - lifecycle hook and request logging
//! - **[`server`]** - request/response types, route table, tiny_http adapter
//! - **[`config`]** - YAML configuration with environment overrides
//! - **[`logging`]** - tracing subscriber setup
//!
//! ## Request Flow
//!
//! ```text
//! HttpServer -> DebugService::handle
//!     -> Middleware::before (each)
//!     -> handler (request scope entered; dump!/mdump!/extend record here)
//!     -> Middleware::after (each)
//!          MultiDumpMiddleware: gate -> Renderer::render -> inject -> body replaced
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use multidump::config::MultiDumpConfig;
//! use multidump::middleware::MultiDumpMiddleware;
//! use multidump::server::{DebugService, HttpRequest, HttpResponse};
//!
//! let mut service = DebugService::new();
//! service.route(Method::GET, "/", "home", |_req| {
//!     multidump::mdump!(vec![1, 2, 3]);
//!     HttpResponse::html("<html><body><h1>Home</h1></body></html>")
//! });
//! let hook = MultiDumpMiddleware::new(MultiDumpConfig::default(), "dev").unwrap();
//! service.add_middleware(Arc::new(hook));
//!
//! let res = service.handle(HttpRequest::new(Method::GET, "/"));
//! assert!(res.body.contains("[dev] multi-dump"));
//! assert!(res.body.ends_with("</body></html>"));
//! ```

pub mod config;
pub mod dump;
pub mod error;
pub mod ids;
pub mod inject;
pub mod logging;
pub mod middleware;
pub mod render;
pub mod serializer;
pub mod server;
pub mod trace;

pub use config::MultiDumpConfig;
pub use dump::{
    dump, dump_in, dump_titled, extend, extend_in, extend_titled, AppContext, Debugged,
    DumpContext, PRIMARY_SECTION, SECONDARY_SECTION,
};
pub use error::{MultiDumpError, Result};
pub use inject::inject;
pub use middleware::{Middleware, MultiDumpMiddleware, TracingMiddleware};
pub use render::{DefaultItems, RenderedPanel, Renderer};
pub use serializer::{JsonSerializer, ValueSerializer};
