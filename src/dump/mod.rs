//! # Dump registry
//!
//! Request-scoped storage for dumped values and render callbacks.
//!
//! - [`ValueRegistry`] - values grouped by section, first-use order
//! - [`CallbackRegistry`] - deferred render callbacks per section
//! - [`DumpContext`] - owns both registries for one request
//! - [`scope`] - thread-local current context behind the global [`dump`] functions
//!
//! ```rust
//! use multidump::dump::{self, DumpContext};
//!
//! let ctx = DumpContext::new();
//! {
//!     let _guard = dump::scope::enter(&ctx);
//!     dump::dump(vec![1, 2, 3]);
//!     dump::dump_titled("primary", "answer", 42);
//! }
//! assert_eq!(ctx.len(), 2);
//! ```

mod callbacks;
mod context;
mod entry;
mod registry;
pub mod scope;

pub use callbacks::{CallbackEntry, CallbackRegistry, RenderCallback};
pub use context::{AppContext, DumpContext, DEFAULT_DUMP_SECTION, DEFAULT_EXTEND_SECTION};
pub use entry::{Debugged, DumpEntry, DumpValue};
pub use registry::{ValueRegistry, PRIMARY_SECTION, SECONDARY_SECTION};
pub use scope::{dump, dump_in, dump_titled, extend, extend_in, extend_titled};
