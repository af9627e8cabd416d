mod core;
mod multidump;
mod tracing;

pub use core::Middleware;
pub use multidump::MultiDumpMiddleware;
pub use tracing::TracingMiddleware;
