use std::time::Duration;

use crate::server::{HttpRequest, HttpResponse};

/// Hook run around every request handled by [`DebugService`](crate::server::DebugService).
///
/// `before` may short-circuit with its own response. `after` runs for every
/// request, in registration order, and may rewrite the response.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HttpRequest) -> Option<HttpResponse> {
        None
    }
    fn after(&self, _req: &HttpRequest, _res: &mut HttpResponse, _latency: Duration) {}
}
