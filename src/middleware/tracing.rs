use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::server::{HttpRequest, HttpResponse};

/// Logs one line when a request starts and one when its response is ready
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HttpRequest) -> Option<HttpResponse> {
        debug!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            route = ?req.route,
            "request started"
        );
        None
    }

    fn after(&self, req: &HttpRequest, res: &mut HttpResponse, latency: Duration) {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            status = res.status,
            latency_ms = latency.as_millis() as u64,
            dumps = req.dumps.len(),
            "request completed"
        );
    }
}
