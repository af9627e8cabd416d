use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use serde_json::json;
use tracing::{debug, error, info};

use super::request::HttpRequest;
use super::response::HttpResponse;
use crate::dump::scope;
use crate::middleware::Middleware;

/// Request handler registered on a [`DebugService`] route
pub type HandlerFn = Arc<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

#[derive(Clone)]
struct RouteEntry {
    name: String,
    handler: HandlerFn,
}

/// Route table plus middleware chain
///
/// Each request gets its own dump context; while the handler runs that
/// context is the current scope, so the global `dump` functions and the
/// `mdump!` macro reach it. Middleware `after` hooks run once the handler
/// returned, in registration order.
#[derive(Clone)]
pub struct DebugService {
    routes: HashMap<(Method, String), RouteEntry>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Default for DebugService {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugService {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            middlewares: Vec::new(),
        }
    }

    /// Register `handler` for `method` + `path` under the route `name`.
    pub fn route<F>(&mut self, method: Method, path: &str, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.routes.insert(
            (method, path.to_string()),
            RouteEntry {
                name: name.to_string(),
                handler: Arc::new(handler),
            },
        );
        self
    }

    /// Add middleware to the processing pipeline
    ///
    /// Middleware is executed in the order it's added.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) -> &mut Self {
        self.middlewares.push(mw);
        self
    }

    /// Run `req` through the middleware chain and its handler.
    pub fn handle(&self, mut req: HttpRequest) -> HttpResponse {
        let entry = self.routes.get(&(req.method.clone(), req.path.clone())).cloned();
        if let Some(entry) = &entry {
            req.route = Some(entry.name.clone());
        }

        let mut early_resp: Option<HttpResponse> = None;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            if early_resp.is_none() {
                early_resp = mw.before(&req);
                if early_resp.is_some() {
                    debug!(
                        request_id = %req.request_id,
                        middleware_idx = idx,
                        middleware_name = std::any::type_name_of_val(mw.as_ref()),
                        "Middleware returned early response"
                    );
                }
            } else {
                mw.before(&req);
            }
        }

        let (mut resp, latency) = match early_resp {
            Some(r) => (r, Duration::from_millis(0)),
            None => {
                let start = Instant::now();
                let resp = match &entry {
                    Some(entry) => self.invoke(entry, &req),
                    None => HttpResponse::json(
                        404,
                        &json!({"error": "Not Found", "method": req.method.as_str(), "path": req.path}),
                    ),
                };
                (resp, start.elapsed())
            }
        };

        for mw in &self.middlewares {
            mw.after(&req, &mut resp, latency);
        }
        resp
    }

    /// Handle a sub-request of `parent` for `path`. The sub-request shares the
    /// parent's dump context and skips panel injection.
    pub fn forward(&self, parent: &HttpRequest, method: Method, path: &str) -> HttpResponse {
        self.handle(parent.sub_request(method, path))
    }

    fn invoke(&self, entry: &RouteEntry, req: &HttpRequest) -> HttpResponse {
        let _scope = scope::enter(&req.dumps);
        info!(
            request_id = %req.request_id,
            route = %entry.name,
            method = %req.method,
            path = %req.path,
            sub_request = req.sub_request,
            "Request dispatched to handler"
        );
        match catch_unwind(AssertUnwindSafe(|| (entry.handler)(req))) {
            Ok(resp) => resp,
            Err(panic) => {
                let panic_message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(
                    request_id = %req.request_id,
                    route = %entry.name,
                    panic_message = %panic_message,
                    "Handler panicked"
                );
                HttpResponse::text(500, format!("Handler panicked: {panic_message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump;

    #[test]
    fn test_unknown_route_is_404() {
        let service = DebugService::new();
        let res = service.handle(HttpRequest::new(Method::GET, "/missing"));
        assert_eq!(res.status, 404);
    }

    #[test]
    fn test_handler_dumps_reach_request_context() {
        let mut service = DebugService::new();
        service.route(Method::GET, "/", "home", |_req| {
            dump::dump("from handler");
            HttpResponse::html("<body></body>")
        });
        let req = HttpRequest::new(Method::GET, "/");
        let dumps = req.dumps.clone();
        let res = service.handle(req);
        assert_eq!(res.status, 200);
        assert_eq!(dumps.len(), 1);
        assert!(dump::scope::current().is_none());
    }

    #[test]
    fn test_panicking_handler_is_500() {
        let mut service = DebugService::new();
        service.route(Method::GET, "/boom", "boom", |_req| panic!("kaboom"));
        let res = service.handle(HttpRequest::new(Method::GET, "/boom"));
        assert_eq!(res.status, 500);
        assert!(res.body.contains("kaboom"));
    }

    struct Deny;

    impl Middleware for Deny {
        fn before(&self, _req: &HttpRequest) -> Option<HttpResponse> {
            Some(HttpResponse::text(403, "no"))
        }
    }

    #[test]
    fn test_before_short_circuits() {
        let mut service = DebugService::new();
        service
            .route(Method::GET, "/", "home", |_req| HttpResponse::html("yes"))
            .add_middleware(Arc::new(Deny));
        let res = service.handle(HttpRequest::new(Method::GET, "/"));
        assert_eq!(res.status, 403);
    }
}
