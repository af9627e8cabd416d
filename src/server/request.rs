use std::sync::Arc;

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::debug;

use crate::dump::{AppContext, DumpContext, PRIMARY_SECTION};
use crate::ids::RequestId;
use crate::render::DefaultItems;

/// Maximum inline headers/cookies before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Maximum inline query parameters before heap allocation
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated header/cookie storage
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Stack-allocated query parameter storage
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One request as seen by handlers and middleware
///
/// Carries the request's own [`DumpContext`]; cloning the request shares it.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path without query string
    pub path: String,
    /// Name of the matched route, if any
    pub route: Option<String>,
    /// Query string parameters
    pub query_params: ParamVec,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header
    pub cookies: HeaderVec,
    /// Request body parsed as JSON or form data (if present)
    pub body: Option<Value>,
    /// Authenticated user, as provided by the host
    pub user: Option<Value>,
    /// Session contents, as provided by the host
    pub session: Option<Value>,
    /// Set for internally forwarded requests (fragments, includes)
    pub sub_request: bool,
    /// Dump state for this request only
    pub dumps: DumpContext,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let raw: String = path.into();
        let (path, query) = split_path(&raw);
        Self {
            request_id: RequestId::new(),
            method,
            path,
            route: None,
            query_params: query.map(parse_query_params).unwrap_or_default(),
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            body: None,
            user: None,
            session: None,
            sub_request: false,
            dumps: DumpContext::new(),
        }
    }

    /// Add a header; a `cookie` header also fills [`HttpRequest::cookies`].
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if name == "cookie" {
            self.cookies.extend(parse_cookies(&value));
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_user(mut self, user: Value) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_session(mut self, session: Value) -> Self {
        self.session = Some(session);
        self
    }

    /// Build a sub-request sharing this request's dump state.
    pub fn sub_request(&self, method: Method, path: impl Into<String>) -> Self {
        let mut sub = Self::new(method, path);
        sub.request_id = self.request_id;
        sub.headers = self.headers.clone();
        sub.cookies = self.cookies.clone();
        sub.user = self.user.clone();
        sub.session = self.session.clone();
        sub.sub_request = true;
        sub.dumps = self.dumps.clone();
        sub
    }

    /// Get a query parameter by name (last occurrence wins)
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// The narrow view render callbacks get of this request.
    pub fn app_context(&self, environment: &str) -> AppContext {
        AppContext::new(environment, self.dumps.clone())
            .with_route(self.route.clone())
            .with_request(self.method.clone(), self.path.clone())
            .with_sub_request(self.sub_request)
            .with_request_id(self.request_id)
    }
}

fn pairs_to_json(pairs: &[(Arc<str>, String)]) -> Value {
    Value::Object(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect(),
    )
}

/// The standard diagnostics shown at the top of the primary column.
impl DefaultItems for HttpRequest {
    fn collect(&self, ctx: &AppContext) {
        let dumps = ctx.dumps();
        dumps.dump_titled(PRIMARY_SECTION, "user", self.user.clone().unwrap_or(Value::Null));
        dumps.dump_titled(
            PRIMARY_SECTION,
            "request",
            serde_json::json!({
                "request_id": self.request_id,
                "method": self.method.as_str(),
                "path": self.path,
                "route": self.route,
                "sub_request": self.sub_request,
            }),
        );
        if let Some(session) = &self.session {
            dumps.dump_titled(PRIMARY_SECTION, "session", session.clone());
        }
        if let Some(body) = &self.body {
            dumps.dump_titled(PRIMARY_SECTION, "POST", body.clone());
        }
        if !self.query_params.is_empty() {
            dumps.dump_titled(PRIMARY_SECTION, "query", pairs_to_json(&self.query_params));
        }
        dumps.dump_titled(PRIMARY_SECTION, "cookies", pairs_to_json(&self.cookies));
    }
}

fn split_path(raw: &str) -> (String, Option<&str>) {
    match raw.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query)),
        None => (raw.to_string(), None),
    }
}

/// Parse a `Cookie` header value.
pub fn parse_cookies(header: &str) -> HeaderVec {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim().to_string();
            Some((Arc::<str>::from(name), value))
        })
        .collect()
}

/// Parse a URL-encoded query string (without the leading `?`).
pub fn parse_query_params(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::<str>::from(&*k), v.into_owned()))
        .collect()
}

/// Decode a request body by content type: JSON, URL-encoded form, or nothing.
pub fn decode_body(content_type: Option<&str>, raw: &str) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }
    let content_type = content_type.unwrap_or("").to_ascii_lowercase();
    if content_type.starts_with("application/x-www-form-urlencoded") {
        let fields = url::form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
        return Some(Value::Object(fields));
    }
    match serde_json::from_str(raw) {
        Ok(json) => Some(json),
        Err(err) => {
            debug!(error = %err, "request body is not JSON; kept as text");
            Some(Value::String(raw.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_cookies() {
        let cookies = parse_cookies("a=b; c=d; ;e");
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies[0], (Arc::<str>::from("a"), "b".to_string()));
        assert_eq!(cookies[2], (Arc::<str>::from("e"), String::new()));
    }

    #[test]
    fn test_query_string_split_from_path() {
        let req = HttpRequest::new(Method::GET, "/p?x=1&y=hello%20world&x=2");
        assert_eq!(req.path, "/p");
        assert_eq!(req.get_query_param("x"), Some("2"));
        assert_eq!(req.get_query_param("y"), Some("hello world"));
    }

    #[test]
    fn test_cookie_header_fills_cookies() {
        let req = HttpRequest::new(Method::GET, "/").with_header("Cookie", "sid=abc");
        assert_eq!(req.get_cookie("sid"), Some("abc"));
        assert_eq!(req.get_header("COOKIE"), Some("sid=abc"));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(None, ""), None);
        assert_eq!(
            decode_body(Some("application/json"), "{\"a\":1}"),
            Some(json!({"a": 1}))
        );
        assert_eq!(
            decode_body(Some("application/x-www-form-urlencoded"), "a=1&b=x+y"),
            Some(json!({"a": "1", "b": "x y"}))
        );
        assert_eq!(decode_body(Some("text/plain"), "hi"), Some(json!("hi")));
    }

    #[test]
    fn test_sub_request_shares_dumps() {
        let parent = HttpRequest::new(Method::GET, "/");
        let sub = parent.sub_request(Method::GET, "/fragment");
        assert!(sub.sub_request);
        sub.dumps.dump(1);
        assert_eq!(parent.dumps.len(), 1);
    }

    #[test]
    fn test_default_items() {
        let req = HttpRequest::new(Method::POST, "/form?page=2")
            .with_header("cookie", "sid=1")
            .with_body(json!({"name": "x"}))
            .with_session(json!({"cart": 3}));
        let ctx = req.app_context("dev");
        req.collect(&ctx);
        let values = req.dumps.values();
        let titles: Vec<_> = values
            .section(PRIMARY_SECTION)
            .unwrap()
            .iter()
            .map(|e| e.title().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["user", "request", "session", "POST", "query", "cookies"]);
    }
}
