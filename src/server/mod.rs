pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{decode_body, parse_cookies, parse_query_params, HttpRequest};
pub use response::{is_html_content_type, status_reason, HttpResponse};
pub use service::{DebugService, HandlerFn};
