use std::io::{Read, Write};
use std::net::TcpStream;

use http::Method;
use multidump::config::MultiDumpConfig;
use multidump::dump::{self, AppContext};
use multidump::server::{HttpRequest, HttpResponse, HttpServer};
use multidump::{mdump, mextend};

mod common;
use common::services::{dev_service, get, page, panel_prefix_of, service_with, PAGE};

fn example(_req: &HttpRequest) -> HttpResponse {
    mextend!("primary", "Pool", |ctx: &AppContext| {
        ctx.dump("secondary", serde_json::json!({"pool_open": 4}));
        "<b>pool ok</b>".to_string()
    });
    mdump!(serde_json::json!({"foo": "bar"}));
    mdump!(serde_json::json!({"foo2": "bar2"}));
    HttpResponse::html(PAGE)
}

#[test]
fn test_end_to_end_injection() {
    let mut service = dev_service();
    service.route(Method::GET, "/", "example", example);

    let res = service.handle(get("/"));
    assert_eq!(res.status, 200);
    assert!(res.body.starts_with("<html><body><h1>page</h1>"));
    assert!(res.body.ends_with("</body></html>"));
    assert!(res.body.contains("<b>pool ok</b>"));
    assert!(res.body.contains("pool_open"));
    assert!(res.body.contains("[dev] multi-dump"));

    let prefix = panel_prefix_of(&res.body).unwrap();
    assert!(res
        .body
        .contains(&format!("<span class=\"{prefix}badge\">1</span>")));
    assert!(res
        .body
        .contains(&format!("<span class=\"{prefix}trace_func\">example</span>")));
}

#[test]
fn test_callback_can_use_global_dump_functions() {
    let mut service = dev_service();
    service.route(Method::GET, "/", "doctrine", |_req| {
        mextend!("primary", "Doctrine", |_ctx: &AppContext| {
            mdump!("connections-from-callback", "secondary");
            dump::dump("plain-dump-from-callback");
            "<b>doctrine</b>".to_string()
        });
        HttpResponse::html(PAGE)
    });

    let res = service.handle(get("/"));
    assert!(res.body.contains("<b>doctrine</b>"));
    assert!(res.body.contains("connections-from-callback"));
    assert!(res.body.contains("plain-dump-from-callback"));

    let prefix = panel_prefix_of(&res.body).unwrap();
    assert!(res
        .body
        .contains(&format!("<span class=\"{prefix}badge\">2</span>")));
}

#[test]
fn test_prod_service_leaves_page_alone() {
    let mut service = service_with(MultiDumpConfig::default(), "prod");
    service.route(Method::GET, "/", "example", example);
    let res = service.handle(get("/"));
    assert_eq!(res.body, PAGE);
}

#[test]
fn test_each_request_starts_empty() {
    let mut service = dev_service();
    service.route(Method::GET, "/", "example", |_req| {
        dump::dump_titled("primary", "marker", "only-once");
        HttpResponse::html(PAGE)
    });
    let first = service.handle(get("/"));
    let second = service.handle(get("/"));
    assert_eq!(first.body.matches("only-once").count(), 1);
    assert_eq!(second.body.matches("only-once").count(), 1);
}

#[test]
fn test_forwarded_fragment_feeds_parent_panel() {
    let mut fragments = dev_service();
    fragments.route(Method::GET, "/fragment", "fragment", |_req| {
        dump::dump("fragment dump");
        HttpResponse::html("<p>fragment</p>")
    });

    let parent = get("/");
    let fragment = fragments.forward(&parent, Method::GET, "/fragment");
    assert_eq!(fragment.body, "<p>fragment</p>");
    assert_eq!(parent.dumps.len(), 1);

    let mut pages = dev_service();
    pages.route(Method::GET, "/", "example", page);
    let res = pages.handle(parent);
    assert!(res.body.contains("fragment dump"));
}

#[test]
fn test_profiler_route_untouched() {
    let mut service = dev_service();
    service.route(Method::GET, "/_profiler", "_profiler", page);
    let res = service.handle(get("/_profiler"));
    assert_eq!(res.body, PAGE);
}

#[test]
fn test_http_server_round_trip() {
    let mut service = dev_service();
    service.route(Method::GET, "/", "example", example);
    let handle = HttpServer(service).start("127.0.0.1:0").unwrap();
    handle.wait_ready().unwrap();

    let mut stream = TcpStream::connect(handle.addr()).unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nCookie: sid=abc\r\nConnection: close\r\n\r\n")
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).unwrap();
    handle.stop();

    assert!(raw.starts_with("HTTP/1.1 200"));
    assert!(raw.to_ascii_lowercase().contains("content-type: text/html"));
    assert!(raw.contains("[dev] multi-dump"));
    assert!(raw.contains("sid"));
    assert!(raw.trim_end().ends_with("</body></html>"));
}

#[test]
fn test_http_server_rejects_unreadable_body() {
    let mut service = dev_service();
    service.route(Method::POST, "/", "example", page);
    let handle = HttpServer(service).start("127.0.0.1:0").unwrap();
    handle.wait_ready().unwrap();

    let mut stream = TcpStream::connect(handle.addr()).unwrap();
    stream
        .write_all(b"POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 2\r\nConnection: close\r\n\r\n\xff\xfe")
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    handle.stop();

    let raw = String::from_utf8_lossy(&raw);
    assert!(raw.starts_with("HTTP/1.1 400"));
    assert!(raw.trim_end().ends_with("Bad Request"));
}
