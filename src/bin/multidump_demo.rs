use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use http::Method;
use multidump::config::MultiDumpConfig;
use multidump::dump::{AppContext, Debugged};
use multidump::logging;
use multidump::middleware::{MultiDumpMiddleware, TracingMiddleware};
use multidump::server::{DebugService, HttpRequest, HttpResponse, HttpServer};
use multidump::{mdump, mextend};
use serde_json::json;
use tracing::info;

/// Serve a small site with the dump panel enabled
#[derive(Parser, Debug)]
#[command(name = "multidump-demo", version, about = "multidump demo server", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "MULTIDUMP_ADDR", default_value = "127.0.0.1:8080")]
    addr: String,

    /// Environment name shown on the trigger and matched against `enabled_environments`
    #[arg(long, env = "MULTIDUMP_ENV", default_value = "dev")]
    env: String,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[allow(dead_code)]
#[derive(Debug)]
struct ConnectionPool {
    name: &'static str,
    open: usize,
    idle: usize,
}

#[allow(dead_code)]
#[derive(Debug)]
struct ExampleController {
    template: &'static str,
    pool: ConnectionPool,
}

const PAGE: &str = "<!DOCTYPE html>\n<html>\n<head><title>multidump demo</title></head>\n<body>\n<h1>multidump demo</h1>\n<p>Press the trigger in the corner to open the dump panel.</p>\n</body>\n</html>\n";

fn index(_req: &HttpRequest) -> HttpResponse {
    let controller = ExampleController {
        template: "base.html",
        pool: ConnectionPool {
            name: "default",
            open: 4,
            idle: 3,
        },
    };

    mextend!("primary", "Pool", |ctx: &AppContext| {
        let stats = json!({"name": "default", "open": 4, "idle": 3});
        ctx.dump("secondary", stats);
        format!("<b>default</b> pool for <code>{}</code>", ctx.path)
    });

    let ary1: BTreeMap<&str, &str> = [("foo", "bar")].into_iter().collect();
    let ary2: BTreeMap<&str, &str> = [("foo2", "bar2")].into_iter().collect();

    mdump!(ary1);
    mdump!(ary2);
    mdump!(Debugged(controller));

    HttpResponse::html(PAGE)
}

fn status(_req: &HttpRequest) -> HttpResponse {
    mdump!(json!({"uptime_checks": 1}));
    HttpResponse::json(200, &json!({"status": "ok"}))
}

fn toolbar(_req: &HttpRequest) -> HttpResponse {
    HttpResponse::html("<body><div class=\"toolbar\">toolbar</div></body>")
}

fn load_config(path: Option<&PathBuf>) -> Result<MultiDumpConfig> {
    let config = match path {
        Some(path) => MultiDumpConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MultiDumpConfig::default(),
    };
    Ok(config.apply_env())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logging = logging::init_logging()?;

    let config = load_config(cli.config.as_ref())?;
    let hook = MultiDumpMiddleware::new(config, cli.env.clone())
        .context("invalid multidump configuration")?;

    let mut service = DebugService::new();
    service
        .route(Method::GET, "/", "example", index)
        .route(Method::GET, "/api/status", "api_status", status)
        .route(Method::GET, "/_wdt", "_wdt", toolbar)
        .add_middleware(Arc::new(TracingMiddleware))
        .add_middleware(Arc::new(hook));

    let handle = HttpServer(service)
        .start(cli.addr.as_str())
        .with_context(|| format!("failed to bind {}", cli.addr))?;
    handle.wait_ready().context("server did not become ready")?;
    info!(addr = %handle.addr(), env = %cli.env, "multidump demo ready");

    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server thread panicked"))?;
    Ok(())
}
