#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;

    use tempfile::NamedTempFile;

    /// Write `content` to a fresh `.yaml` file removed when the handle drops
    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("multidump_test_")
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}

pub mod tracing_capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::Level;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Captures log output of the current thread while alive
    pub struct TestTracing {
        buffer: Buffer,
        _guard: tracing::subscriber::DefaultGuard,
    }

    impl TestTracing {
        pub fn init() -> Self {
            let buffer = Buffer::default();
            let writer = buffer.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(Level::DEBUG)
                .with_ansi(false)
                .with_writer(move || writer.clone())
                .finish();
            let guard = tracing::subscriber::set_default(subscriber);
            Self {
                buffer,
                _guard: guard,
            }
        }

        pub fn output(&self) -> String {
            String::from_utf8_lossy(&self.buffer.0.lock().unwrap()).into_owned()
        }

        pub fn contains(&self, needle: &str) -> bool {
            self.output().contains(needle)
        }
    }
}

pub mod services {
    use std::sync::Arc;

    use http::Method;
    use multidump::config::MultiDumpConfig;
    use multidump::middleware::{MultiDumpMiddleware, TracingMiddleware};
    use multidump::server::{DebugService, HttpRequest, HttpResponse};

    pub const PAGE: &str = "<html><body><h1>page</h1></body></html>";

    pub fn page(_req: &HttpRequest) -> HttpResponse {
        HttpResponse::html(PAGE)
    }

    /// Service with the lifecycle hook installed for `environment`
    pub fn service_with(config: MultiDumpConfig, environment: &str) -> DebugService {
        let mut service = DebugService::new();
        service
            .add_middleware(Arc::new(TracingMiddleware))
            .add_middleware(Arc::new(
                MultiDumpMiddleware::new(config, environment).unwrap(),
            ));
        service
    }

    pub fn dev_service() -> DebugService {
        service_with(MultiDumpConfig::default(), "dev")
    }

    pub fn get(path: &str) -> HttpRequest {
        HttpRequest::new(Method::GET, path)
    }

    /// The panel's namespacing prefix found in an injected body
    pub fn panel_prefix_of(body: &str) -> Option<String> {
        let start = body.find("id=\"___mdbg")? + "id=\"".len();
        Some(body[start..start + "___mdbg".len() + 3].to_string())
    }
}
