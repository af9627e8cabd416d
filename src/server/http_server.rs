use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use http::Method;
use tiny_http::{Header, Response, Server, StatusCode};
use tracing::{debug, info, warn};

use super::request::{decode_body, HttpRequest};
use super::response::{status_reason, HttpResponse};
use super::service::DebugService;
use crate::ids::RequestId;

/// Wrapper around tiny_http's server
///
/// Serves a [`DebugService`] one request at a time on a background thread.
pub struct HttpServer(pub DebugService);

/// Handle to a running HTTP server
///
/// Provides methods for waiting until the server is ready, stopping it,
/// or joining the server thread.
pub struct ServerHandle {
    addr: SocketAddr,
    server: Arc<Server>,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` error if the server doesn't become ready within ~250ms (50 attempts × 5ms).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop the server and wait for its thread to finish.
    pub fn stop(self) {
        self.server.unblock();
        let _ = self.handle.join();
    }

    /// Wait for the server thread to complete
    ///
    /// # Errors
    ///
    /// Returns an error if the server thread panicked.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

impl HttpServer {
    /// Start the HTTP server on the given address
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let server = Server::http(addr).map_err(io::Error::other)?;
        let addr = server.server_addr().to_ip().unwrap_or(addr);
        let server = Arc::new(server);

        let service = self.0;
        let worker = Arc::clone(&server);
        let handle = thread::Builder::new()
            .name("multidump-http".to_string())
            .spawn(move || serve(&worker, &service))?;

        info!(addr = %addr, "debug server listening");
        Ok(ServerHandle {
            addr,
            server,
            handle,
        })
    }
}

fn serve(server: &Server, service: &DebugService) {
    for mut request in server.incoming_requests() {
        let req = match convert_request(&mut request) {
            Ok(req) => req,
            Err(err) => {
                warn!(error = %err, "failed to read request");
                respond(request, convert_response(HttpResponse::text(400, "Bad Request")));
                continue;
            }
        };
        let res = service.handle(req);
        debug!(
            status = res.status,
            reason = status_reason(res.status),
            bytes = res.body.len(),
            "writing response"
        );
        respond(request, convert_response(res));
    }
}

fn respond(request: tiny_http::Request, response: Response<io::Cursor<Vec<u8>>>) {
    if let Err(err) = request.respond(response) {
        debug!(error = %err, "client went away before the response was written");
    }
}

fn convert_request(request: &mut tiny_http::Request) -> io::Result<HttpRequest> {
    let method = Method::from_bytes(request.method().as_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut req = HttpRequest::new(method, request.url());
    for header in request.headers() {
        req = req.with_header(header.field.as_str().as_str(), header.value.as_str());
    }
    req.request_id = RequestId::from_header_or_new(req.get_header("x-request-id"));

    let mut raw = String::new();
    request.as_reader().read_to_string(&mut raw)?;
    req.body = decode_body(req.get_header("content-type"), &raw);
    Ok(req)
}

fn convert_response(res: HttpResponse) -> Response<io::Cursor<Vec<u8>>> {
    let headers = res
        .headers
        .iter()
        .filter_map(|(name, value)| match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => Some(header),
            Err(()) => {
                warn!(header = %name, "dropping invalid response header");
                None
            }
        })
        .collect();
    let body = res.body.into_bytes();
    let len = body.len();
    Response::new(StatusCode(res.status), headers, io::Cursor::new(body), Some(len), None)
}
