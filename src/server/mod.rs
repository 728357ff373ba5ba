//! Control-plane HTTP server: a thin wrapper that turns GET query strings
//! into protocol calls and protocol snapshots into responses.
//!
//! Routes:
//! - `GET /` — HTML console rendered from a fresh snapshot.
//! - `GET /api/state` — JSON snapshot.
//! - `GET /api/config?k=v&…` — apply configuration, answer with the
//!   post-write snapshot so the operator sees the actually-stored values.
//!
//! Field correctness and value ranges belong to the protocol layer; this
//! module owns only HTTP plumbing and degrades to 404/500 instead of
//! panicking.

mod page;

use std::{
    io::{BufRead, BufReader, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use log::{error, info};
use socket2::{Domain, SockAddr, Socket, Type};

use crate::engine::state::SharedControlState;
use crate::protocol::{apply_config, snapshot_state};

/// Bind the listener and serve requests until `running` is cleared.
/// Blocks the calling thread; each accepted connection is handled on its
/// own short-lived thread.
pub fn run(addr: &str, state: Arc<SharedControlState>, running: Arc<AtomicBool>) {
    let listener = match bind_listener(addr) {
        Ok(l) => l,
        Err(e) => {
            error!("control plane failed to bind {}: {}", addr, e);
            return;
        }
    };

    info!("control plane listening on http://{}", addr);

    for stream in listener.incoming() {
        if !running.load(Ordering::Relaxed) {
            break;
        }

        match stream {
            Ok(mut stream) => {
                let state = state.clone();
                thread::spawn(move || {
                    handle_request(&mut stream, &state);
                });
            }
            Err(e) => {
                error!("accept error: {}", e);
            }
        }
    }

    info!("control plane exiting accept loop");
}

/// Socket setup with address reuse so restarts do not trip over TIME_WAIT.
fn bind_listener(addr: &str) -> std::io::Result<TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.bind(&SockAddr::from(addr))?;
    socket.listen(128)?;
    Ok(socket.into())
}

fn handle_request(stream: &mut TcpStream, state: &SharedControlState) {
    let mut reader = match stream.try_clone() {
        Ok(clone) => BufReader::new(clone),
        Err(e) => {
            error!("stream clone failed: {}", e);
            return;
        }
    };

    let mut line = String::new();
    if reader.read_line(&mut line).is_err() {
        return;
    }

    let target = match request_target(&line) {
        Some(t) => t,
        None => {
            let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n");
            return;
        }
    };
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p, q),
        None => (target, ""),
    };

    let response = match path {
        "/" => {
            let html = page::build_page(&snapshot_state(state));
            http_response("200 OK", "text/html", &html)
        }
        "/api/state" => {
            let json = snapshot_state(state).to_json();
            http_response("200 OK", "application/json", &json)
        }
        "/api/config" => {
            let pairs = parse_query(query);
            apply_config(
                state,
                pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            );
            let json = snapshot_state(state).to_json();
            http_response("200 OK", "application/json", &json)
        }
        _ => "HTTP/1.1 404 Not Found\r\n\r\n".to_string(),
    };

    let _ = stream.write_all(response.as_bytes());
}

/// Extract the request target from a `GET <target> HTTP/1.x` request line.
fn request_target(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("GET ")?;
    rest.split_whitespace().next()
}

/// Split a query string into decoded key/value pairs, preserving order.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((k, v)) => (url_decode(k), url_decode(v)),
            None => (url_decode(part), String::new()),
        })
        .collect()
}

/// Percent-decoding with `+` as space. Malformed escapes pass through
/// verbatim rather than failing the request.
pub fn url_decode(src: &str) -> String {
    let bytes = src.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                out.push(hex_val(bytes[i + 1]) << 4 | hex_val(bytes[i + 2]));
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

fn http_response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    )
}
