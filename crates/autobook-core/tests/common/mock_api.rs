//! Minimal HTTP/1.1 server that plays back scripted API responses.
//!
//! Routes match on method and path suffix. Each route serves its queued
//! responses in order, then repeats the last one. Every request is recorded
//! with its path and body so tests can assert call order.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
    pub authorization: Option<String>,
}

struct Route {
    method: &'static str,
    suffix: &'static str,
    responses: VecDeque<(u16, String)>,
}

#[derive(Default)]
struct State {
    routes: Vec<Route>,
    log: Vec<Recorded>,
}

#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<State>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response; the last one queued for a route is repeated.
    pub fn on(&self, method: &'static str, suffix: &'static str, status: u16, body: &str) -> &Self {
        let mut state = self.state.lock().unwrap();
        let entry = (status, body.to_string());
        match state
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.suffix == suffix)
        {
            Some(r) => r.responses.push_back(entry),
            None => state.routes.push(Route {
                method,
                suffix,
                responses: VecDeque::from([entry]),
            }),
        }
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn count(&self, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path.ends_with(suffix))
            .count()
    }

    /// Serve in a background thread. Returns the base URL, e.g.
    /// "http://127.0.0.1:12345/api/v5". The server runs until the process exits.
    pub fn start(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::clone(&self.state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&state);
                thread::spawn(move || handle(stream, &state));
            }
        });
        format!("http://127.0.0.1:{}/api/v5", port)
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(recorded) = read_request(&mut stream) else {
        return;
    };

    let (status, body) = {
        let mut state = state.lock().unwrap();
        state.log.push(recorded.clone());
        let route = state
            .routes
            .iter_mut()
            .find(|r| r.method == recorded.method && recorded.path.ends_with(r.suffix));
        match route {
            Some(r) if r.responses.len() > 1 => r.responses.pop_front().unwrap(),
            Some(r) => r.responses.front().cloned().unwrap(),
            None => (404, String::new()),
        }
    };

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body.as_bytes());
}

/// Read the head, then exactly Content-Length body bytes.
fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&buf[..n]);
        if let Some(i) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break i + 4;
        }
    };

    let head = std::str::from_utf8(&raw[..head_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?;
    let path = target.split('?').next().unwrap_or(target).to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value.trim().to_string());
            }
        }
    }

    let mut body = raw[head_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }

    Some(Recorded {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
        authorization,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
