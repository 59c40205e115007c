//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of paths. Each path either returns a body, a bare
//! status, or fails (with 500, or with a 200 HTML page) a set number of
//! times before returning its body. Hit counts and the last User-Agent seen are recorded per path.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub enum Route {
    Body(Vec<u8>),
    Status(u16),
    FailThen { failures: usize, body: Vec<u8> },
    /// 200 with an HTML error page for the first `failures` hits, then `body`.
    GarbageThen { failures: usize, body: Vec<u8> },
}

#[derive(Debug, Default)]
struct Seen {
    hits: HashMap<String, usize>,
    user_agents: HashMap<String, String>,
}

#[derive(Clone)]
pub struct ImageServer {
    pub base_url: String,
    seen: Arc<Mutex<Seen>>,
}

impl ImageServer {
    /// Starts a server in a background thread. The server runs until the
    /// process exits.
    pub fn start(routes: Vec<(&str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .into_iter()
                .map(|(p, r)| (p.to_string(), r))
                .collect(),
        );
        let seen = Arc::new(Mutex::new(Seen::default()));
        let seen_srv = Arc::clone(&seen);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let seen = Arc::clone(&seen_srv);
                thread::spawn(move || handle(stream, &routes, &seen));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}/", port),
            seen,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn hits(&self, path: &str) -> usize {
        let seen = self.seen.lock().unwrap();
        seen.hits.get(path).copied().unwrap_or(0)
    }

    pub fn user_agent(&self, path: &str) -> Option<String> {
        let seen = self.seen.lock().unwrap();
        seen.user_agents.get(path).cloned()
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, Route>, seen: &Mutex<Seen>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path, user_agent) = parse_request(request);
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let hit = {
        let mut seen = seen.lock().unwrap();
        let count = seen.hits.entry(path.to_string()).or_insert(0);
        *count += 1;
        let hit = *count;
        if let Some(ua) = user_agent {
            seen.user_agents.insert(path.to_string(), ua.to_string());
        }
        hit
    };

    let empty: &[u8] = &[];
    let (status, body) = match routes.get(path) {
        Some(Route::Body(b)) => ("200 OK", b.as_slice()),
        Some(Route::Status(code)) => (status_line(*code), empty),
        Some(Route::FailThen { failures, body }) => {
            if hit <= *failures {
                ("500 Internal Server Error", empty)
            } else {
                ("200 OK", body.as_slice())
            }
        }
        Some(Route::GarbageThen { failures, body }) => {
            if hit <= *failures {
                ("200 OK", b"<html><body>try again later</body></html>".as_slice())
            } else {
                ("200 OK", body.as_slice())
            }
        }
        None => ("404 Not Found", empty),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}

fn status_line(code: u16) -> &'static str {
    match code {
        403 => "403 Forbidden",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        503 => "503 Service Unavailable",
        _ => "500 Internal Server Error",
    }
}

/// Returns (method, path without leading slash, optional User-Agent).
fn parse_request(request: &str) -> (&str, &str, Option<&str>) {
    let mut method = "";
    let mut path = "";
    let mut user_agent = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            let mut parts = line.split_whitespace();
            method = parts.next().unwrap_or("");
            path = parts.next().unwrap_or("/").trim_start_matches('/');
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("user-agent") {
                user_agent = Some(value.trim());
            }
        }
    }
    (method, path, user_agent)
}
