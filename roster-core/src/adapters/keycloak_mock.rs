//! Mock Keycloak server for testing
//!
//! Simulates the three endpoints Roster talks to:
//! - POST /token returns a password-grant token response
//! - GET /users returns a JSON array of users
//! - GET /users/{id}/groups returns a JSON array of groups
//!
//! Every request is recorded so tests can assert which endpoints were hit.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value as JsonValue};

/// Mock Keycloak server for testing
pub struct MockKeycloakServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// A request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// Scenario configuration
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Token handed out by POST /token and required as bearer afterwards
    pub access_token: String,
    /// Status returned by POST /token
    pub token_status: u16,
    /// Raw body for POST /token, replacing the generated one
    pub token_body: Option<String>,
    /// Users returned by GET /users
    pub users: Vec<JsonValue>,
    /// Status returned by GET /users
    pub users_status: u16,
    /// Groups per user id; ids without an entry get an empty array
    pub groups: HashMap<String, Vec<JsonValue>>,
    /// User id whose group lookup fails with HTTP 500
    pub failing_group_user: Option<String>,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            access_token: "tok".to_string(),
            token_status: 200,
            token_body: None,
            users: Vec::new(),
            users_status: 200,
            groups: HashMap::new(),
            failing_group_user: None,
            delay_ms: 0,
        }
    }
}

impl MockConfig {
    /// Add a user with the given id and username
    pub fn with_user(mut self, id: &str, username: &str) -> Self {
        self.users.push(json!({ "id": id, "username": username, "enabled": true }));
        self
    }

    /// Add a group membership for a user id
    pub fn with_group(mut self, user_id: &str, id: &str, name: &str, path: &str) -> Self {
        self.groups
            .entry(user_id.to_string())
            .or_default()
            .push(json!({ "id": id, "name": name, "path": path }));
        self
    }
}

impl MockKeycloakServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking so the accept loop notices shutdown
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let config = Arc::new(config);
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let log = requests_clone.clone();
                        thread::spawn(move || handle_connection(stream, &cfg, &log));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.base_url())
    }

    pub fn users_url(&self) -> String {
        format!("{}/users", self.base_url())
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Paths of the group lookups received so far
    pub fn group_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with("/groups"))
            .map(|r| r.path)
            .collect()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockKeycloakServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read one HTTP/1.1 request: headers, then `Content-Length` bytes of body
fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let mut parts = lines.next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }
    let body_end = data.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&data[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        path,
        authorization,
        body,
    })
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, log: &Mutex<Vec<RecordedRequest>>) {
    // Accepted sockets inherit non-blocking mode on some platforms
    let _ = stream.set_nonblocking(false);

    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, "Bad Request", r#"{"error":"Invalid request"}"#);
        return;
    };

    if let Ok(mut requests) = log.lock() {
        requests.push(request.clone());
    }

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    let path = request.path.split('?').next().unwrap_or("");
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (request.method.as_str(), segments.as_slice()) {
        ("POST", ["token"]) => handle_token(&mut stream, &request, config),
        ("GET", ["users"]) => {
            if !is_authorized(&request, config) {
                return send_unauthorized(&mut stream);
            }
            if config.users_status != 200 {
                return send_status(&mut stream, config.users_status);
            }
            let body = JsonValue::Array(config.users.clone()).to_string();
            send_response(&mut stream, 200, "OK", &body);
        }
        ("GET", ["users", user_id, "groups"]) => {
            if !is_authorized(&request, config) {
                return send_unauthorized(&mut stream);
            }
            if config.failing_group_user.as_deref() == Some(*user_id) {
                return send_status(&mut stream, 500);
            }
            let groups = config.groups.get(*user_id).cloned().unwrap_or_default();
            send_response(&mut stream, 200, "OK", &JsonValue::Array(groups).to_string());
        }
        ("GET", _) | ("POST", _) => {
            send_response(&mut stream, 404, "Not Found", r#"{"error":"Endpoint not found"}"#);
        }
        _ => {
            send_response(&mut stream, 405, "Method Not Allowed", r#"{"error":"Method not allowed"}"#);
        }
    }
}

fn handle_token(stream: &mut TcpStream, request: &RecordedRequest, config: &MockConfig) {
    if !request.body.contains("grant_type=password") {
        return send_response(stream, 400, "Bad Request", r#"{"error":"unsupported_grant_type"}"#);
    }
    if config.token_status != 200 {
        return send_status(stream, config.token_status);
    }
    let body = config.token_body.clone().unwrap_or_else(|| {
        json!({
            "access_token": config.access_token,
            "token_type": "Bearer",
            "expires_in": 60,
            "refresh_token": "refresh",
            "refresh_expires_in": 1800
        })
        .to_string()
    });
    send_response(stream, 200, "OK", &body);
}

fn is_authorized(request: &RecordedRequest, config: &MockConfig) -> bool {
    request.authorization.as_deref() == Some(format!("Bearer {}", config.access_token).as_str())
}

fn send_unauthorized(stream: &mut TcpStream) {
    send_response(stream, 401, "Unauthorized", r#"{"error":"HTTP 401 Unauthorized"}"#);
}

fn send_status(stream: &mut TcpStream, status: u16) {
    let text = match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Error",
    };
    send_response(stream, status, text, &json!({ "error": text }).to_string());
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
