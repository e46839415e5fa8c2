//! Test doubles for the identity provider and comment persistence

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;
use replay_devtools::auth::{AuthClient, AuthError};
use replay_devtools::comments::{CommentError, CommentId, CommentStore, NewComment};

/// Unsigned JWT whose only claim is `exp`
pub fn jwt_expiring_at(exp_secs: i64) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
        URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp_secs}}}"#))
    )
}

/// Identity provider that answers from a script and records every call
pub struct ScriptedAuthClient {
    pub loading: AtomicBool,
    pub authenticated: AtomicBool,
    silent: Mutex<VecDeque<Result<String, AuthError>>>,
    popup: Mutex<VecDeque<Result<String, AuthError>>>,
    pub silent_calls: Mutex<Vec<bool>>,
    pub popup_calls: AtomicUsize,
}

impl ScriptedAuthClient {
    pub fn new() -> Self {
        Self {
            loading: AtomicBool::new(false),
            authenticated: AtomicBool::new(true),
            silent: Mutex::new(VecDeque::new()),
            popup: Mutex::new(VecDeque::new()),
            silent_calls: Mutex::new(Vec::new()),
            popup_calls: AtomicUsize::new(0),
        }
    }

    pub fn logged_out() -> Self {
        let client = Self::new();
        client.authenticated.store(false, Ordering::SeqCst);
        client
    }

    pub fn silent(self, result: Result<String, AuthError>) -> Self {
        self.silent.lock().push_back(result);
        self
    }

    pub fn popup(self, result: Result<String, AuthError>) -> Self {
        self.popup.lock().push_back(result);
        self
    }

    /// `ignore_cache` flag of each silent request, in order
    pub fn silent_requests(&self) -> Vec<bool> {
        self.silent_calls.lock().clone()
    }
}

#[async_trait]
impl AuthClient for ScriptedAuthClient {
    fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn access_token_silently(
        &self,
        _audience: &str,
        ignore_cache: bool,
    ) -> Result<String, AuthError> {
        self.silent_calls.lock().push(ignore_cache);
        self.silent
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::provider("script_empty", "no scripted response")))
    }

    async fn access_token_with_popup(
        &self,
        _audience: &str,
        _ignore_cache: bool,
    ) -> Result<String, AuthError> {
        self.popup_calls.fetch_add(1, Ordering::SeqCst);
        self.popup
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::provider("script_empty", "no scripted response")))
    }
}

/// Comment service that is always down
pub struct FailingCommentStore;

#[async_trait]
impl CommentStore for FailingCommentStore {
    async fn add_comment(&self, _comment: NewComment) -> Result<CommentId, CommentError> {
        Err(CommentError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// Request captured by [`serve_once`]
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: serde_json::Value,
}

impl CapturedRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

/// Answer a single HTTP request on a local port with `status` and `body`.
/// Returns the endpoint URL and a handle resolving to what was sent.
pub async fn serve_once(
    status: u16,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<CapturedRequest>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/graphql", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request head");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let length: usize = head
            .lines()
            .find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse().ok())?
            })
            .unwrap_or(0);
        while buf.len() < head_end + length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        CapturedRequest {
            head,
            body: serde_json::from_slice(&buf[head_end..head_end + length]).unwrap(),
        }
    });

    (url, handle)
}
