use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{CompletionError, CompletionProvider};

/// Returns a fixed reply and remembers what it was asked.
pub(crate) struct RecordingProvider {
    reply: String,
    calls: AtomicUsize,
    last: Mutex<Option<(String, Option<String>)>>,
}

impl RecordingProvider {
    pub(crate) fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_prompt(&self) -> Option<String> {
        self.last.lock().unwrap().as_ref().map(|(p, _)| p.clone())
    }

    pub(crate) fn last_system(&self) -> Option<String> {
        self.last.lock().unwrap().as_ref().and_then(|(_, s)| s.clone())
    }
}

#[async_trait]
impl CompletionProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((prompt.to_string(), system.map(str::to_string)));
        Ok(self.reply.clone())
    }
}

/// Always fails as if the server answered 503.
pub(crate) struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<String, CompletionError> {
        Err(CompletionError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// Answers successfully but with nothing in it.
pub(crate) struct EmptyProvider;

#[async_trait]
impl CompletionProvider for EmptyProvider {
    fn name(&self) -> &str {
        "empty"
    }

    async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<String, CompletionError> {
        Err(CompletionError::EmptyReply)
    }
}

/// Answer exactly one HTTP request on a local port with `status` and `body`.
/// Returns the base URL to point a client at.
pub(crate) async fn serve_once(status: &'static str, body: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    });

    async fn read_request(stream: &mut tokio::net::TcpStream) {
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&request);
            let Some(head_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let content_length = text[..head_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= head_end + 4 + content_length {
                return;
            }
        }
    }

    format!("http://{}", addr)
}
