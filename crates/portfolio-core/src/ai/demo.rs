use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionError, CompletionProvider};

/// Delay before the canned reply, so the "thinking" indicator is visible.
pub const DEMO_DELAY: Duration = Duration::from_millis(800);

/// Stand-in used when no API key is configured and demo mode is on.
///
/// Never touches the network: it waits a fixed delay and returns the same
/// canned reply for every prompt.
#[derive(Debug, Clone)]
pub struct DemoClient {
    reply: String,
    delay: Duration,
}

impl DemoClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: DEMO_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl CompletionProvider for DemoClient {
    fn name(&self) -> &str {
        "Demo"
    }

    fn is_remote(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<String, CompletionError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_returns_canned_reply_after_delay() {
        let demo = DemoClient::new("canned").with_delay(Duration::from_millis(20));
        let started = Instant::now();

        let reply = demo.complete("anything at all", Some("ctx")).await.unwrap();

        assert_eq!(reply, "canned");
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!demo.is_remote());
    }
}
