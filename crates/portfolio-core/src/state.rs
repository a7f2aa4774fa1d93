//! UI-agnostic application state types
//!
//! The conversation and the project insight cache are shared by every front
//! end (TUI, one-shot CLI) and don't depend on any UI framework. Both are
//! owned by a single event loop, so neither needs locking.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::client::CompletionClient;
use crate::profile::Profile;
use crate::prompt::project_insight_prompt;

/// A chat message in the AI conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ChatRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Model, text: text.into() }
    }
}

/// Append-only chat history for one session.
///
/// Messages are never removed or reordered, so the slice returned by
/// [`Conversation::messages`] is display order and submission order at once.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl Conversation {
    /// Start a conversation seeded with the model's greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::model(greeting)],
            pending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// True while a submitted turn is waiting for its reply.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Accept user input as the start of a turn.
    ///
    /// Blank input, or input arriving while another turn is outstanding, is
    /// dropped without touching the history. Otherwise the user message is
    /// appended and the text to send is returned.
    pub fn begin_turn(&mut self, input: &str) -> Option<String> {
        if input.trim().is_empty() || self.pending {
            return None;
        }
        self.append(ChatMessage::user(input));
        self.pending = true;
        Some(input.to_string())
    }

    /// Close the outstanding turn with the model's reply.
    pub fn finish_turn(&mut self, reply: impl Into<String>) {
        self.append(ChatMessage::model(reply));
        self.pending = false;
    }

    /// Run a whole turn inline: append the user message, await the reply and
    /// append it. Returns false when the input was not accepted.
    pub async fn submit(&mut self, input: &str, client: &CompletionClient, context: &str) -> bool {
        let Some(prompt) = self.begin_turn(input) else {
            return false;
        };
        let reply = client.complete(&prompt, Some(context)).await;
        self.finish_turn(reply);
        true
    }
}

/// One-shot AI insights per project, cached for the session.
#[derive(Debug, Default, Clone)]
pub struct InsightCache {
    insights: HashMap<usize, String>,
    loading: HashSet<usize>,
}

impl InsightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, project_idx: usize) -> Option<&str> {
        self.insights.get(&project_idx).map(String::as_str)
    }

    pub fn is_loading(&self, project_idx: usize) -> bool {
        self.loading.contains(&project_idx)
    }

    /// Mark a project's insight as requested. Returns false when it is already
    /// cached or in flight, in which case nothing should be sent.
    pub fn begin(&mut self, project_idx: usize) -> bool {
        if self.insights.contains_key(&project_idx) || self.loading.contains(&project_idx) {
            return false;
        }
        self.loading.insert(project_idx)
    }

    pub fn finish(&mut self, project_idx: usize, insight: impl Into<String>) {
        self.loading.remove(&project_idx);
        self.insights.insert(project_idx, insight.into());
    }

    /// Return the cached insight, fetching it first if needed. `None` means
    /// the project doesn't exist or a fetch for it is already running.
    pub async fn fetch(
        &mut self,
        project_idx: usize,
        profile: &Profile,
        client: &CompletionClient,
    ) -> Option<String> {
        if let Some(cached) = self.get(project_idx) {
            return Some(cached.to_string());
        }
        let project = profile.project(project_idx)?;
        if !self.begin(project_idx) {
            return None;
        }
        let insight = client.complete(&project_insight_prompt(project), None).await;
        self.finish(project_idx, insight.clone());
        Some(insight)
    }
}
