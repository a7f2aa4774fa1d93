pub mod ai;
pub mod client;
pub mod config;
pub mod profile;
pub mod prompt;
pub mod provider;
pub mod state;

// Re-export main types for convenience
pub use ai::{CompletionError, CompletionProvider, DemoClient, GeminiClient, OpenAIClient};
pub use client::{CompletionClient, Replies};
pub use config::{Config, DegradedMode};
pub use profile::{Profile, Project};
pub use prompt::{project_insight_prompt, system_context};
pub use provider::Provider;
pub use state::{ChatMessage, ChatRole, Conversation, InsightCache};
