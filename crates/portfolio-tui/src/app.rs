use std::sync::Arc;

use anyhow::Result;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use crate::ui;
use portfolio_core::{
    project_insight_prompt, system_context, CompletionClient, Config, Conversation, InsightCache,
    Profile, Provider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    About,
    Projects,
    Chat,
}

impl Screen {
    pub fn all() -> [Screen; 3] {
        [Screen::About, Screen::Projects, Screen::Chat]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::About => "About",
            Screen::Projects => "Projects",
            Screen::Chat => "Ask AI",
        }
    }

    pub fn next(&self) -> Screen {
        match self {
            Screen::About => Screen::Projects,
            Screen::Projects => Screen::Chat,
            Screen::Chat => Screen::About,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Data
    pub config: Config,
    pub profile: Arc<Profile>,
    pub context: Arc<str>,
    pub client: CompletionClient,
    pub model: Option<String>,

    // About state
    pub about_scroll: u16,

    // Projects state
    pub project_state: ListState,
    pub insights: InsightCache,
    pub insight_tasks: Vec<(usize, JoinHandle<String>)>,

    // Chat state
    pub conversation: Conversation,
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub chat_task: Option<JoinHandle<String>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel area for mouse hit-testing (updated during render)
    pub body_area: Option<Rect>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let profile = Arc::new(config.load_profile()?);
        let context: Arc<str> = system_context(&profile)?.into();
        let client = CompletionClient::from_config(&config);
        let model = config
            .resolve_provider()
            .map(|(provider, _)| config.model_for(provider));
        let conversation = Conversation::new(client.replies().greeting.clone());

        let mut project_state = ListState::default();
        if !profile.projects.is_empty() {
            project_state.select(Some(0));
        }

        Ok(Self {
            should_quit: false,
            screen: Screen::About,
            input_mode: InputMode::Normal,

            config,
            profile,
            context,
            client,
            model,

            about_scroll: 0,

            project_state,
            insights: InsightCache::new(),
            insight_tasks: Vec::new(),

            conversation,
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_task: None,

            animation_frame: 0,

            body_area: None,
        })
    }

    pub fn is_thinking(&self) -> bool {
        self.conversation.is_pending()
    }

    /// Send the current input as a chat turn.
    ///
    /// The request runs on a background task; the reply is appended by
    /// [`App::poll_tasks`] once it finishes.
    pub fn submit_chat(&mut self) -> bool {
        let Some(prompt) = self.conversation.begin_turn(&self.chat_input) else {
            return false;
        };

        self.chat_input.clear();
        self.chat_cursor = 0;
        self.scroll_chat_to_bottom();

        tracing::info!(chars = prompt.chars().count(), "Chat turn submitted");

        let client = self.client.clone();
        let context = Arc::clone(&self.context);
        self.chat_task = Some(tokio::spawn(async move {
            client.complete(&prompt, Some(&context)).await
        }));
        true
    }

    pub fn selected_project(&self) -> Option<usize> {
        self.project_state
            .selected()
            .filter(|&i| i < self.profile.projects.len())
    }

    /// Generate the insight for the selected project, unless it is cached or
    /// already on its way.
    pub fn request_insight(&mut self) -> bool {
        let Some(idx) = self.selected_project() else {
            return false;
        };
        if !self.insights.begin(idx) {
            return false;
        }

        let prompt = project_insight_prompt(&self.profile.projects[idx]);
        let client = self.client.clone();
        self.insight_tasks.push((
            idx,
            tokio::spawn(async move { client.complete(&prompt, None).await }),
        ));
        true
    }

    /// Collect finished background requests.
    pub async fn poll_tasks(&mut self) {
        if self.chat_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.chat_task.take() {
                let reply = self.join_reply(task).await;
                self.conversation.finish_turn(reply);
                self.scroll_chat_to_bottom();
            }
        }

        let mut i = 0;
        while i < self.insight_tasks.len() {
            if self.insight_tasks[i].1.is_finished() {
                let (idx, task) = self.insight_tasks.swap_remove(i);
                let insight = self.join_reply(task).await;
                self.insights.finish(idx, insight);
            } else {
                i += 1;
            }
        }
    }

    async fn join_reply(&self, task: JoinHandle<String>) -> String {
        match task.await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(error = %err, "Completion task did not finish");
                self.client.replies().error.clone()
            }
        }
    }

    /// Switch to the next model of the active provider and remember it.
    pub fn cycle_model(&mut self) {
        let Some((provider, _)) = self.config.resolve_provider() else {
            return;
        };
        let next = next_model(provider, self.model.as_deref());

        self.config.provider = Some(provider.as_str().to_string());
        self.config.model = Some(next.clone());
        self.client = CompletionClient::from_config(&self.config);
        self.model = Some(next.clone());

        if let Err(err) = Config::save_default_model(&next) {
            tracing::warn!(error = %err, "Could not save model choice");
        }
    }

    // Projects navigation
    pub fn project_nav_down(&mut self) {
        let len = self.profile.projects.len();
        if len > 0 {
            let i = self.project_state.selected().unwrap_or(0);
            self.project_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn project_nav_up(&mut self) {
        let i = self.project_state.selected().unwrap_or(0);
        self.project_state.select(Some(i.saturating_sub(1)));
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_thinking() || !self.insight_tasks.is_empty() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll chat to bottom so the newest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };

        let total_lines = u16::try_from(ui::chat_line_count(self, wrap_width)).unwrap_or(u16::MAX);
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }
}

fn next_model(provider: Provider, current: Option<&str>) -> String {
    let models = provider.list_models();
    let pos = current.and_then(|m| models.iter().position(|x| x == m));
    match pos {
        Some(i) => models[(i + 1) % models.len()].clone(),
        None => provider.default_model().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::{ChatRole, DegradedMode, Replies};

    fn offline_app() -> App {
        App::new(Config::new()).unwrap()
    }

    async fn wait_for_tasks(app: &mut App) {
        for _ in 0..200 {
            app.poll_tasks().await;
            if app.chat_task.is_none() && app.insight_tasks.is_empty() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("background tasks did not finish");
    }

    #[tokio::test]
    async fn test_chat_turn_without_key() {
        let mut app = offline_app();
        app.chat_input = "What robotics skills does he have?".to_string();
        app.chat_cursor = app.chat_input.chars().count();

        assert!(app.submit_chat());
        assert!(app.is_thinking());
        assert!(app.chat_input.is_empty());
        assert_eq!(app.chat_cursor, 0);

        wait_for_tasks(&mut app).await;

        let messages = app.conversation.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[2].text, Replies::default().placeholder);
        assert!(!app.is_thinking());
    }

    #[tokio::test]
    async fn test_blank_input_not_submitted() {
        let mut app = offline_app();
        app.chat_input = "   ".to_string();

        assert!(!app.submit_chat());
        assert!(app.chat_task.is_none());
        assert_eq!(app.conversation.len(), 1);
        assert_eq!(app.chat_input, "   ");
    }

    #[tokio::test]
    async fn test_submit_blocked_while_thinking() {
        let mut config = Config::new();
        config.degraded = DegradedMode::Demo;
        let mut app = App::new(config).unwrap();

        app.chat_input = "first".to_string();
        assert!(app.submit_chat());
        app.chat_input = "second".to_string();
        assert!(!app.submit_chat());
        assert_eq!(app.conversation.len(), 2);

        wait_for_tasks(&mut app).await;
        assert_eq!(app.conversation.len(), 3);
        assert_eq!(app.conversation.last().unwrap().text, Replies::default().demo);
    }

    #[tokio::test]
    async fn test_insight_requested_once() {
        let mut app = offline_app();
        app.project_state.select(Some(1));

        assert!(app.request_insight());
        assert!(!app.request_insight());
        wait_for_tasks(&mut app).await;

        assert_eq!(app.insights.get(1), Some(Replies::default().placeholder.as_str()));
        assert!(!app.request_insight());
    }

    #[test]
    fn test_project_navigation_clamps() {
        let mut app = offline_app();
        for _ in 0..10 {
            app.project_nav_down();
        }
        assert_eq!(app.selected_project(), Some(app.profile.projects.len() - 1));
        for _ in 0..10 {
            app.project_nav_up();
        }
        assert_eq!(app.selected_project(), Some(0));
    }

    #[test]
    fn test_next_model_wraps() {
        let models = Provider::Gemini.list_models();
        let last = models.last().unwrap();
        assert_eq!(next_model(Provider::Gemini, Some(last)), models[0]);
        assert_eq!(next_model(Provider::Gemini, Some("unknown")), Provider::Gemini.default_model());
    }

    #[test]
    fn test_chat_line_count_uses_display_width() {
        let mut app = offline_app();
        app.conversation = Conversation::new("0123456789");
        app.conversation.begin_turn("你好世界");
        app.conversation.finish_turn("ok");

        // greeting: role + 2 wrapped + blank; user: role + 2 wrapped + blank;
        // reply: role + 1 + blank
        assert_eq!(ui::chat_line_count(&app, 5), 4 + 4 + 3);
    }

    #[test]
    fn test_scroll_to_bottom_shows_end_of_long_reply() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let mut app = offline_app();
        app.screen = Screen::Chat;
        let words: Vec<String> = (0..80).map(|i| format!("word{}", i)).collect();
        let reply = format!("{}\n{}\n{} END-OF-REPLY", words.join(" "), "你好".repeat(60), words.join(" "));
        app.conversation.begin_turn("Tell me everything");
        app.conversation.finish_turn(reply);

        let mut terminal = Terminal::new(TestBackend::new(40, 16)).unwrap();
        terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();
        app.scroll_chat_to_bottom();
        terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("END-OF-REPLY"));
        assert!(app.chat_scroll > 0);
    }
}
