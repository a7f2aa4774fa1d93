use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
};
use portfolio_core::ChatRole;
use unicode_width::UnicodeWidthChar;

use crate::app::{App, InputMode, Screen};

const ACCENT: Color = Color::Green;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if end == 0 {
            // "****" is not emphasis
            spans.push(Span::raw(rest[..start + 4].to_string()));
            rest = &after[2..];
            continue;
        }
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        spans.push(Span::styled(
            after[..end].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

fn thinking_dots(app: &App) -> String {
    ".".repeat(app.animation_frame as usize + 1)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, tabs, body, footer
    let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    app.body_area = Some(body_area);

    render_header(app, frame, header_area);
    render_tabs(app, frame, tabs_area);

    match app.screen {
        Screen::About => render_about_screen(app, frame, body_area),
        Screen::Projects => render_projects_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let personal = &app.profile.personal;
    let title = Line::from(vec![
        Span::styled(format!(" {} ", personal.name), Style::default().fg(ACCENT).bold()),
        Span::styled(format!("| {} ", personal.title), Style::default().fg(Color::White)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let titles: Vec<String> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{} {}", i + 1, s.title()))
        .collect();
    let selected = Screen::all().iter().position(|s| *s == app.screen).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ))
}

fn render_about_screen(app: &App, frame: &mut Frame, area: Rect) {
    let profile = &app.profile;
    let personal = &profile.personal;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        personal.subtitle.clone(),
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    )));
    lines.push(Line::from(format!("{}  ·  {}", personal.email, personal.location)));
    lines.push(Line::default());

    let stats: Vec<Span> = profile
        .stats
        .iter()
        .flat_map(|stat| {
            [
                Span::styled(stat.value.clone(), Style::default().fg(ACCENT).bold()),
                Span::raw(format!(" {}   ", stat.label)),
            ]
        })
        .collect();
    lines.push(Line::from(stats));
    lines.push(Line::default());

    lines.push(section("Education"));
    for edu in &personal.education {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}", edu.school), Style::default().bold()),
            Span::raw(format!("  {}", edu.degree)),
            Span::styled(format!("  {}", edu.year), Style::default().fg(Color::DarkGray)),
        ]));
    }
    lines.push(Line::default());

    lines.push(section("Skills"));
    lines.push(Line::from(format!("  {}", profile.skills.join(" · "))));
    lines.push(Line::default());

    lines.push(section("Awards"));
    for award in &profile.awards {
        lines.push(Line::from(format!("  ▹ {}", award)));
    }

    let about = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" About "))
        .wrap(Wrap { trim: false })
        .scroll((app.about_scroll, 0));
    frame.render_widget(about, area);
}

fn render_projects_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).areas(area);

    let items: Vec<ListItem> = app
        .profile
        .projects
        .iter()
        .map(|project| ListItem::new(project.title.clone()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Projects "))
        .highlight_style(Style::default().bg(ACCENT).fg(Color::Black).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.project_state);

    let Some(idx) = app.selected_project() else {
        frame.render_widget(Block::default().borders(Borders::ALL), detail_area);
        return;
    };
    let project = &app.profile.projects[idx];

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(project.title.clone(), Style::default().fg(Color::White).bold())),
        Line::from(Span::styled(project.role.clone(), Style::default().fg(ACCENT))),
        Line::default(),
        Line::from(project.desc.clone()),
        Line::default(),
        Line::from(
            project
                .tags
                .iter()
                .map(|tag| Span::styled(format!("[{}] ", tag), Style::default().fg(Color::Gray)))
                .collect::<Vec<_>>(),
        ),
        Line::default(),
    ];
    for point in &project.highlights {
        lines.push(Line::from(vec![
            Span::styled("▹ ", Style::default().fg(ACCENT)),
            Span::raw(point.clone()),
        ]));
    }
    lines.push(Line::default());

    if let Some(insight) = app.insights.get(idx) {
        lines.push(Line::from(Span::styled(
            format!("✦ \"{}\"", insight),
            Style::default().fg(Color::LightGreen).add_modifier(Modifier::ITALIC),
        )));
    } else if app.insights.is_loading(idx) {
        lines.push(Line::from(Span::styled(
            format!("Analyzing technical architecture{}", thinking_dots(app)),
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("✦ Press Enter to generate an insight ({})", app.client.provider_name()),
            Style::default().fg(ACCENT),
        )));
    }

    let detail = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, detail_area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let title = match &app.model {
        Some(model) => format!(" {}: {} ", app.client.provider_name(), model),
        None => format!(" AI assistant ({}) ", app.client.provider_name()),
    };
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            ACCENT
        } else {
            Color::DarkGray
        }))
        .title(title);

    let chat = chat_paragraph(app)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_title = if app.is_thinking() {
        " Waiting for reply... "
    } else {
        " Ask about the projects "
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(input_title);

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let (visible, cursor_col) = input_window(&app.chat_input, app.chat_cursor, inner_width);

    frame.render_widget(Paragraph::new(visible).block(input_block), input_area);

    if editing {
        let cursor_x = input_area.x + 1 + cursor_col;
        frame.set_cursor_position(Position::new(cursor_x, input_area.y + 1));
    }
}

/// The chat history as it is drawn, wrapped and unbordered.
fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for msg in app.conversation.messages() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                lines.extend(msg.text.lines().map(|line| Line::from(line.to_string())));
            }
            ChatRole::Model => {
                lines.push(Line::from(Span::styled(
                    "AI:",
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                )));
                lines.extend(msg.text.lines().map(parse_markdown_line));
            }
        }
        lines.push(Line::default());
    }

    if app.is_thinking() {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", thinking_dots(app)),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true })
}

/// Rendered height of the chat history at the given inner width.
pub fn chat_line_count(app: &App, width: u16) -> usize {
    chat_paragraph(app).line_count(width.max(1))
}

/// The slice of `input` that fits in `width` cells with the cursor visible,
/// and the cursor's column inside it. `cursor` counts chars.
fn input_window(input: &str, cursor: usize, width: usize) -> (String, u16) {
    let chars: Vec<char> = input.chars().collect();
    let cursor = cursor.min(chars.len());
    let cell = |c: &char| c.width().unwrap_or(0);

    // Leave one cell for the cursor itself
    let budget = width.saturating_sub(1);
    let mut start = 0;
    let mut before: usize = chars[..cursor].iter().map(cell).sum();
    while before > budget && start < cursor {
        before -= cell(&chars[start]);
        start += 1;
    }

    let mut used = 0;
    let visible: String = chars[start..]
        .iter()
        .take_while(|c| {
            used += cell(*c);
            used <= width
        })
        .collect();

    (visible, before.min(u16::MAX as usize) as u16)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match (app.screen, app.input_mode) {
        (Screen::Chat, InputMode::Editing) => "Enter send · Esc stop typing · ←/→ move",
        (Screen::Chat, InputMode::Normal) => "i type · j/k scroll · G bottom · M model · Tab next · q quit",
        (Screen::Projects, _) => "j/k select · Enter insight · Tab next · a ask AI · q quit",
        (Screen::About, _) => "j/k scroll · Tab next · a ask AI · q quit",
    };
    let mut spans = vec![Span::styled(format!(" {}", hints), Style::default().fg(Color::DarkGray))];
    if app.client.is_degraded() {
        spans.push(Span::styled("  [offline]", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_markdown_bold() {
        let line = parse_markdown_line("uses **ROS** and **YOLO**.");
        assert_eq!(span_texts(&line), vec!["uses ", "ROS", " and ", "YOLO", "."]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_markdown_unclosed_is_literal() {
        let line = parse_markdown_line("a **b");
        assert_eq!(span_texts(&line), vec!["a **b"]);
    }

    #[test]
    fn test_input_window_ascii() {
        assert_eq!(input_window("hello", 5, 20), ("hello".to_string(), 5));
        assert_eq!(input_window("hello world", 11, 6), ("world".to_string(), 5));
    }

    #[test]
    fn test_input_window_wide_chars() {
        // Each of these takes two cells
        assert_eq!(input_window("你好世界", 2, 20), ("你好世界".to_string(), 4));
        assert_eq!(input_window("你好世界你好", 6, 6), ("你好".to_string(), 4));
        assert_eq!(input_window("你好世界你好", 0, 6), ("你好世".to_string(), 0));
    }

    #[test]
    fn test_markdown_plain() {
        assert!(parse_markdown_line("").spans.is_empty());
        assert_eq!(span_texts(&parse_markdown_line("plain")), vec!["plain"]);
    }
}
