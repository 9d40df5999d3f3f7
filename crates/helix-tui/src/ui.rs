//! UI rendering

use crate::app::{sidebar_items, BrowserState, ChatApp, Focus, Mode, SidebarItem};
use crate::command::COMMANDS;
use helix_core::templates::{self, Suggestion};
use helix_core::{NoticeLevel, Sender};
use ratatui::layout::Flex;
use ratatui::{prelude::*, widgets::*};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the chat UI
pub fn render(frame: &mut Frame, app: &ChatApp) {
    let rows = Layout::vertical([
        Constraint::Length(2), // Header
        Constraint::Min(1),    // Panes
    ])
    .split(frame.area());

    render_header(frame, app, rows[0]);

    let panes = Layout::horizontal([
        Constraint::Length(24), // Sidebar
        Constraint::Fill(1),    // Chat
        Constraint::Fill(1),    // Workspace
    ])
    .split(rows[1]);

    render_sidebar(frame, app, panes[0]);
    render_chat(frame, app, panes[1]);
    render_workspace(frame, app, panes[2]);

    render_toasts(frame, app);
    if let Some(browser) = &app.browser {
        render_browser(frame, &browser.state, browser.selected);
    }
    if app.show_help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

    // Title
    let title = Line::from(vec![
        Span::styled("helix ", Style::new().green().bold()),
        Span::styled(format!("v{}", VERSION), Style::new().green()),
    ]);
    frame.render_widget(Paragraph::new(title), chunks[0]);

    // Status line
    let mode_indicator = match app.mode {
        Mode::Normal => Span::styled(" [NORMAL]", Style::new().blue().bold()),
        Mode::Insert => Span::styled(" [INSERT]", Style::new().green().bold()),
    };
    let focus = match app.focus {
        Focus::Chat => " chat",
        Focus::Workspace => " workspace",
        Focus::Sidebar => " sidebar",
    };

    let status_line = Line::from(vec![
        Span::styled(app.api_url.clone(), Style::new().cyan()),
        mode_indicator,
        Span::styled(focus, Style::new().gray()),
        Span::styled("  ? help", Style::new().gray().dim()),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[1]);
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::new().green()
        } else {
            Style::new().gray()
        })
        .title(title)
}

fn render_sidebar(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let focused = app.focus == Focus::Sidebar;
    let modes = app.session.search_modes();

    let items: Vec<ListItem> = sidebar_items()
        .into_iter()
        .map(|item| match item {
            SidebarItem::NewSequence => ListItem::new("+ New sequence"),
            SidebarItem::Chat => ListItem::new("  Chat"),
            SidebarItem::Sequences => ListItem::new("  Sequences"),
            SidebarItem::SearchMode(id) => {
                let label = helix_core::search_mode::label(id).unwrap_or(id);
                if modes.is_active(id) {
                    ListItem::new(format!("[x] {}", label)).style(Style::new().cyan())
                } else {
                    ListItem::new(format!("[ ] {}", label))
                }
            }
        })
        .collect();

    let list = List::new(items)
        .block(pane_block(" helix ", focused))
        .highlight_style(Style::new().reversed());

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.sidebar_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_chat(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let input_height = (app.input.lines().len() as u16 + 2).min(6);
    let autocomplete_height = app.get_autocomplete_display_height() as u16;

    let chunks = Layout::vertical([
        Constraint::Min(1),                      // Messages
        Constraint::Length(1),                   // Hints
        Constraint::Length(autocomplete_height), // Autocomplete
        Constraint::Length(input_height),        // Input
    ])
    .split(area);

    if app.session.show_welcome() {
        render_welcome(frame, app, chunks[0]);
    } else {
        render_messages(frame, app, chunks[0]);
    }
    render_hints(frame, app, chunks[1]);
    if autocomplete_height > 0 {
        render_autocomplete(frame, app, chunks[2]);
    }
    render_input(frame, app, chunks[3]);
}

fn render_welcome(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::new().gray());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::styled("Welcome to helix", Style::new().bold()),
        Line::styled(
            "Pick a starting point, or type your own request.",
            Style::new().gray(),
        ),
        Line::raw(""),
    ];

    for index in 0..templates::welcome_choice_count() {
        let Some(template) = templates::welcome_choice(index) else {
            continue;
        };
        let selected = index == app.welcome_index;
        let marker = if selected { "❯ " } else { "  " };
        let style = if selected {
            Style::new().green().bold()
        } else {
            Style::new().white()
        };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(template.title, style),
        ]));
        lines.push(Line::styled(
            format!("  {}", template.description),
            Style::new().gray().dim(),
        ));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_messages(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::new().gray());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Build message lines
    let mut lines: Vec<Line> = Vec::new();

    for (index, msg) in app.session.messages().iter().enumerate() {
        let (prefix, style) = match msg.sender {
            Sender::User => ("❯ ", Style::new().bold().white()),
            Sender::Assistant => ("  ", Style::new().white()),
            Sender::Bot => ("• ", Style::new().red().italic()),
        };
        let selected = app.mode == Mode::Normal && app.selected_message == Some(index);
        let number_style = if selected {
            Style::new().reversed()
        } else {
            Style::new().gray().dim()
        };

        let timestamp = msg.timestamp.format("%H:%M").to_string();

        // Header line even when the text is empty
        let mut text_lines: Vec<&str> = msg.text.lines().collect();
        if text_lines.is_empty() {
            text_lines.push("");
        }

        for (i, line) in text_lines.into_iter().enumerate() {
            let mut spans = vec![];

            if i == 0 {
                spans.push(Span::styled(format!("{:>3} ", index + 1), number_style));
                spans.push(Span::styled(format!("{} ", timestamp), Style::new().gray().dim()));
                spans.push(Span::styled(prefix, style));
            } else {
                spans.push(Span::raw("           ")); // Indent continuation
            }

            spans.push(Span::styled(line, style));
            lines.push(Line::from(spans));
        }

        if let Some(image) = &msg.image {
            lines.push(Line::styled(
                format!("           [image: {}]", image),
                Style::new().cyan(),
            ));
        }

        if let Some(reasoning) = &msg.reasoning {
            lines.push(Line::styled("           Reasoning", Style::new().yellow()));
            for line in reasoning.lines() {
                lines.push(Line::styled(
                    format!("           {}", line),
                    Style::new().gray().italic(),
                ));
            }
        }

        if !msg.citations.is_empty() {
            lines.push(Line::styled("           Sources", Style::new().yellow()));
            for (n, citation) in msg.citations.iter().enumerate() {
                lines.push(Line::from(vec![
                    Span::styled(format!("           [{}] ", n + 1), Style::new().gray()),
                    Span::styled(citation.title.clone(), Style::new().white()),
                    Span::styled(format!("  {}", citation.url), Style::new().blue().underlined()),
                ]));
            }
        }

        lines.push(Line::raw("")); // Spacing
    }

    if app.session.is_loading() {
        let frame_char = SPINNER[app.tick % SPINNER.len()];
        lines.push(Line::styled(
            format!("    {} Generating response...", frame_char),
            Style::new().gray().italic(),
        ));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });

    // Calculate scroll over wrapped rows
    let visible_height = inner.height as usize;
    let total_lines = paragraph.line_count(inner.width);

    let scroll = if total_lines > visible_height {
        let max_scroll = total_lines - visible_height;
        max_scroll.saturating_sub(app.scroll_offset)
    } else {
        0
    };

    let paragraph = paragraph.scroll((scroll.min(u16::MAX as usize) as u16, 0));

    frame.render_widget(paragraph, inner);
}

fn render_hints(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let mut spans = vec![];
    for suggestion in Suggestion::ALL {
        spans.push(Span::styled(suggestion.command(), Style::new().cyan()));
        spans.push(Span::styled(
            format!(" {}  ", suggestion.label()),
            Style::new().gray(),
        ));
    }
    if let Some(image) = &app.attachment {
        spans.push(Span::styled(
            format!("[image: {}]", image.file_name),
            Style::new().yellow(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_autocomplete(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let filtered = app.filtered_commands();
    let items: Vec<ListItem> = filtered
        .iter()
        .map(|(cmd, desc)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<12}", cmd), Style::new().cyan()),
                Span::styled(*desc, Style::new().gray()),
            ]))
        })
        .collect();

    let list = List::new(items).highlight_style(Style::new().reversed());
    let mut state = ListState::default();
    state.select(Some(app.autocomplete_index.min(filtered.len().saturating_sub(1))));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_input(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let focused = app.focus == Focus::Chat;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(match (focused, app.mode) {
            (true, Mode::Insert) => Style::new().green(),
            _ => Style::new().gray(),
        })
        .title(match app.mode {
            Mode::Insert => " Message (Enter to send) ",
            Mode::Normal => " Press 'i' to type ",
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

fn render_workspace(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let focused = app.focus == Focus::Workspace;
    let block = pane_block(" Workspace ", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Tabs
        Constraint::Length(1), // Save status
        Constraint::Min(1),    // Editor
    ])
    .split(inner);

    let workspace = app.session.workspace();
    let titles: Vec<Line> = workspace
        .sequences()
        .iter()
        .map(|doc| {
            if doc.is_dirty() {
                Line::from(format!("{}*", doc.name()))
            } else {
                Line::from(doc.name().to_string())
            }
        })
        .collect();
    let tabs = Tabs::new(titles)
        .select(workspace.active_index().unwrap_or(0))
        .highlight_style(Style::new().green().bold())
        .divider("│");
    frame.render_widget(tabs, chunks[0]);

    let status = if workspace.is_saving() {
        Span::styled("Saving...", Style::new().yellow())
    } else if workspace.active().is_some_and(|doc| doc.is_dirty()) {
        Span::styled("Unsaved changes (Ctrl+S to save)", Style::new().gray())
    } else {
        Span::styled("Saved", Style::new().gray().dim())
    };
    frame.render_widget(Paragraph::new(Line::from(status)), chunks[1]);

    frame.render_widget(&app.editor, chunks[2]);
}

fn render_toasts(frame: &mut Frame, app: &ChatApp) {
    let area = frame.area();
    let width = 44.min(area.width);
    let mut y = area.y + 1;

    for toast in app.toasts.iter() {
        if y + 3 > area.bottom() {
            break;
        }
        let rect = Rect::new(area.right().saturating_sub(width + 1), y, width, 3);
        let color = match toast.notice.level {
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::new().fg(color));
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(toast.notice.text.as_str()).block(block),
            rect,
        );
        y += 3;
    }
}

fn render_browser(frame: &mut Frame, state: &BrowserState, selected: usize) {
    let area = centered(frame.area(), 80, 60);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::new().cyan())
        .title(" Sequences (Enter open, r reload, Esc close) ");

    match state {
        BrowserState::Loading => {
            frame.render_widget(
                Paragraph::new("Loading sequences...").block(block),
                area,
            );
        }
        BrowserState::Failed(e) => {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::styled("Failed to fetch sequences", Style::new().red()),
                    Line::styled(e.as_str(), Style::new().gray()),
                ])
                .wrap(Wrap { trim: false })
                .block(block),
                area,
            );
        }
        BrowserState::Loaded(sequences) if sequences.is_empty() => {
            frame.render_widget(Paragraph::new("No saved sequences").block(block), area);
        }
        BrowserState::Loaded(sequences) => {
            let rows = sequences.iter().map(|seq| {
                Row::new(vec![
                    seq.name.clone(),
                    format_date(seq.created_at),
                    format_date(seq.updated_at),
                ])
            });
            let table = Table::new(
                rows,
                [
                    Constraint::Fill(1),
                    Constraint::Length(14),
                    Constraint::Length(14),
                ],
            )
            .header(Row::new(vec!["Name", "Created", "Updated"]).style(Style::new().bold()))
            .row_highlight_style(Style::new().reversed())
            .block(block);

            let mut table_state = TableState::default().with_selected(Some(selected));
            frame.render_stateful_widget(table, area, &mut table_state);
        }
    }
}

fn render_help(frame: &mut Frame) {
    let area = centered(frame.area(), 70, 80);
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::styled("Commands", Style::new().bold())];
    for (cmd, desc) in COMMANDS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", cmd), Style::new().cyan()),
            Span::raw(*desc),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("Keys", Style::new().bold()));
    for (key, desc) in [
        ("Tab", "Cycle focus: chat, workspace, sidebar"),
        ("Esc", "Clear input, then normal mode"),
        ("Ctrl+S", "Save the active sequence"),
        ("Alt+C", "Copy the active sequence"),
        ("Alt+N", "New sequence"),
        ("Alt+←/→", "Switch sequence tab"),
        ("[ ]", "Select message (normal mode)"),
        ("r y + -", "Regenerate, copy, rate selected message"),
        ("1-4", "Toggle search modes"),
        ("o", "Browse saved sequences"),
        ("q", "Quit (normal mode)"),
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", key), Style::new().green()),
            Span::raw(desc),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::new().cyan())
        .title(" Help (any key to close) ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn format_date(date: Option<chrono::NaiveDateTime>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Rect covering the given percentages of `area`, centered
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}
