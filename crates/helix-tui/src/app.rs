//! Chat application state and event handling

use crate::clipboard::Clipboard;
use crate::command::{self, SlashCommand};
use crate::toast::Toasts;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use helix_api::BackendClient;
use helix_core::search_mode::{self, SEARCH_MODES};
use helix_core::templates;
use helix_core::{
    ChatRequest, ChatResponse, Config, ImageAttachment, Notice, Sender, Sequence, Session,
    TurnOutcome,
};
use ratatui::prelude::*;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tui_textarea::TextArea;

/// UI tick: toast expiry and the pending spinner
const TICK: Duration = Duration::from_millis(120);

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Chat,
    Workspace,
    Sidebar,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Chat => Self::Workspace,
            Self::Workspace => Self::Sidebar,
            Self::Sidebar => Self::Chat,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Chat => Self::Sidebar,
            Self::Workspace => Self::Chat,
            Self::Sidebar => Self::Workspace,
        }
    }
}

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Insert,
    Normal,
}

/// Sidebar entries, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarItem {
    NewSequence,
    Chat,
    Sequences,
    SearchMode(&'static str),
}

pub fn sidebar_items() -> Vec<SidebarItem> {
    let mut items = vec![
        SidebarItem::NewSequence,
        SidebarItem::Chat,
        SidebarItem::Sequences,
    ];
    items.extend(SEARCH_MODES.iter().map(|(id, _)| SidebarItem::SearchMode(*id)));
    items
}

/// Saved-sequence browser overlay
#[derive(Debug)]
pub struct SequenceBrowser {
    pub state: BrowserState,
    pub selected: usize,
}

#[derive(Debug)]
pub enum BrowserState {
    Loading,
    Loaded(Vec<Sequence>),
    Failed(String),
}

/// Results of spawned backend calls
#[derive(Debug)]
enum BackendEvent {
    Chat {
        ticket: u64,
        result: Result<ChatResponse, String>,
    },
    Saved(Result<Sequence, String>),
    Sequences(Result<Vec<Sequence>, String>),
}

/// Chat application
pub struct ChatApp {
    /// Conversation, sequences and search modes
    pub session: Session,
    /// Backend client
    client: BackendClient,
    /// Chat input
    pub input: TextArea<'static>,
    /// Workspace editor buffer
    pub editor: TextArea<'static>,
    /// Workspace revision the editor was loaded from
    editor_revision: u64,
    /// Focused pane
    pub focus: Focus,
    /// Current mode
    pub mode: Mode,
    /// Scroll offset (from bottom)
    pub scroll_offset: usize,
    /// Autocomplete selection index
    pub autocomplete_index: usize,
    /// Locked autocomplete height (set when autocomplete opens)
    pub autocomplete_height: Option<usize>,
    /// Image waiting to go out with the next send
    pub attachment: Option<ImageAttachment>,
    /// Message highlighted in normal mode
    pub selected_message: Option<usize>,
    /// Highlighted welcome template
    pub welcome_index: usize,
    /// Highlighted sidebar entry
    pub sidebar_index: usize,
    pub browser: Option<SequenceBrowser>,
    pub show_help: bool,
    pub toasts: Toasts,
    /// Spinner frame counter
    pub tick: usize,
    /// Backend address shown in the header
    pub api_url: String,
    clipboard: Clipboard,
    event_tx: mpsc::Sender<BackendEvent>,
    event_rx: mpsc::Receiver<BackendEvent>,
}

impl ChatApp {
    /// Create new chat app
    pub fn new(config: &Config, client: BackendClient) -> Self {
        let (event_tx, event_rx) = mpsc::channel(32);

        let mut input = TextArea::default();
        input.set_cursor_line_style(Style::default());
        input.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        input.set_placeholder_text("Ask anything...");

        let session = Session::from_config(config);
        let editor = new_editor(session.workspace().active_content());
        let editor_revision = session.workspace().external_revision();

        Self {
            session,
            client,
            input,
            editor,
            editor_revision,
            focus: Focus::Chat,
            mode: Mode::Insert,
            scroll_offset: 0,
            autocomplete_index: 0,
            autocomplete_height: None,
            attachment: None,
            selected_message: None,
            welcome_index: 0,
            sidebar_index: 0,
            browser: None,
            show_help: false,
            toasts: Toasts::default(),
            tick: 0,
            api_url: config.api_url.clone(),
            clipboard: Clipboard::default(),
            event_tx,
            event_rx,
        }
    }

    /// Run the TUI event loop
    pub async fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> anyhow::Result<()> {
        // Enable mouse capture
        crossterm::execute!(std::io::stdout(), crossterm::event::EnableMouseCapture)?;

        let result = self.event_loop(terminal).await;

        // Disable mouse capture
        crossterm::execute!(std::io::stdout(), crossterm::event::DisableMouseCapture)?;

        result
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<impl Backend>) -> anyhow::Result<()> {
        let mut event_stream = crossterm::event::EventStream::new();
        let mut ticker = tokio::time::interval(TICK);
        use futures::StreamExt;

        loop {
            self.sync_editor();
            terminal.draw(|frame| crate::ui::render(frame, self))?;

            tokio::select! {
                // Terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key) {
                                break;
                            }
                        }
                        Some(Ok(Event::Mouse(mouse))) => self.handle_mouse(mouse),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => break,
                    }
                }
                // Backend completions
                Some(event) = self.event_rx.recv() => {
                    self.handle_backend_event(event);
                }
                _ = ticker.tick() => {
                    if self.session.is_loading() {
                        self.tick = self.tick.wrapping_add(1);
                    }
                    self.toasts.expire(Instant::now());
                }
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Backend calls
    // ─────────────────────────────────────────────────────────────

    fn dispatch_chat(&self, request: ChatRequest) {
        let client = self.client.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = client.chat(&request).await.map_err(|e| e.to_string());
            let _ = tx
                .send(BackendEvent::Chat {
                    ticket: request.ticket,
                    result,
                })
                .await;
        });
    }

    /// Start the next queued save if none is in flight
    fn flush_saves(&mut self) {
        let Some(request) = self.session.workspace_mut().next_save() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = client
                .save_sequence(&request.draft)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(BackendEvent::Saved(result)).await;
        });
    }

    fn load_sequences(&mut self) {
        self.browser = Some(SequenceBrowser {
            state: BrowserState::Loading,
            selected: 0,
        });
        let client = self.client.clone();
        let tx = self.event_tx.clone();
        let user_id = self.session.user_id().to_string();
        tokio::spawn(async move {
            let result = client
                .list_user_sequences(&user_id)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(BackendEvent::Sequences(result)).await;
        });
    }

    fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Chat { ticket, result } => {
                let outcome = self.session.complete(ticket, result);
                if let TurnOutcome::Failed { notice: Some(notice) } = outcome {
                    self.toasts.push(notice);
                }
                self.clamp_selection();
                self.scroll_to_bottom();
            }
            BackendEvent::Saved(result) => {
                if let Some(notice) = self.session.workspace_mut().complete_save(result) {
                    self.toasts.push(notice);
                }
                self.flush_saves();
            }
            BackendEvent::Sequences(result) => {
                if let Some(browser) = self.browser.as_mut() {
                    browser.state = match result {
                        Ok(sequences) => BrowserState::Loaded(sequences),
                        Err(e) => {
                            tracing::warn!("Failed to fetch sequences: {}", e);
                            BrowserState::Failed(e)
                        }
                    };
                    browser.selected = 0;
                }
            }
        }
    }

    /// Reload the editor when the active sequence changed outside it
    fn sync_editor(&mut self) {
        let revision = self.session.workspace().external_revision();
        if revision != self.editor_revision {
            self.editor = new_editor(self.session.workspace().active_content());
            self.editor_revision = revision;
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────

    /// Send text (with any pending attachment) as a user turn
    fn send_text(&mut self, text: &str) {
        if self.session.is_loading() {
            return;
        }
        if text.trim().is_empty() && self.attachment.is_none() {
            return;
        }

        let image = self.attachment.take();
        if let Some(request) = self.session.send(text, image) {
            self.clear_input();
            self.selected_message = None;
            self.scroll_to_bottom();
            self.dispatch_chat(request);
        }
    }

    fn send_template(&mut self, index: usize) {
        if let Some(template) = templates::welcome_choice(index) {
            self.send_text(template.prompt);
        }
    }

    fn regenerate(&mut self, number: Option<usize>) {
        let messages = self.session.messages();
        let target = match number {
            Some(n) => messages.get(n - 1),
            None => self
                .selected_message
                .and_then(|i| messages.get(i))
                .filter(|m| m.sender == Sender::Assistant)
                .or_else(|| messages.iter().rev().find(|m| m.sender == Sender::Assistant)),
        };

        let Some(message) = target else {
            self.toasts.push(Notice::error("Nothing to regenerate"));
            return;
        };
        if message.sender != Sender::Assistant {
            self.toasts
                .push(Notice::error("Only assistant responses can be regenerated"));
            return;
        }

        let id = message.id;
        if let Some(request) = self.session.regenerate(id) {
            self.dispatch_chat(request);
        }
    }

    fn save(&mut self) {
        if self.session.request_save() {
            self.flush_saves();
        }
    }

    fn new_sequence(&mut self) {
        self.session.workspace_mut().new_sequence();
        self.focus = Focus::Workspace;
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        match self.clipboard.copy(text) {
            Ok(()) => self.toasts.push(Notice::success("Copied to clipboard")),
            Err(e) => {
                tracing::warn!("Clipboard unavailable: {}", e);
                self.toasts.push(Notice::error("Failed to copy to clipboard"));
            }
        }
    }

    fn copy_sequence(&mut self) {
        let content = self.session.workspace().active_content().to_string();
        self.copy_to_clipboard(&content);
    }

    fn copy_selected_message(&mut self) {
        let text = self
            .selected_message
            .and_then(|i| self.session.messages().get(i))
            .map(|m| m.text.clone());
        if let Some(text) = text {
            self.copy_to_clipboard(&text);
        }
    }

    fn feedback(&mut self, positive: bool) {
        if let Some(message) = self
            .selected_message
            .and_then(|i| self.session.messages().get(i))
        {
            tracing::info!(message_id = message.id, positive, "message feedback");
            self.toasts.push(Notice::success("Thanks for your feedback!"));
        }
    }

    fn toggle_mode(&mut self, id: &str) {
        let Some(label) = search_mode::label(id) else {
            self.toasts
                .push(Notice::error(format!("Unknown search mode: {}", id)));
            return;
        };
        let active = self.session.toggle_search_mode(id);
        tracing::debug!("search mode {} -> {}", id, active);
        let state = if active { "on" } else { "off" };
        self.toasts.push(Notice::success(format!("{}: {}", label, state)));
    }

    fn attach(&mut self, path: Option<String>) {
        let Some(path) = path else {
            self.attachment = None;
            return;
        };
        match ImageAttachment::load(ImageAttachment::resolve_path(&path)) {
            Ok(image) => {
                self.toasts
                    .push(Notice::success(format!("Attached {}", image.file_name)));
                self.attachment = Some(image);
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                self.toasts.push(Notice::error(format!("Could not read {}", path)));
            }
        }
    }

    fn open_selected_sequence(&mut self) {
        let Some(browser) = self.browser.as_ref() else {
            return;
        };
        let BrowserState::Loaded(sequences) = &browser.state else {
            return;
        };
        let Some(sequence) = sequences.get(browser.selected).cloned() else {
            return;
        };

        let name = sequence.name.clone();
        if self.session.open_sequence(sequence) {
            self.browser = None;
            self.focus = Focus::Chat;
            self.selected_message = None;
            self.scroll_to_bottom();
            self.toasts.push(Notice::success(format!("Opened {}", name)));
        } else {
            self.toasts
                .push(Notice::error("Wait for the current response to finish"));
        }
    }

    /// Execute a slash command, returns true if should quit
    fn handle_command(&mut self, input: &str) -> bool {
        let parsed = command::parse(input);
        if !matches!(parsed, SlashCommand::Suggest(..)) {
            self.clear_input();
        }

        match parsed {
            SlashCommand::Suggest(suggestion, rest) => {
                let text = suggestion.apply(&rest);
                self.send_text(&text);
            }
            SlashCommand::Image(path) => self.attach(path),
            SlashCommand::Regenerate(number) => self.regenerate(number),
            SlashCommand::Mode(id) => self.toggle_mode(&id),
            SlashCommand::NewSequence => self.new_sequence(),
            SlashCommand::Save => self.save(),
            SlashCommand::Copy => self.copy_sequence(),
            SlashCommand::Sequences => self.load_sequences(),
            SlashCommand::Help => self.show_help = true,
            SlashCommand::Exit => return true,
            SlashCommand::Usage(usage) => {
                self.toasts.push(Notice::error(format!("Usage: {}", usage)));
            }
            SlashCommand::Unknown(cmd) => {
                self.toasts.push(Notice::error(format!(
                    "Unknown command: {}. Type /help for commands.",
                    cmd
                )));
            }
        }
        false
    }

    // ─────────────────────────────────────────────────────────────
    // Keys
    // ─────────────────────────────────────────────────────────────

    /// Handle key event, returns true if should quit
    fn handle_key(&mut self, key: event::KeyEvent) -> bool {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            return true;
        }
        if self.browser.is_some() {
            self.handle_browser_key(key);
            return false;
        }
        if self.show_help {
            self.show_help = false;
            return false;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
                self.save();
                return false;
            }
            (KeyCode::Char('c'), KeyModifiers::ALT) => {
                self.copy_sequence();
                return false;
            }
            (KeyCode::Char('n'), KeyModifiers::ALT) => {
                self.new_sequence();
                return false;
            }
            (KeyCode::Left, KeyModifiers::ALT) => {
                self.session.workspace_mut().select_previous();
                return false;
            }
            (KeyCode::Right, KeyModifiers::ALT) => {
                self.session.workspace_mut().select_next();
                return false;
            }
            (KeyCode::Tab, KeyModifiers::NONE)
                if !(self.focus == Focus::Chat && self.show_autocomplete()) =>
            {
                self.focus = self.focus.next();
                return false;
            }
            (KeyCode::BackTab, _) => {
                self.focus = self.focus.previous();
                return false;
            }
            _ => {}
        }

        match self.focus {
            Focus::Sidebar => {
                self.handle_sidebar_key(key);
                false
            }
            Focus::Workspace => self.handle_workspace_key(key),
            Focus::Chat => match self.mode {
                Mode::Insert => self.handle_insert_key(key),
                Mode::Normal => self.handle_normal_key(key),
            },
        }
    }

    fn handle_insert_key(&mut self, key: event::KeyEvent) -> bool {
        let showing_autocomplete = self.show_autocomplete();
        let filtered_count = if showing_autocomplete {
            self.filtered_commands().len()
        } else {
            0
        };
        let choosing_template = self.session.show_welcome() && self.input.is_empty();

        match (key.code, key.modifiers) {
            // Tab to complete
            (KeyCode::Tab, KeyModifiers::NONE) if showing_autocomplete && filtered_count > 0 => {
                self.apply_autocomplete();
            }
            // Navigate autocomplete up
            (KeyCode::Up, KeyModifiers::NONE) if showing_autocomplete && filtered_count > 0 => {
                if self.autocomplete_index > 0 {
                    self.autocomplete_index -= 1;
                } else {
                    self.autocomplete_index = filtered_count - 1;
                }
            }
            // Navigate autocomplete down
            (KeyCode::Down, KeyModifiers::NONE) if showing_autocomplete && filtered_count > 0 => {
                if self.autocomplete_index < filtered_count - 1 {
                    self.autocomplete_index += 1;
                } else {
                    self.autocomplete_index = 0;
                }
            }
            // Welcome templates
            (KeyCode::Up, KeyModifiers::NONE) if choosing_template => {
                self.welcome_index = self.welcome_index.saturating_sub(1);
            }
            (KeyCode::Down, KeyModifiers::NONE) if choosing_template => {
                self.welcome_index = (self.welcome_index + 1).min(templates::welcome_choice_count() - 1);
            }
            // Submit
            (KeyCode::Enter, KeyModifiers::NONE) => {
                let content = self.input_text();
                if content.starts_with('/') {
                    return self.handle_command(&content);
                }
                if choosing_template && self.attachment.is_none() {
                    self.send_template(self.welcome_index);
                } else {
                    self.send_text(&content);
                }
            }
            // Multi-line
            (KeyCode::Enter, KeyModifiers::SHIFT) => {
                self.input.insert_newline();
            }
            // Clear or switch mode
            (KeyCode::Esc, _) => {
                if self.input.is_empty() {
                    self.mode = Mode::Normal;
                } else {
                    self.clear_input();
                }
                self.autocomplete_index = 0;
                self.autocomplete_height = None;
            }
            // Scroll (half page)
            (KeyCode::Up, KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => {
                self.scroll_up(15);
            }
            (KeyCode::Down, KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => {
                self.scroll_down(15);
            }
            // Pass to textarea
            _ => {
                self.input.input(key);
                // Reset autocomplete index when typing
                self.autocomplete_index = 0;
                // Update autocomplete state
                self.update_autocomplete_state();
            }
        }
        false
    }

    fn handle_normal_key(&mut self, key: event::KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('i') | KeyCode::Char('a') => self.mode = Mode::Insert,
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') => self.scroll_down(1),
            KeyCode::Char('k') => self.scroll_up(1),
            KeyCode::Char('G') => self.scroll_to_bottom(),
            KeyCode::Char('g') => self.scroll_to_top(),
            KeyCode::Char('[') => self.select_message(-1),
            KeyCode::Char(']') => self.select_message(1),
            KeyCode::Char('r') => self.regenerate(None),
            KeyCode::Char('y') => self.copy_selected_message(),
            KeyCode::Char('+') => self.feedback(true),
            KeyCode::Char('-') => self.feedback(false),
            KeyCode::Char('n') => self.new_sequence(),
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('o') => self.load_sequences(),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Some((id, _)) = SEARCH_MODES.get(index) {
                    self.toggle_mode(id);
                }
            }
            KeyCode::Enter if self.session.show_welcome() => {
                self.send_template(self.welcome_index);
            }
            _ => {}
        }
        false
    }

    fn handle_workspace_key(&mut self, key: event::KeyEvent) -> bool {
        match self.mode {
            Mode::Normal => match key.code {
                KeyCode::Char('i') | KeyCode::Char('a') => self.mode = Mode::Insert,
                KeyCode::Char('q') => return true,
                KeyCode::Char('h') => self.session.workspace_mut().select_previous(),
                KeyCode::Char('l') => self.session.workspace_mut().select_next(),
                KeyCode::Char('s') => self.save(),
                KeyCode::Char('y') => self.copy_sequence(),
                KeyCode::Char('n') => self.new_sequence(),
                _ => {}
            },
            Mode::Insert => {
                if key.code == KeyCode::Esc {
                    self.mode = Mode::Normal;
                } else if self.editor.input(key) {
                    let content = self.editor.lines().join("\n");
                    self.session.workspace_mut().edit_active(content);
                }
            }
        }
        false
    }

    fn handle_sidebar_key(&mut self, key: event::KeyEvent) {
        let items = sidebar_items();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.sidebar_index = self.sidebar_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.sidebar_index = (self.sidebar_index + 1).min(items.len() - 1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => match items.get(self.sidebar_index) {
                Some(SidebarItem::NewSequence) => self.new_sequence(),
                Some(SidebarItem::Chat) => self.focus = Focus::Chat,
                Some(SidebarItem::Sequences) => self.load_sequences(),
                Some(SidebarItem::SearchMode(id)) => self.toggle_mode(id),
                None => {}
            },
            KeyCode::Esc => self.focus = Focus::Chat,
            _ => {}
        }
    }

    fn handle_browser_key(&mut self, key: event::KeyEvent) {
        let count = match self.browser.as_ref().map(|b| &b.state) {
            Some(BrowserState::Loaded(sequences)) => sequences.len(),
            _ => 0,
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.browser = None,
            KeyCode::Char('r') => self.load_sequences(),
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(browser) = self.browser.as_mut() {
                    browser.selected = browser.selected.saturating_sub(1);
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(browser) = self.browser.as_mut() {
                    browser.selected = (browser.selected + 1).min(count.saturating_sub(1));
                }
            }
            KeyCode::Enter => self.open_selected_sequence(),
            _ => {}
        }
    }

    /// Handle mouse event
    fn handle_mouse(&mut self, mouse: event::MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_up(2),
            MouseEventKind::ScrollDown => self.scroll_down(2),
            _ => {}
        }
    }

    fn select_message(&mut self, delta: isize) {
        let len = self.session.messages().len();
        if len == 0 {
            self.selected_message = None;
            return;
        }
        let current = self.selected_message.unwrap_or(len) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.selected_message = Some(next as usize);
    }

    fn clamp_selection(&mut self) {
        let len = self.session.messages().len();
        if let Some(i) = self.selected_message {
            if i >= len {
                self.selected_message = len.checked_sub(1);
            }
        }
    }

    fn scroll_up(&mut self, n: usize) {
        // Increase offset from bottom (shows older content)
        self.scroll_offset = self.scroll_offset.saturating_add(n);
    }

    fn scroll_down(&mut self, n: usize) {
        // Decrease offset from bottom (shows newer content)
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    fn scroll_to_top(&mut self) {
        // Large value will be clamped in render
        self.scroll_offset = usize::MAX / 2;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    fn clear_input(&mut self) {
        self.input.select_all();
        self.input.cut();
        self.autocomplete_index = 0;
        self.autocomplete_height = None;
    }

    /// Get current input text
    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    /// Check if autocomplete should be shown
    pub fn show_autocomplete(&self) -> bool {
        let text = self.input_text();
        text.starts_with('/') && !text.contains(' ') && !self.filtered_commands().is_empty()
    }

    /// Get filtered commands matching current input
    pub fn filtered_commands(&self) -> Vec<(&'static str, &'static str)> {
        command::matching(&self.input_text())
    }

    /// Apply autocomplete selection
    fn apply_autocomplete(&mut self) {
        let filtered = self.filtered_commands();
        if let Some((cmd, _)) = filtered.get(self.autocomplete_index) {
            self.input.select_all();
            self.input.cut();
            self.input.insert_str(cmd);
            self.input.insert_char(' ');
            self.autocomplete_index = 0;
            self.autocomplete_height = None; // Close autocomplete
        }
    }

    /// Update autocomplete height state
    pub fn update_autocomplete_state(&mut self) {
        if self.show_autocomplete() {
            // Lock height when first showing autocomplete
            if self.autocomplete_height.is_none() {
                let count = self.filtered_commands().len();
                self.autocomplete_height = Some(count.min(6));
            }
        } else {
            // Reset when autocomplete closes
            self.autocomplete_height = None;
        }
    }

    /// Get the display height for autocomplete
    pub fn get_autocomplete_display_height(&self) -> usize {
        self.autocomplete_height.unwrap_or(0)
    }
}

/// Editor pre-filled with sequence content
fn new_editor(content: &str) -> TextArea<'static> {
    let mut editor = TextArea::new(content.split('\n').map(String::from).collect());
    editor.set_cursor_line_style(Style::default());
    editor.set_placeholder_text("Start typing your sequence...");
    editor
}
