//! Chat session: the authoritative message list and its backend turns
//!
//! The session never performs I/O. `send` and `regenerate` return the
//! request to perform; the caller hands the result back via `complete`.
//! At most one turn is in flight; completions carry a ticket so a late
//! answer to an abandoned request is dropped.

use crate::config::Config;
use crate::search_mode::SearchModes;
use crate::templates;
use crate::types::{
    ChatReply, ChatRequest, ChatResponse, ImageAttachment, Message, Notice, Sender, Sequence,
    TranscriptEntry,
};
use crate::workspace::Workspace;
use chrono::Local;

/// Inline reply appended when a send fails
pub const SEND_ERROR_TEXT: &str = "Sorry, there was an error processing your request.";

/// Toast raised when a regenerate fails
pub const REGENERATE_ERROR_TEXT: &str = "Failed to regenerate response";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnKind {
    Send,
    Regenerate { message_id: u64 },
}

#[derive(Debug, Clone, Copy)]
struct PendingTurn {
    ticket: u64,
    kind: TurnKind,
}

/// What a completion did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Assistant reply appended after a send
    Appended { workspace_updated: bool },
    /// Assistant reply replaced the regenerated tail
    Replaced { workspace_updated: bool },
    /// The request failed; the notice (if any) should be shown
    Failed { notice: Option<Notice> },
    /// Ticket did not match the in-flight turn
    Stale,
}

/// Chat session state
#[derive(Debug)]
pub struct Session {
    messages: Vec<Message>,
    next_message_id: u64,
    next_ticket: u64,
    pending: Option<PendingTurn>,
    search_modes: SearchModes,
    workspace: Workspace,
    user_id: String,
    org_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let org_id = org_id.into();

        Self {
            messages: Vec::new(),
            next_message_id: 1,
            next_ticket: 1,
            pending: None,
            search_modes: SearchModes::new(),
            workspace: Workspace::new(user_id.clone(), org_id.clone()),
            user_id,
            org_id,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.user_id.clone(), config.org_id.clone())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Zero state: nothing said and nothing pending
    pub fn show_welcome(&self) -> bool {
        self.messages.is_empty() && !self.is_loading()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    pub fn search_modes(&self) -> &SearchModes {
        &self.search_modes
    }

    /// Flip a search mode; returns whether it is now active
    pub fn toggle_search_mode(&mut self, id: &str) -> bool {
        self.search_modes.toggle(id)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    /// `{text, sender}` history of the whole conversation
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.messages.iter().map(Message::transcript_entry).collect()
    }

    fn allocate_message_id(&mut self) -> u64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    fn begin_turn(
        &mut self,
        kind: TurnKind,
        messages: Vec<TranscriptEntry>,
        image: Option<ImageAttachment>,
    ) -> ChatRequest {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending = Some(PendingTurn { ticket, kind });

        ChatRequest {
            ticket,
            endpoint: self.search_modes.endpoint(),
            workspace: self.workspace.active_id().to_string(),
            user_id: self.user_id.clone(),
            org_id: self.org_id.clone(),
            messages,
            image,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Turns
    // ─────────────────────────────────────────────────────────────

    /// Append the user's message and prepare the chat request
    pub fn send(&mut self, text: &str, image: Option<ImageAttachment>) -> Option<ChatRequest> {
        if self.is_loading() || (text.trim().is_empty() && image.is_none()) {
            return None;
        }

        let id = self.allocate_message_id();
        self.messages.push(Message {
            id,
            sender: Sender::User,
            text: text.to_string(),
            image: image.as_ref().map(|i| i.file_name.clone()),
            citations: Vec::new(),
            reasoning: None,
            email_sequence: None,
            timestamp: Local::now(),
        });

        let history = self.transcript();
        let request = self.begin_turn(TurnKind::Send, history, image);
        tracing::debug!(
            "Chat turn {} queued with {} messages",
            request.ticket,
            request.messages.len()
        );
        Some(request)
    }

    /// Send a welcome template by position
    pub fn send_template(&mut self, index: usize) -> Option<ChatRequest> {
        let template = templates::welcome_choice(index)?;
        self.send(template.prompt, None)
    }

    /// Re-request an assistant turn, discarding it and everything after
    pub fn regenerate(&mut self, message_id: u64) -> Option<ChatRequest> {
        if self.is_loading() {
            return None;
        }
        let index = self.messages.iter().position(|m| m.id == message_id)?;
        if self.messages[index].sender != Sender::Assistant {
            return None;
        }

        let history = self.messages[..index]
            .iter()
            .map(Message::transcript_entry)
            .collect();
        Some(self.begin_turn(TurnKind::Regenerate { message_id }, history, None))
    }

    /// Apply the result of a chat request
    pub fn complete(&mut self, ticket: u64, result: Result<ChatResponse, String>) -> TurnOutcome {
        let Some(pending) = self.pending.filter(|p| p.ticket == ticket) else {
            tracing::debug!("Ignoring stale chat completion {}", ticket);
            return TurnOutcome::Stale;
        };
        self.pending = None;

        match (pending.kind, result) {
            (TurnKind::Send, Ok(response)) => {
                let workspace_updated = self.apply_reply_to_workspace(&response.message);
                let reply = self.assistant_message(response.message);
                self.messages.push(reply);
                TurnOutcome::Appended { workspace_updated }
            }
            (TurnKind::Send, Err(e)) => {
                tracing::error!("Chat request failed: {}", e);
                let id = self.allocate_message_id();
                self.messages.push(Message {
                    id,
                    sender: Sender::Bot,
                    text: SEND_ERROR_TEXT.to_string(),
                    image: None,
                    citations: Vec::new(),
                    reasoning: None,
                    email_sequence: None,
                    timestamp: Local::now(),
                });
                TurnOutcome::Failed { notice: None }
            }
            (TurnKind::Regenerate { message_id }, Ok(response)) => {
                let Some(index) = self.messages.iter().position(|m| m.id == message_id) else {
                    tracing::warn!("Regenerated message {} no longer exists", message_id);
                    return TurnOutcome::Stale;
                };
                let workspace_updated = self.apply_reply_to_workspace(&response.message);
                let reply = self.assistant_message(response.message);
                self.messages.truncate(index);
                self.messages.push(reply);
                TurnOutcome::Replaced { workspace_updated }
            }
            (TurnKind::Regenerate { .. }, Err(e)) => {
                tracing::error!("Regenerate failed: {}", e);
                TurnOutcome::Failed {
                    notice: Some(Notice::error(REGENERATE_ERROR_TEXT)),
                }
            }
        }
    }

    fn assistant_message(&mut self, reply: ChatReply) -> Message {
        Message {
            id: self.allocate_message_id(),
            sender: Sender::Assistant,
            text: reply.text,
            image: None,
            citations: reply.citations.unwrap_or_default(),
            reasoning: reply.reasoning.filter(|r| !r.is_empty()),
            email_sequence: reply.email_sequence,
            timestamp: Local::now(),
        }
    }

    fn apply_reply_to_workspace(&mut self, reply: &ChatReply) -> bool {
        match &reply.email_sequence {
            Some(seq) if seq.should_update_workspace => {
                self.workspace.apply_generated(seq.content.clone());
                true
            }
            _ => false,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Sequences
    // ─────────────────────────────────────────────────────────────

    /// Load a stored sequence and its conversation
    pub fn open_sequence(&mut self, sequence: Sequence) -> bool {
        if self.is_loading() {
            return false;
        }

        let id = sequence.id.clone();
        let conversation = sequence.messages.clone();
        self.workspace.merge_remote([sequence]);
        self.workspace.select(&id);

        self.messages.clear();
        for entry in conversation {
            let message_id = self.allocate_message_id();
            self.messages.push(Message {
                id: message_id,
                sender: entry.sender,
                text: entry.text,
                image: None,
                citations: Vec::new(),
                reasoning: None,
                email_sequence: None,
                timestamp: Local::now(),
            });
        }
        tracing::info!("Opened sequence {} with {} messages", id, self.messages.len());
        true
    }

    /// Queue a save of the active sequence with the current conversation
    pub fn request_save(&mut self) -> bool {
        let transcript = self.transcript();
        self.workspace.request_save(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_mode::{ChatEndpoint, OPEN_SEARCH};
    use crate::types::{Citation, EmailSequence};
    use crate::templates::WELCOME_TEMPLATES;

    fn session() -> Session {
        Session::new("user_001", "org_001")
    }

    fn reply(text: &str) -> ChatResponse {
        ChatResponse {
            message: ChatReply {
                text: text.to_string(),
                ..Default::default()
            },
        }
    }

    fn reply_with_sequence(text: &str, content: &str, update: bool) -> ChatResponse {
        ChatResponse {
            message: ChatReply {
                text: text.to_string(),
                reasoning: Some("Candidate pool is senior".into()),
                email_sequence: Some(EmailSequence {
                    content: content.to_string(),
                    should_update_workspace: update,
                }),
                ..Default::default()
            },
        }
    }

    /// Send and complete successfully; returns the request
    fn exchange(s: &mut Session, text: &str, answer: &str) -> ChatRequest {
        let request = s.send(text, None).unwrap();
        s.complete(request.ticket, Ok(reply(answer)));
        request
    }

    #[test]
    fn blank_send_is_noop() {
        let mut s = session();
        assert!(s.send("", None).is_none());
        assert!(s.send("   \n", None).is_none());
        assert!(s.messages().is_empty());
        assert!(!s.is_loading());
    }

    #[test]
    fn image_only_send_is_allowed() {
        let mut s = session();
        let image = ImageAttachment {
            file_name: "resume.png".into(),
            bytes: vec![1, 2, 3],
        };
        let request = s.send("", Some(image)).unwrap();
        assert!(request.image.is_some());
        assert_eq!(s.messages()[0].image.as_deref(), Some("resume.png"));
    }

    #[test]
    fn send_while_loading_is_noop() {
        let mut s = session();
        s.send("first", None).unwrap();
        assert!(s.is_loading());
        assert!(s.send("second", None).is_none());
        assert_eq!(s.messages().len(), 1);
    }

    #[test]
    fn successful_send_appends_user_then_assistant() {
        let mut s = session();
        exchange(&mut s, "hello", "hi there");
        let request = s.send("draft a sequence", None).unwrap();
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].text, "draft a sequence");
        assert_eq!(request.workspace, "1");
        assert_eq!(request.user_id, "user_001");

        let outcome = s.complete(request.ticket, Ok(reply("Here it is")));
        assert_eq!(outcome, TurnOutcome::Appended { workspace_updated: false });
        let senders: Vec<_> = s.messages().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::User, Sender::Assistant, Sender::User, Sender::Assistant]
        );
        assert!(!s.is_loading());
    }

    #[test]
    fn failed_send_appends_one_error_message() {
        let mut s = session();
        let request = s.send("hello", None).unwrap();
        let outcome = s.complete(request.ticket, Err("connection refused".into()));
        assert_eq!(outcome, TurnOutcome::Failed { notice: None });
        assert_eq!(s.messages().len(), 2);
        let last = s.messages().last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, SEND_ERROR_TEXT);
        assert!(!s.is_loading());
    }

    #[test]
    fn regenerate_replaces_tail() {
        let mut s = session();
        exchange(&mut s, "one", "first answer");
        exchange(&mut s, "two", "second answer");
        let target = s.messages()[1].id;

        let request = s.regenerate(target).unwrap();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].text, "one");
        assert!(s.is_loading());

        let outcome = s.complete(request.ticket, Ok(reply("better answer")));
        assert_eq!(outcome, TurnOutcome::Replaced { workspace_updated: false });
        assert_eq!(s.messages().len(), 2);
        assert_eq!(s.messages()[1].text, "better answer");
        assert_eq!(s.messages()[1].sender, Sender::Assistant);
    }

    #[test]
    fn regenerate_failure_keeps_messages() {
        let mut s = session();
        exchange(&mut s, "one", "answer");
        let target = s.messages()[1].id;
        let request = s.regenerate(target).unwrap();
        let outcome = s.complete(request.ticket, Err("HTTP 500".into()));
        assert_eq!(
            outcome,
            TurnOutcome::Failed {
                notice: Some(Notice::error(REGENERATE_ERROR_TEXT))
            }
        );
        assert_eq!(s.messages().len(), 2);
        assert_eq!(s.messages()[1].text, "answer");
    }

    #[test]
    fn regenerate_refuses_user_messages_and_unknown_ids() {
        let mut s = session();
        exchange(&mut s, "one", "answer");
        let user_id = s.messages()[0].id;
        assert!(s.regenerate(user_id).is_none());
        assert!(s.regenerate(999).is_none());
        assert!(!s.is_loading());
    }

    #[test]
    fn ids_stay_unique_after_regenerate() {
        let mut s = session();
        exchange(&mut s, "one", "a");
        exchange(&mut s, "two", "b");
        let request = s.regenerate(s.messages()[1].id).unwrap();
        s.complete(request.ticket, Ok(reply("a2")));
        exchange(&mut s, "three", "c");

        let mut ids: Vec<_> = s.messages().iter().map(|m| m.id).collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn flagged_reply_updates_active_sequence() {
        let mut s = session();
        let request = s.send("make a sequence", None).unwrap();
        let outcome = s.complete(
            request.ticket,
            Ok(reply_with_sequence("Updated", "Hi {name},", true)),
        );
        assert_eq!(outcome, TurnOutcome::Appended { workspace_updated: true });
        assert_eq!(s.workspace().active_content(), "Hi {name},");
        let last = s.messages().last().unwrap();
        assert_eq!(last.reasoning.as_deref(), Some("Candidate pool is senior"));
        assert!(last.email_sequence.is_some());
    }

    #[test]
    fn unflagged_reply_leaves_sequence() {
        let mut s = session();
        s.workspace_mut().edit_active("existing");
        let request = s.send("question", None).unwrap();
        s.complete(request.ticket, Ok(reply_with_sequence("No", "ignored", false)));
        assert_eq!(s.workspace().active_content(), "existing");
    }

    #[test]
    fn citations_are_kept() {
        let mut s = session();
        let request = s.send("sources?", None).unwrap();
        let response = ChatResponse {
            message: ChatReply {
                text: "see".into(),
                citations: Some(vec![Citation {
                    url: "https://example.com".into(),
                    title: "Example".into(),
                    text: "excerpt".into(),
                }]),
                ..Default::default()
            },
        };
        s.complete(request.ticket, Ok(response));
        assert_eq!(s.messages()[1].citations.len(), 1);
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut s = session();
        let request = s.send("hello", None).unwrap();
        assert_eq!(s.complete(request.ticket + 7, Ok(reply("x"))), TurnOutcome::Stale);
        assert!(s.is_loading());
        s.complete(request.ticket, Ok(reply("y")));
        assert_eq!(s.complete(request.ticket, Ok(reply("z"))), TurnOutcome::Stale);
        assert_eq!(s.messages().len(), 2);
    }

    #[test]
    fn welcome_template_sends_exact_prompt() {
        let mut s = session();
        assert!(s.show_welcome());
        let request = s.send_template(0).unwrap();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].text, WELCOME_TEMPLATES[0].prompt);
        assert!(!s.show_welcome());
    }

    #[test]
    fn open_mode_routes_to_open_search() {
        let mut s = session();
        s.toggle_search_mode(OPEN_SEARCH);
        let request = s.send("find people", None).unwrap();
        assert_eq!(request.endpoint, ChatEndpoint::OpenSearch);
    }

    #[test]
    fn request_uses_active_sequence_as_workspace() {
        let mut s = session();
        let id = s.workspace_mut().new_sequence();
        let request = s.send("hi", None).unwrap();
        assert_eq!(request.workspace, id);
    }

    #[test]
    fn open_sequence_restores_conversation() {
        let mut s = session();
        exchange(&mut s, "old", "old answer");
        let stored = Sequence {
            id: "seq-9".into(),
            user_id: "user_001".into(),
            org_id: "org_001".into(),
            name: "Data team".into(),
            content: "Hello data folks".into(),
            messages: vec![
                TranscriptEntry { text: "write it".into(), sender: Sender::User },
                TranscriptEntry { text: "done".into(), sender: Sender::Assistant },
            ],
            created_at: None,
            updated_at: None,
        };
        assert!(s.open_sequence(stored));
        assert_eq!(s.workspace().active_id(), "seq-9");
        assert_eq!(s.workspace().active_content(), "Hello data folks");
        assert_eq!(s.messages().len(), 2);
        assert_eq!(s.messages()[1].text, "done");
    }

    #[test]
    fn save_carries_conversation() {
        let mut s = session();
        exchange(&mut s, "hello", "hi");
        s.workspace_mut().edit_active("body");
        assert!(s.request_save());
        let request = s.workspace_mut().next_save().unwrap();
        assert_eq!(request.draft.messages, s.transcript());
        assert_eq!(request.draft.content, "body");
    }
}
