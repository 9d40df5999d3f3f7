//! Workspace: editable sequences and the outgoing save queue
//!
//! Edits apply locally first. Saving snapshots the active sequence into a
//! queue that sends one request at a time; the ack only advances the saved
//! revision, so edits made after the snapshot stay dirty (last write wins).

use crate::types::{Notice, Sequence, SequenceDraft, TranscriptEntry};
use std::collections::VecDeque;

/// Name used when a sequence has none
pub const UNTITLED: &str = "Untitled Sequence";

/// Placeholder identity of the first sequence
const INITIAL_SEQUENCE_ID: &str = "1";

/// A sequence plus its local edit bookkeeping
#[derive(Debug, Clone)]
pub struct SequenceDoc {
    pub record: Sequence,
    /// Bumped on every local content change
    revision: u64,
    /// Highest revision acknowledged by the backend
    saved_revision: u64,
}

impl SequenceDoc {
    fn new(record: Sequence) -> Self {
        Self {
            record,
            revision: 0,
            saved_revision: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn name(&self) -> &str {
        if self.record.name.is_empty() {
            UNTITLED
        } else {
            &self.record.name
        }
    }

    pub fn content(&self) -> &str {
        &self.record.content
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Local changes not yet acknowledged by a save
    pub fn is_dirty(&self) -> bool {
        self.revision > self.saved_revision
    }

    fn set_content(&mut self, content: String) -> bool {
        if self.record.content == content {
            return false;
        }
        self.record.content = content;
        self.revision += 1;
        true
    }
}

/// Snapshot of a sequence waiting to be saved
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub draft: SequenceDraft,
    /// Local revision captured with the snapshot
    pub revision: u64,
}

/// Outgoing saves; one in flight, pending snapshots coalesced per sequence
#[derive(Debug, Default)]
struct SyncQueue {
    pending: VecDeque<SaveRequest>,
    in_flight: Option<SaveRequest>,
}

impl SyncQueue {
    fn enqueue(&mut self, request: SaveRequest) {
        self.pending.retain(|r| r.draft.id != request.draft.id);
        self.pending.push_back(request);
    }

    fn next(&mut self) -> Option<SaveRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let request = self.pending.pop_front()?;
        self.in_flight = Some(request.clone());
        Some(request)
    }
}

/// Sequences shown in the workspace panel
#[derive(Debug)]
pub struct Workspace {
    user_id: String,
    org_id: String,
    docs: Vec<SequenceDoc>,
    active_id: String,
    /// Bumped whenever content changes from outside the editor
    external_revision: u64,
    sync: SyncQueue,
}

impl Workspace {
    /// Workspace holding a single empty placeholder sequence
    pub fn new(user_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let org_id = org_id.into();
        let first = Sequence {
            id: INITIAL_SEQUENCE_ID.to_string(),
            user_id: user_id.clone(),
            org_id: org_id.clone(),
            name: "Sequence 1".to_string(),
            content: String::new(),
            messages: Vec::new(),
            created_at: None,
            updated_at: None,
        };

        Self {
            user_id,
            org_id,
            docs: vec![SequenceDoc::new(first)],
            active_id: INITIAL_SEQUENCE_ID.to_string(),
            external_revision: 0,
            sync: SyncQueue::default(),
        }
    }

    pub fn sequences(&self) -> &[SequenceDoc] {
        &self.docs
    }

    pub fn get(&self, id: &str) -> Option<&SequenceDoc> {
        self.docs.iter().find(|d| d.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut SequenceDoc> {
        self.docs.iter_mut().find(|d| d.id() == id)
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> Option<&SequenceDoc> {
        self.get(&self.active_id)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.docs.iter().position(|d| d.id() == self.active_id)
    }

    pub fn active_content(&self) -> &str {
        self.active().map(SequenceDoc::content).unwrap_or("")
    }

    pub fn active_name(&self) -> &str {
        self.active().map(SequenceDoc::name).unwrap_or(UNTITLED)
    }

    /// Changes whenever the editor buffer must be reloaded
    pub fn external_revision(&self) -> u64 {
        self.external_revision
    }

    // ─────────────────────────────────────────────────────────────
    // Tabs
    // ─────────────────────────────────────────────────────────────

    /// Activate a sequence by id; unknown ids are ignored
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if self.active_id != id {
            self.active_id = id.to_string();
            self.external_revision += 1;
        }
        true
    }

    pub fn select_next(&mut self) {
        self.select_offset(1);
    }

    pub fn select_previous(&mut self) {
        self.select_offset(self.docs.len().saturating_sub(1));
    }

    fn select_offset(&mut self, offset: usize) {
        if self.docs.is_empty() {
            return;
        }
        let current = self.active_index().unwrap_or(0);
        let next = (current + offset) % self.docs.len();
        let id = self.docs[next].id().to_string();
        self.select(&id);
    }

    /// Add an empty sequence with a fresh id and make it active
    pub fn new_sequence(&mut self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let record = Sequence {
            id: id.clone(),
            user_id: self.user_id.clone(),
            org_id: self.org_id.clone(),
            name: format!("Sequence {}", self.docs.len() + 1),
            content: String::new(),
            messages: Vec::new(),
            created_at: None,
            updated_at: None,
        };
        self.docs.push(SequenceDoc::new(record));
        self.select(&id);
        tracing::debug!("Created sequence {}", id);
        id
    }

    // ─────────────────────────────────────────────────────────────
    // Content
    // ─────────────────────────────────────────────────────────────

    /// Editor keystroke: replace the active content
    pub fn edit_active(&mut self, content: impl Into<String>) {
        let id = self.active_id.clone();
        if let Some(doc) = self.get_mut(&id) {
            doc.set_content(content.into());
        }
    }

    /// Content produced by an assistant reply
    pub fn apply_generated(&mut self, content: impl Into<String>) {
        let id = self.active_id.clone();
        if let Some(doc) = self.get_mut(&id) {
            if doc.set_content(content.into()) {
                self.external_revision += 1;
            }
        }
    }

    /// Fold backend records into the tab set without clobbering local edits
    pub fn merge_remote(&mut self, records: impl IntoIterator<Item = Sequence>) {
        for record in records {
            match self.get_mut(&record.id) {
                Some(doc) if doc.is_dirty() => {
                    doc.record.created_at = record.created_at;
                    doc.record.updated_at = record.updated_at;
                }
                Some(doc) => {
                    if doc.record.content != record.content {
                        doc.revision += 1;
                    }
                    doc.saved_revision = doc.revision;
                    doc.record = record;
                }
                None => self.docs.push(SequenceDoc::new(record)),
            }
        }
        self.external_revision += 1;
    }

    // ─────────────────────────────────────────────────────────────
    // Saving
    // ─────────────────────────────────────────────────────────────

    /// Snapshot the active sequence into the save queue
    pub fn request_save(&mut self, messages: Vec<TranscriptEntry>) -> bool {
        let Some(doc) = self.active() else {
            return false;
        };
        let request = SaveRequest {
            draft: SequenceDraft {
                id: doc.id().to_string(),
                user_id: self.user_id.clone(),
                org_id: self.org_id.clone(),
                name: doc.name().to_string(),
                content: doc.content().to_string(),
                messages,
            },
            revision: doc.revision,
        };
        self.sync.enqueue(request);
        true
    }

    /// Next snapshot to send, if nothing is in flight
    pub fn next_save(&mut self) -> Option<SaveRequest> {
        self.sync.next()
    }

    pub fn is_saving(&self) -> bool {
        self.sync.in_flight.is_some()
    }

    pub fn pending_saves(&self) -> usize {
        self.sync.pending.len()
    }

    /// Acknowledge the in-flight save
    pub fn complete_save(&mut self, result: Result<Sequence, String>) -> Option<Notice> {
        let request = self.sync.in_flight.take()?;

        match result {
            Ok(stored) => {
                if let Some(doc) = self.get_mut(&request.draft.id) {
                    doc.saved_revision = doc.saved_revision.max(request.revision);
                    doc.record.created_at = stored.created_at;
                    doc.record.updated_at = stored.updated_at;
                }
                tracing::info!("Saved sequence {} at revision {}", request.draft.id, request.revision);
                Some(Notice::success("Sequence saved"))
            }
            Err(e) => {
                tracing::warn!("Failed to save sequence {}: {}", request.draft.id, e);
                Some(Notice::error("Failed to save sequence"))
            }
        }
    }
}
