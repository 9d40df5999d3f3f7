//! Outreach search modes
//!
//! A plain set of mode identifiers shared by the sidebar and the session.
//! No combination of modes is rejected; the set only picks the chat endpoint.

use std::collections::BTreeSet;

/// Identifier of the mode that routes chats to open search
pub const OPEN_SEARCH: &str = "open";

/// Modes offered by the sidebar: (id, label)
pub const SEARCH_MODES: &[(&str, &str)] = &[
    ("roles", "Role-based"),
    ("skills", "Skills-based"),
    ("custom", "Custom"),
    (OPEN_SEARCH, "Open search"),
];

/// Backend chat variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEndpoint {
    Standard,
    OpenSearch,
}

impl ChatEndpoint {
    /// Path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            Self::Standard => "api/chat",
            Self::OpenSearch => "api/chat/open-search",
        }
    }
}

/// Set of active search modes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchModes {
    active: BTreeSet<String>,
}

impl SearchModes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains(id)
    }

    /// Flip membership of `id`; returns whether it is now active
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.active.remove(id) {
            false
        } else {
            self.active.insert(id.to_string());
            true
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Endpoint variant selected by the current set
    pub fn endpoint(&self) -> ChatEndpoint {
        if self.is_active(OPEN_SEARCH) {
            ChatEndpoint::OpenSearch
        } else {
            ChatEndpoint::Standard
        }
    }
}

impl<S: Into<String>> FromIterator<S> for SearchModes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            active: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Pure toggle: a copy of `modes` with `id` flipped
pub fn toggled(modes: &SearchModes, id: &str) -> SearchModes {
    let mut next = modes.clone();
    next.toggle(id);
    next
}

/// Look up the sidebar label for a mode id
pub fn label(id: &str) -> Option<&'static str> {
    SEARCH_MODES
        .iter()
        .find(|(mode, _)| *mode == id)
        .map(|(_, label)| *label)
}
