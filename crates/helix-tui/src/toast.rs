//! Transient notices shown over the UI

use helix_core::Notice;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a toast stays visible
const TOAST_TTL: Duration = Duration::from_secs(3);

/// Maximum toasts kept on screen
const MAX_TOASTS: usize = 3;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    expires_at: Instant,
}

/// Queue of visible toasts, oldest first
#[derive(Debug, Default)]
pub struct Toasts {
    items: VecDeque<Toast>,
}

impl Toasts {
    pub fn push(&mut self, notice: Notice) {
        self.push_at(notice, Instant::now());
    }

    fn push_at(&mut self, notice: Notice, now: Instant) {
        tracing::debug!("toast: {}", notice.text);
        if self.items.len() == MAX_TOASTS {
            self.items.pop_front();
        }
        self.items.push_back(Toast {
            notice,
            expires_at: now + TOAST_TTL,
        });
    }

    /// Drop expired toasts; returns true if anything changed
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.expires_at > now);
        before != self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_ttl() {
        let mut toasts = Toasts::default();
        let start = Instant::now();
        toasts.push_at(Notice::success("Copied to clipboard"), start);

        assert!(!toasts.expire(start + Duration::from_secs(1)));
        assert!(!toasts.is_empty());
        assert!(toasts.expire(start + TOAST_TTL));
        assert!(toasts.is_empty());
    }

    #[test]
    fn oldest_toast_is_dropped_when_full() {
        let mut toasts = Toasts::default();
        let now = Instant::now();
        for i in 0..=MAX_TOASTS {
            toasts.push_at(Notice::error(format!("error {}", i)), now);
        }
        let texts: Vec<_> = toasts.iter().map(|t| t.notice.text.as_str()).collect();
        assert_eq!(texts, vec!["error 1", "error 2", "error 3"]);
    }
}
