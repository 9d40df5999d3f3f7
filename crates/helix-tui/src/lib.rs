//! helix-tui: Terminal UI for building outreach sequences with the assistant
//!
//! Three panes: a sidebar (new sequence, saved sequences, search modes), the
//! chat, and the sequence workspace with one tab per open sequence.

mod app;
mod clipboard;
mod command;
mod toast;
mod ui;

pub use app::{ChatApp, Focus, Mode};
