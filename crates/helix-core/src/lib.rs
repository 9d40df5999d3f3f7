//! helix-core: Domain logic for helix
//!
//! This crate contains the chat session, sequence workspace and search-mode
//! state with no HTTP or UI dependencies. Every transition is synchronous;
//! callers perform the requests the session hands out.

pub mod config;
pub mod search_mode;
pub mod session;
pub mod templates;
pub mod types;
pub mod workspace;

pub use config::Config;
pub use search_mode::{ChatEndpoint, SearchModes};
pub use session::{Session, TurnOutcome};
pub use templates::{PromptTemplate, Suggestion};
pub use types::*;
pub use workspace::{SaveRequest, SequenceDoc, Workspace};
