//! `astviz-session` is the orchestration core behind the visualizer UI:
//! a single long-lived [`SessionStore`] owning the current source text,
//! parse result, selections and loading flag, plus the pure selection
//! synchronization that maps a click in one structural view to a source
//! span for the editor and the other view.
//!
//! The store is the single source of truth consumed by presentation;
//! every mutation goes through its commands and is applied as one
//! atomic replace.

mod config;
mod selection;
mod store;

pub use config::{Config, LogFormat, Strategy, init_tracing};
pub use selection::{
    INSTRUCTION_HIGHLIGHT_WIDTH, highlight_for_instruction, highlight_for_node, is_same_selection,
};
pub use store::{EXAMPLE_SOURCE, SessionState, SessionStore};
