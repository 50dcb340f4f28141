//! Mnemos Core Library
//!
//! Durable, append-only working memory for investigation sessions: typed
//! records in JSON-lines logs, event-sourced investigations, and a
//! compaction pass that folds routine records into summaries while leaving
//! high-value ones untouched.

pub mod classify;
pub mod compaction;
pub mod config;
pub mod error;
pub mod id;
pub mod investigation;
pub mod lock;
pub mod log;
pub mod logging;
pub mod record;
pub mod reflect;
pub mod status;
pub mod store;
