//! PEUP chat search client
//!
//! Turns free-text chat messages into PEUP search intents, sends them to the
//! backend and keeps a transcript plus the latest ranked result list.
//!
//! - [`protocol`]: intent/response codec (wire schema and validation)
//! - [`transport`]: HTTP boundary to `POST /api/search`
//! - [`conversation`]: state machine and runtime that owns the transcript
//! - [`cache`]: TTL cache for decoded responses
//! - [`config`]: environment-driven client settings

pub mod cache;
pub mod config;
pub mod conversation;
pub mod protocol;
pub mod transport;
