//! The Shelter offline agent coordinator.
//!
//! One `Agent` instance per application origin ties the pieces together:
//! - install: pre-load the asset manifest into the current cache version
//! - activate: evict superseded versions and claim open clients
//! - fetch: cache-first interception with an offline HTML fallback
//! - sync: tag-triggered flushes of reserved-key payloads
//! - message: the inbound application protocol
//! - push/notification: alert display and interaction routing
//!
//! Every handler is an async method the host awaits; background cache
//! writes spawned by the interceptor are tracked so the host can defer
//! shutdown until `settle` completes.

mod agent;
mod clients;
mod counters;
mod fallback;
mod message;
mod network;
mod notify;

pub use agent::*;
pub use clients::*;
pub use counters::*;
pub use fallback::*;
pub use message::*;
pub use network::*;
pub use notify::*;
