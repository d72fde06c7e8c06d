//! Core abstractions for the Shelter offline caching agent.
//!
//! This crate provides the fundamental types:
//! - `Request` / `Response` - the HTTP exchange model seen by the interceptor
//! - `Origin` - scheme/host/port identity for same-origin checks
//! - `AgentConfig` / `AssetManifest` - startup configuration
//! - `AgentState` - lifecycle states of the agent

mod config;
mod origin;
mod request;
mod state;

pub use config::*;
pub use origin::*;
pub use request::*;
pub use state::*;
