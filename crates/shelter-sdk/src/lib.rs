//! Public SDK for the Shelter offline caching agent.
//!
//! This crate re-exports the full agent surface:
//!
//! ```ignore
//! use shelter_sdk::prelude::*;
//!
//! let origin = Origin::parse("https://school.example")?;
//! let config = AgentConfig::new("static-v2", origin)
//!     .with_precache(AssetManifest::from_paths(["/", "/index.html", "/app.js"]));
//!
//! let agent = Agent::new(config, backend, network, clients, transmitter);
//! agent.handle_install().await?;
//! agent.handle_activate().await?;
//!
//! match agent.handle_fetch(&request).await? {
//!     FetchOutcome::Respond(response) => host.respond(response),
//!     FetchOutcome::Passthrough => host.forward(request),
//! }
//! ```

pub use shelter_agent;
pub use shelter_cache;
pub use shelter_core;
pub use shelter_sync;

/// Prelude for convenient imports.
pub mod prelude {
    pub use shelter_agent::*;
    pub use shelter_cache::*;
    pub use shelter_core::*;
    pub use shelter_sync::*;
}
