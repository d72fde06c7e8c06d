//! Deferred data synchronization over reserved cache keys.
//!
//! Outbound payloads are parked in the cache store under reserved keys and
//! flushed when an external trigger (connectivity restored, periodic timer,
//! application message) fires. Retry policy belongs to the trigger, not to
//! this crate: a failed flush leaves the payload untouched and reports the
//! error upward.

mod item;
mod queue;
mod tags;

pub use item::*;
pub use queue::*;
pub use tags::*;
