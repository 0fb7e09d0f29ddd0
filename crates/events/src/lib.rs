//! In-process event bus and outbound delivery for the Servia backend.

pub mod bus;
pub mod delivery;

pub use bus::{EventBus, PlatformEvent};
