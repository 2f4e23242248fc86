//! Request orchestration and the HTTP routes that drive it.

pub mod orchestrator;
pub mod routes;

pub use orchestrator::RequestOrchestrator;
pub use routes::{RelayState, RouterOptions, relay_routes};
