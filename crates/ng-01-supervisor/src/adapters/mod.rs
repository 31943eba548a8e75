//! Adapters for the supervisor subsystem.

pub mod http_client;

pub use http_client::{SupervisorClient, SupervisorEndpoint};
