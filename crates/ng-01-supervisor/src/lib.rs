//! # Supervisor Subsystem
//!
//! Talks to supervisord's XML-RPC control interface and sequences lifecycle
//! operations across the node processes it manages.
//!
//! ## Architecture
//!
//! ```text
//!   /service/{restart,stop,start}        /service/status
//!               │                               │
//!               ▼                               │
//!   ┌───────────────────────┐                   │
//!   │  RestartOrchestrator  │  stop ─► wait ─► start (fan-out per phase)
//!   └───────────┬───────────┘                   │
//!               ▼                               ▼
//!   ┌───────────────────────────────────────────────┐
//!   │           SupervisorApi (port)                │
//!   └───────────────────────┬───────────────────────┘
//!                           ▼
//!   ┌───────────────────────────────────────────────┐
//!   │  SupervisorClient: XML-RPC over HTTP POST     │
//!   │  http://localhost:5555/RPC2                   │
//!   └───────────────────────────────────────────────┘
//! ```
//!
//! - **Domain:** XML-RPC values and codec, restart plan, phase reports, errors
//! - **Ports:** [`SupervisorApi`], one method call per round trip
//! - **Adapters:** [`SupervisorClient`] (reqwest)
//! - **Service:** [`RestartOrchestrator`]
//!
//! The client never retries. A failed call on one process never cancels the
//! calls for its siblings; outcomes are gathered into a [`PhaseReport`].

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use adapters::{SupervisorClient, SupervisorEndpoint};
pub use domain::codec::{decode_response, encode_call, MethodResponse};
pub use domain::error::{fault_codes, Fault, RpcCodecError, SupervisorError};
pub use domain::plan::{
    Phase, PhaseReport, ProcessOutcome, RestartPlan, RestartReport, RestartState,
    DEFAULT_QUIESCENCE,
};
pub use domain::value::RpcValue;
pub use ports::{methods, SupervisorApi};
pub use service::{RestartError, RestartOrchestrator};
