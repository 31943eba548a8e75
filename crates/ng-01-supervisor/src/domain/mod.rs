//! Domain types for the supervisor subsystem.
//!
//! Pure logic only: the XML-RPC value model and its wire codec, the restart
//! plan, and the error taxonomy. No I/O happens here.

pub mod codec;
pub mod error;
pub mod plan;
pub mod value;

pub use codec::{decode_response, encode_call, MethodResponse};
pub use error::{Fault, RpcCodecError, SupervisorError};
pub use plan::{Phase, PhaseReport, ProcessOutcome, RestartPlan, RestartReport, RestartState};
pub use value::RpcValue;
