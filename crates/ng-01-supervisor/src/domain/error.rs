//! Supervisor error taxonomy.
//!
//! A [`Fault`] is a protocol-level answer from supervisord and is kept apart
//! from transport and decoding failures so callers can log it verbatim.

use std::fmt;

/// Fault codes returned by supervisord's `supervisor.*` namespace.
pub mod fault_codes {
    pub const UNKNOWN_METHOD: i64 = 1;
    pub const INCORRECT_PARAMETERS: i64 = 2;
    pub const BAD_ARGUMENTS: i64 = 3;
    pub const SHUTDOWN_STATE: i64 = 6;
    pub const BAD_NAME: i64 = 10;
    pub const NO_FILE: i64 = 20;
    pub const NOT_EXECUTABLE: i64 = 21;
    pub const FAILED: i64 = 30;
    pub const ABNORMAL_TERMINATION: i64 = 40;
    pub const SPAWN_ERROR: i64 = 50;
    pub const ALREADY_STARTED: i64 = 60;
    pub const NOT_RUNNING: i64 = 70;
}

/// XML-RPC fault: `faultCode` / `faultString` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub code: i64,
    pub message: String,
}

impl Fault {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Errors raised while encoding or decoding XML-RPC documents.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RpcCodecError {
    /// The document is not well-formed XML.
    #[error("invalid XML: {0}")]
    Xml(String),

    /// Well-formed XML that does not follow the XML-RPC structure.
    #[error("unexpected document structure: {0}")]
    Structure(String),

    /// A `<value>` with a type tag this codec does not know.
    #[error("unsupported value type <{0}>")]
    UnknownType(String),

    /// A scalar whose text does not parse as its declared type.
    #[error("invalid <{kind}> value {text:?}")]
    InvalidScalar { kind: &'static str, text: String },
}

/// Errors surfaced by a supervisor method call.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// Connection, DNS, or timeout failure reaching supervisord.
    #[error("supervisor unreachable: {0}")]
    Transport(String),

    /// supervisord answered with a non-success HTTP status.
    #[error("supervisor answered HTTP {0}")]
    HttpStatus(u16),

    /// The response body is not a valid XML-RPC method response.
    #[error("malformed supervisor response: {0}")]
    Decode(#[from] RpcCodecError),

    /// Protocol-level fault.
    #[error("supervisor fault {}: {}", .0.code, .0.message)]
    Fault(Fault),
}

impl SupervisorError {
    /// The fault payload, when this error is a protocol fault.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            SupervisorError::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

impl From<Fault> for SupervisorError {
    fn from(fault: Fault) -> Self {
        SupervisorError::Fault(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_display() {
        let err = SupervisorError::from(Fault::new(fault_codes::NOT_RUNNING, "NOT_RUNNING: beacon"));
        assert_eq!(err.to_string(), "supervisor fault 70: NOT_RUNNING: beacon");
        assert_eq!(err.fault().map(|f| f.code), Some(70));
    }

    #[test]
    fn test_transport_error_has_no_fault() {
        let err = SupervisorError::Transport("connection refused".into());
        assert!(err.fault().is_none());
        assert!(err.to_string().contains("connection refused"));
    }
}
