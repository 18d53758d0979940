//! Error types for the bridge boundary

use crate::ops::CompareOp;

/// Result type for boundary calls
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors surfaced across the native/host boundary.
///
/// Nothing here is fatal to the process; the worst case is a reported
/// error back to the host runtime's caller. Protocol-dispatch failures
/// (`UnsupportedOperation`, `Incomparable`) are returned as values the
/// host must check, never unwound across the boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// Wrap request for a type name absent from the registry
    #[error("unknown native type '{0}'")]
    UnknownType(String),

    /// Optional protocol operation invoked on a type that lacks it
    #[error("type '{type_name}' does not support {operation}")]
    UnsupportedOperation {
        /// Registered name of the type
        type_name: String,
        /// Name of the missing operation ("compare" or "hash")
        operation: &'static str,
    },

    /// The compare operation exists but this pair of values cannot be
    /// ordered for the requested operator
    #[error("values of type '{type_name}' are incomparable under {op:?}")]
    Incomparable {
        /// Registered name of the type
        type_name: String,
        /// Operator that was requested
        op: CompareOp,
    },

    /// Comparison attempted between wrappers of two different descriptors
    #[error("cannot compare '{left}' with '{right}'")]
    DescriptorMismatch {
        /// Type name of the left operand
        left: String,
        /// Type name of the right operand
        right: String,
    },
}
