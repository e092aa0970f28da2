//! Error conversion from internal error types.
//!
//! This module provides conversions from core and engine errors to the
//! executor's [`Error`] type.

use crate::Error;
use docadmin_core::Error as CoreError;

/// Convert a core error to an executor Error.
///
/// Store write errors, including duplicate keys, become `WriteFailed`;
/// malformed ids and extended JSON become `InvalidInput`.
impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            // Write errors
            CoreError::DuplicateKey { key } => Error::WriteFailed {
                reason: format!("duplicate key: {}", key),
            },
            CoreError::WriteError(reason) => Error::WriteFailed { reason },

            // Concurrency errors
            CoreError::RepairInProgress { collection } => Error::RepairInProgress { collection },

            // Validation errors
            CoreError::InvalidObjectId(e) => Error::InvalidInput {
                reason: format!("invalid object id: {}", e),
            },
            CoreError::InvalidJson(e) => Error::InvalidInput {
                reason: format!("invalid extended JSON: {}", e),
            },

            // System errors
            CoreError::Io(e) => Error::Io {
                reason: e.to_string(),
            },
            CoreError::Serialization(reason) => Error::Serialization { reason },
        }
    }
}

/// Convert a docadmin_core::Result to an executor Result.
pub fn convert_result<T>(result: docadmin_core::Result<T>) -> crate::Result<T> {
    result.map_err(Error::from)
}
