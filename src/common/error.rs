//! Error type for the fallible parts of the engine.
//!
//! Only construction and configuration can fail. Problems that show up while the
//! simulation is running (a removal of an unknown object, an insert outside the
//! world) are skipped and logged instead, so a tick never aborts.

use std::fmt;

/// Errors returned by constructors and settings loading.
#[derive(Clone, Debug, PartialEq)]
pub enum PhysicsError {
    /// The geometry handed to a constructor cannot form a body.
    InvalidGeometry {
        /// What is wrong with it
        reason: String,
    },
    /// A settings value is out of its allowed range.
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
    /// Settings could not be read from or written to JSON.
    Serialization {
        /// Message reported by the serializer
        message: String,
    },
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid setting `{field}`: {reason}")
            }
            Self::Serialization { message } => write!(f, "settings serialization failed: {message}"),
        }
    }
}

impl std::error::Error for PhysicsError {}

impl From<serde_json::Error> for PhysicsError {
    fn from(err: serde_json::Error) -> Self {
        PhysicsError::Serialization {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PhysicsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PhysicsError::InvalidGeometry {
            reason: "polygon needs at least 3 vertices, got 2".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid geometry: polygon needs at least 3 vertices, got 2"
        );

        let err = PhysicsError::InvalidConfig {
            field: "capacity",
            reason: "must be at least 1".into(),
        };
        assert_eq!(err.to_string(), "invalid setting `capacity`: must be at least 1");
    }

    #[test]
    fn test_from_serde_error() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: PhysicsError = json_err.into();
        assert!(matches!(err, PhysicsError::Serialization { .. }));
    }
}
