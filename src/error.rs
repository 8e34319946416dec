//! Error types for the simulation core
//!
//! Gameplay outcomes (running out of energy, air or health) are state
//! transitions, never errors. These variants cover programmer mistakes caught
//! by precondition checks and configuration loading failures.

use std::fmt;

/// Top-level error enum for the simulation
#[derive(Debug)]
pub enum SimError {
    /// A constructor or tuning parameter is outside its valid range
    InvalidParameter {
        /// Name of the parameter
        name: &'static str,
        /// The rejected value
        value: f32,
        /// Human-readable description of the valid range
        expected: &'static str,
    },

    /// A body handle did not resolve to a body in the physics world
    UnknownBody {
        /// Raw handle index
        handle: u32,
    },

    /// Reading a config file failed
    Io(std::io::Error),

    /// A config file was not valid JSON for the expected shape
    Parse(serde_json::Error),
}

impl SimError {
    /// Shorthand for an [`SimError::InvalidParameter`]
    pub fn invalid(name: &'static str, value: f32, expected: &'static str) -> Self {
        SimError::InvalidParameter {
            name,
            value,
            expected,
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidParameter {
                name,
                value,
                expected,
            } => write!(f, "invalid {}: got {}, expected {}", name, value, expected),
            SimError::UnknownBody { handle } => {
                write!(f, "body handle {} is not in the physics world", handle)
            }
            SimError::Io(err) => write!(f, "config i/o failed: {}", err),
            SimError::Parse(err) => write!(f, "config parse failed: {}", err),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Io(err) => Some(err),
            SimError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io(err)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Parse(err)
    }
}
