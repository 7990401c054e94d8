//! Change event values
//!
//! User interaction reduces to a single value per event: a number for
//! continuous controls, a boolean for toggles, and the activation sentinel
//! for controls that carry no value of their own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The value carried by a change event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeValue {
    /// Boolean value (checkbox state)
    Bool(bool),
    /// Numeric value (slider position, or the activation sentinel)
    Number(f64),
}

impl ChangeValue {
    /// Sentinel for stateless activation events (button and image clicks).
    ///
    /// The receiver treats `-1` as "this control fired", not as a number.
    pub const ACTIVATE: Self = Self::Number(-1.0);

    /// Try to get as number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this is the activation sentinel
    pub fn is_activation(&self) -> bool {
        *self == Self::ACTIVATE
    }
}

impl fmt::Display for ChangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<f64> for ChangeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for ChangeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
