//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! The controller is driven open loop, so most wiring faults cannot be seen
//! here. Only the busy-flag poll and the integer formatter can fail on their own.
//!
//! ## Example
//!
//! ```
//! use ks0066::{Builder, BuilderError, PortBinding};
//!
//! // Enable and register select on the same bit
//! let binding = PortBinding { enable: 1, ..PortBinding::default() };
//! let result = Builder::new().binding(binding).build();
//! assert!(matches!(result, Err(BuilderError::PinConflict { bit: 1 })));
//! ```

use crate::interface::DisplayInterface;

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// Interface error (port or pin access failed)
    Interface(I::Error),
    /// Busy flag never cleared
    ///
    /// Only raised with [`SyncStrategy::PollBusyFlag`](crate::config::SyncStrategy::PollBusyFlag).
    HardwareTimeout {
        /// Number of polls made before giving up
        polls: u32,
    },
    /// Rendered integer did not fit the formatting buffer
    FormatOverflow,
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::HardwareTimeout { polls } => {
                write!(f, "Busy flag still set after {polls} polls")
            }
            Self::FormatOverflow => write!(f, "Integer does not fit the format buffer"),
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// A control line was assigned to a bit outside the 8-bit port
    InvalidBit {
        /// Offending bit position
        bit: u8,
    },
    /// Two lines were assigned to the same port bit
    PinConflict {
        /// Bit position claimed twice
        bit: u8,
    },
    /// Data lines DB4..DB7 would not fit in the port
    ///
    /// The shift must be at most 4.
    InvalidDataShift {
        /// Requested bit of DB4
        shift: u8,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidBit { bit } => write!(f, "Bit {bit} is outside the 8-bit port"),
            Self::PinConflict { bit } => write!(f, "Bit {bit} is assigned to more than one line"),
            Self::InvalidDataShift { shift } => {
                write!(f, "Data lines at bit {shift} overflow the port (max 4)")
            }
        }
    }
}

impl core::error::Error for BuilderError {}
