//! KS0066 Character Display Driver
//!
//! A bit-banged driver for KS0066/HD44780 character displays on a 4-bit data
//! interface.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - Fixed-delay or busy-flag synchronization
//! - Custom glyphs in CGRAM
//! - Interrupt guard hook around every nibble pair
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use ks0066::{Builder, Display, Interface, IoPin};
//!
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # impl IoPin for MockPin {
//! #     fn set_input(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_output(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! // Blinking cursor, two lines
//! let config = match Builder::new().mode_bits((1 << 6) | (1 << 2)).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let interface = Interface::new(
//!     &config.binding,
//!     MockPin,
//!     MockPin,
//!     MockPin,
//!     [MockPin, MockPin, MockPin, MockPin],
//! );
//!
//! let mut display = Display::new(interface, config);
//! let _ = display.init(&mut delay);
//! let _ = display.write_string("Hello world!", &mut delay);
//! let _ = display.write_char(true, 0, "", &mut delay);
//! let _ = display.write_int(5054, &mut delay);
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

/// KS0066 instruction opcodes and delays
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Display control counter and trigger
pub mod control;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Hardware interface abstraction
pub mod interface;

pub use config::{Builder, Config, ModeConfig, PortBinding, SyncStrategy};
pub use control::{ButtonTrigger, ControlTrigger, DisplayControlCounter};
pub use display::{Display, Register};
pub use error::{BuilderError, Error};
pub use interface::{
    DisplayInterface, Interface, InterfaceError, InterruptGuard, IoPin, NoInterruptGuard,
    OpenDrain,
};
