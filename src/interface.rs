//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait, a view of the
//! controller wiring as one 8-bit port with a direction register, and the
//! [`Interface`] struct that backs such a port with individual GPIO pins.
//!
//! ## Hardware Requirements
//!
//! The KS0066 in 4-bit mode needs 7 lines, plus an optional status LED:
//! - **DB4..DB7**: data nibble (bidirectional for busy-flag reads)
//! - **EN**: enable strobe, latched on the falling edge
//! - **RW**: read/write select (high = read)
//! - **RS**: register select (low = instruction, high = data)
//! - **FLAG**: status LED, lit while the driver waits for the controller
//!
//! ## Example
//!
//! ```rust,no_run
//! use ks0066::{DisplayInterface, Interface, OpenDrain, PortBinding};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{InputPin, OutputPin};
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
//! // Open-drain pins with pull-ups; released lines float high
//! let binding = PortBinding::default();
//! let mut interface = Interface::new(
//!     &binding,
//!     OpenDrain(MockPin), // EN
//!     OpenDrain(MockPin), // RW
//!     OpenDrain(MockPin), // RS
//!     [
//!         OpenDrain(MockPin), // DB4
//!         OpenDrain(MockPin), // DB5
//!         OpenDrain(MockPin), // DB6
//!         OpenDrain(MockPin), // DB7
//!     ],
//! );
//!
//! let _ = interface.set_direction(0xFF);
//! let _ = interface.write(0x38);
//! ```

use core::fmt::Debug;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Trait for the port the controller is wired to
///
/// The driver sees the wiring as a single 8-bit register plus its direction
/// register. Writes are raw and unbuffered; the bit layout is given by
/// [`PortBinding`](crate::config::PortBinding).
///
/// ## Implementing
///
/// For GPIO pins, use the provided [`Interface`] struct. A memory-mapped port
/// (e.g. an AVR `DDRx`/`PORTx` pair) can implement this trait directly.
pub trait DisplayInterface {
    /// Error type for interface operations
    type Error: Debug;

    /// Write the output-enable mask to the direction register
    ///
    /// Bits set to 1 are outputs.
    fn set_direction(&mut self, mask: u8) -> InterfaceResult<(), Self::Error>;

    /// Write a byte to the data/control register
    fn write(&mut self, value: u8) -> InterfaceResult<(), Self::Error>;

    /// Sample the port
    ///
    /// Only used while polling the busy flag.
    fn read(&mut self) -> InterfaceResult<u8, Self::Error>;
}

/// Errors that can occur at the interface level
#[derive(Debug)]
pub enum InterfaceError<PinErr> {
    /// GPIO pin error
    Pin(PinErr),
}

impl<PinErr: Debug> core::fmt::Display for InterfaceError<PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<PinErr: Debug> core::error::Error for InterfaceError<PinErr> {}

/// Scoped hook around every primitive write
///
/// An interrupted nibble pair leaves the controller half-written, so targets
/// with preemption can mask interrupts here. [`release`](Self::release) is
/// called even when the write fails.
pub trait InterruptGuard {
    /// Enter the critical section
    fn acquire(&mut self);
    /// Leave the critical section
    fn release(&mut self);
}

/// Guard that does nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInterruptGuard;

impl InterruptGuard for NoInterruptGuard {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}

/// Pin whose direction can be switched at run time
///
/// Busy-flag polling hands DB4..DB7 to the controller, so a push-pull pin
/// must stop driving the line in [`set_input`](Self::set_input). Implement
/// this for a HAL's flex pin, or wrap an open-drain pin in [`OpenDrain`].
pub trait IoPin: InputPin + OutputPin {
    /// Stop driving the line so it can be sampled
    fn set_input(&mut self) -> Result<(), <Self as ErrorType>::Error>;

    /// Drive the line again
    fn set_output(&mut self) -> Result<(), <Self as ErrorType>::Error>;
}

/// Open-drain pin with a pull-up
///
/// Switching to input releases the line high; the controller can still pull
/// it low.
#[derive(Debug)]
pub struct OpenDrain<P>(pub P);

impl<P: ErrorType> ErrorType for OpenDrain<P> {
    type Error = P::Error;
}

impl<P: OutputPin> OutputPin for OpenDrain<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }
}

impl<P: InputPin> InputPin for OpenDrain<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.0.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.0.is_low()
    }
}

impl<P: InputPin + OutputPin> IoPin for OpenDrain<P> {
    fn set_input(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }

    fn set_output(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// GPIO-backed port
///
/// Maps each port bit to a pin. Output-direction pins follow the written
/// value; input-direction pins are switched with [`IoPin::set_input`] and
/// left alone by writes. Unbound bits read as 0.
///
/// ## Type Parameters
///
/// * `P` - Pin type implementing [`IoPin`]
#[derive(Debug)]
pub struct Interface<P> {
    /// Pins indexed by port bit
    pins: [Option<P>; 8],
    /// Current direction mask
    direction: u8,
}

impl<P> Interface<P>
where
    P: IoPin,
{
    /// Create a new Interface, placing pins at the bits of `binding`
    ///
    /// The pins must already be configured as outputs.
    pub fn new(
        binding: &crate::config::PortBinding,
        enable: P,
        read_write: P,
        register_select: P,
        data: [P; 4],
    ) -> Self {
        let mut interface = Self {
            pins: Default::default(),
            direction: 0xFF,
        };
        interface.place(binding.enable.into(), enable);
        interface.place(binding.read_write.into(), read_write);
        interface.place(binding.register_select.into(), register_select);
        for (bit, pin) in (usize::from(binding.data_shift)..).zip(data) {
            interface.place(bit, pin);
        }
        interface
    }

    /// Attach the status LED pin at the flag bit of `binding`
    ///
    /// Ignored when the binding has no flag bit.
    pub fn with_flag(mut self, binding: &crate::config::PortBinding, flag: P) -> Self {
        if let Some(bit) = binding.flag {
            self.place(bit.into(), flag);
        }
        self
    }

    // Bits past the port are dropped; the builder rejects such bindings.
    fn place(&mut self, bit: usize, pin: P) {
        if let Some(slot) = self.pins.get_mut(bit) {
            *slot = Some(pin);
        }
    }

    /// Current direction mask
    pub fn direction(&self) -> u8 {
        self.direction
    }

    /// Give the pins back
    pub fn release(self) -> [Option<P>; 8] {
        self.pins
    }
}

impl<P: IoPin> DisplayInterface for Interface<P> {
    type Error = InterfaceError<<P as ErrorType>::Error>;

    fn set_direction(&mut self, mask: u8) -> InterfaceResult<(), Self::Error> {
        let changed = self.direction ^ mask;
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            let Some(pin) = pin else { continue };
            let bit_mask = 1 << bit;
            if changed & bit_mask == 0 {
                continue;
            }
            let switched = if mask & bit_mask == 0 {
                pin.set_input()
            } else {
                pin.set_output()
            };
            switched.map_err(InterfaceError::Pin)?;
        }
        self.direction = mask;
        Ok(())
    }

    fn write(&mut self, value: u8) -> InterfaceResult<(), Self::Error> {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            let Some(pin) = pin else { continue };
            let mask = 1 << bit;
            if self.direction & mask == 0 {
                continue;
            }
            pin.set_state(PinState::from(value & mask != 0))
                .map_err(InterfaceError::Pin)?;
        }
        Ok(())
    }

    fn read(&mut self) -> InterfaceResult<u8, Self::Error> {
        let mut value = 0;
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            let Some(pin) = pin else { continue };
            if pin.is_high().map_err(InterfaceError::Pin)? {
                value |= 1 << bit;
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, PortBinding, SyncStrategy};
    use crate::display::Display;
    use crate::error::Error;
    use core::cell::Cell;
    use embedded_hal::delay::DelayNs;

    #[derive(Debug, Clone, Copy)]
    struct MockError;

    impl embedded_hal::digital::Error for MockError {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    /// One wire between the MCU and the controller
    #[derive(Debug, Default)]
    struct Line {
        /// Level the MCU drives while the pin is an output
        driven: Cell<bool>,
        /// Level the controller drives while the pin is an input
        external: Cell<bool>,
        input: Cell<bool>,
        /// Set if the MCU drove the line while it was an input
        fought: Cell<bool>,
    }

    /// Push-pull flex pin
    #[derive(Debug)]
    struct MockPin<'a> {
        line: &'a Line,
        fail: bool,
    }

    impl MockPin<'_> {
        fn drive(&mut self, high: bool) -> Result<(), MockError> {
            if self.fail {
                return Err(MockError);
            }
            if self.line.input.get() {
                self.line.fought.set(true);
            }
            self.line.driven.set(high);
            Ok(())
        }
    }

    impl ErrorType for MockPin<'_> {
        type Error = MockError;
    }

    impl OutputPin for MockPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.drive(false)
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.drive(true)
        }
    }

    impl InputPin for MockPin<'_> {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.line.input.get() {
                Ok(self.line.external.get())
            } else {
                Ok(self.line.driven.get())
            }
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    impl IoPin for MockPin<'_> {
        fn set_input(&mut self) -> Result<(), Self::Error> {
            self.line.input.set(true);
            Ok(())
        }
        fn set_output(&mut self) -> Result<(), Self::Error> {
            self.line.input.set(false);
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn pin(line: &Line) -> MockPin<'_> {
        MockPin { line, fail: false }
    }

    fn wire<'a>(binding: &PortBinding, lines: &'a [Line; 8]) -> Interface<MockPin<'a>> {
        Interface::new(
            binding,
            pin(&lines[3]),
            pin(&lines[2]),
            pin(&lines[1]),
            [
                pin(&lines[4]),
                pin(&lines[5]),
                pin(&lines[6]),
                pin(&lines[7]),
            ],
        )
    }

    #[test]
    fn test_write_drives_bound_pins() {
        let lines: [Line; 8] = Default::default();
        let binding = PortBinding::default();
        let mut interface = wire(&binding, &lines).with_flag(&binding, pin(&lines[0]));

        interface.write(0b1010_1011).unwrap();
        let driven: [bool; 8] = core::array::from_fn(|bit| lines[bit].driven.get());
        assert_eq!(driven, [true, true, false, true, false, true, false, true]);
    }

    #[test]
    fn test_input_lines_switched_and_read_back() {
        let lines: [Line; 8] = Default::default();
        let binding = PortBinding::default();
        let mut interface = wire(&binding, &lines);

        interface.set_direction(0x0F).unwrap();
        assert_eq!(interface.direction(), 0x0F);
        assert!(lines[4..].iter().all(|line| line.input.get()));
        assert!(lines[1..4].iter().all(|line| !line.input.get()));

        // Writes leave the data lines to the controller
        interface.write(0xF4).unwrap();
        assert!(lines.iter().all(|line| !line.fought.get()));
        assert!(lines[2].driven.get());

        for line in &lines[4..7] {
            line.external.set(true);
        }
        assert_eq!(interface.read().unwrap(), 0x74);

        interface.set_direction(0xFF).unwrap();
        assert!(lines.iter().all(|line| !line.input.get()));
    }

    #[test]
    fn test_open_drain_releases_high() {
        let line = Line::default();
        let mut open_drain = OpenDrain(pin(&line));
        open_drain.set_low().unwrap();
        open_drain.set_input().unwrap();
        assert!(line.driven.get());
        open_drain.set_output().unwrap();
        assert!(open_drain.is_high().unwrap());
    }

    fn polling_display(lines: &[Line; 8]) -> Display<Interface<MockPin<'_>>> {
        let config = Builder::new()
            .sync(SyncStrategy::PollBusyFlag {
                max_polls: 3,
                interval_us: 10,
            })
            .build()
            .unwrap();
        let interface = wire(&config.binding, lines);
        Display::new(interface, config)
    }

    #[test]
    fn test_busy_flag_poll_over_gpio() {
        let lines: [Line; 8] = Default::default();
        let mut display = polling_display(&lines);
        display.write_byte(b'A', &mut NoDelay).unwrap();

        assert!(lines.iter().all(|line| !line.fought.get()));
        assert!(lines.iter().all(|line| !line.input.get()));
    }

    #[test]
    fn test_busy_flag_poll_over_gpio_times_out() {
        let lines: [Line; 8] = Default::default();
        lines[7].external.set(true);
        let mut display = polling_display(&lines);
        let result = display.write_byte(b'A', &mut NoDelay);

        assert!(matches!(result, Err(Error::HardwareTimeout { polls: 3 })));
        assert!(lines.iter().all(|line| !line.fought.get()));
    }

    #[test]
    fn test_pin_error_propagates() {
        let lines: [Line; 8] = Default::default();
        let binding = PortBinding::default();
        let mut interface = Interface::new(
            &binding,
            MockPin {
                line: &lines[3],
                fail: true,
            },
            pin(&lines[2]),
            pin(&lines[1]),
            [
                pin(&lines[4]),
                pin(&lines[5]),
                pin(&lines[6]),
                pin(&lines[7]),
            ],
        );
        assert!(matches!(
            interface.write(0xFF),
            Err(InterfaceError::Pin(MockError))
        ));
    }

    #[test]
    fn test_flag_ignored_without_flag_bit() {
        let lines: [Line; 8] = Default::default();
        let binding = PortBinding {
            flag: None,
            ..PortBinding::default()
        };
        let interface = wire(&binding, &lines).with_flag(&binding, pin(&lines[0]));
        assert!(interface.release()[0].is_none());
    }
}
