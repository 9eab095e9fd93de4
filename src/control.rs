//! Display control counter and its external trigger
//!
//! A caller-driven cycle through cursor styles, usually advanced by a push
//! button. The counter only holds state; [`Display::display_control`]
//! interprets it.
//!
//! | State | Action                     |
//! |-------|----------------------------|
//! | 0     | none                       |
//! | 1     | `0x0D` blinking cursor     |
//! | 2     | `0x0E` underline cursor    |
//! | 3     | `0x0C` no cursor           |
//! | 4     | reset to 0                 |
//!
//! [`Display::display_control`]: crate::display::Display::display_control
//!
//! ## Example
//!
//! ```rust,no_run
//! use ks0066::{ButtonTrigger, DisplayControlCounter};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::InputPin;
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! let mut button = ButtonTrigger::new(MockPin);
//! let mut counter = DisplayControlCounter::new();
//!
//! if let Ok(true) = counter.poll(&mut button) {
//!     // display.display_control(&mut counter, &mut delay)
//! }
//! ```

use embedded_hal::digital::InputPin;

/// Last state of the cycle; reaching it resets the counter
pub const COUNTER_RESET_STATE: u8 = 4;

/// Cursor-style cycle counter (0..=4)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DisplayControlCounter {
    state: u8,
}

impl DisplayControlCounter {
    /// Create a counter in the idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn value(&self) -> u8 {
        self.state
    }

    /// Advance one state
    ///
    /// Saturates at the reset state so it cannot be skipped.
    pub fn increment(&mut self) {
        if self.state < COUNTER_RESET_STATE {
            self.state += 1;
        }
    }

    /// Return to idle
    pub fn reset(&mut self) {
        self.state = 0;
    }

    /// Advance if `trigger` fired
    ///
    /// Returns whether the event occurred.
    pub fn poll<T: ControlTrigger>(&mut self, trigger: &mut T) -> Result<bool, T::Error> {
        let fired = trigger.triggered()?;
        if fired {
            self.increment();
        }
        Ok(fired)
    }
}

/// Source of "advance the counter" events
pub trait ControlTrigger {
    /// Error reading the event source
    type Error;

    /// Whether an event is pending
    fn triggered(&mut self) -> Result<bool, Self::Error>;
}

/// Active-low push button
pub struct ButtonTrigger<P> {
    pin: P,
}

impl<P: InputPin> ButtonTrigger<P> {
    /// Wrap a button pin (pressed = low)
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> ControlTrigger for ButtonTrigger<P> {
    type Error = P::Error;

    fn triggered(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_low()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct MockButton {
        pressed: bool,
    }

    impl ErrorType for MockButton {
        type Error = Infallible;
    }

    impl InputPin for MockButton {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.pressed)
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.pressed)
        }
    }

    #[test]
    fn test_increment_saturates_at_reset_state() {
        let mut counter = DisplayControlCounter::new();
        for _ in 0..10 {
            counter.increment();
        }
        assert_eq!(counter.value(), COUNTER_RESET_STATE);
        counter.reset();
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_poll_pressed_button_advances() {
        let mut counter = DisplayControlCounter::new();
        let mut button = ButtonTrigger::new(MockButton { pressed: true });
        assert_eq!(counter.poll(&mut button), Ok(true));
        assert_eq!(counter.value(), 1);
    }

    #[test]
    fn test_poll_released_button_keeps_state() {
        let mut counter = DisplayControlCounter::new();
        let mut button = ButtonTrigger::new(MockButton { pressed: false });
        assert_eq!(counter.poll(&mut button), Ok(false));
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_custom_trigger() {
        struct Queue(u8);
        impl ControlTrigger for Queue {
            type Error = ();
            fn triggered(&mut self) -> Result<bool, ()> {
                if self.0 == 0 {
                    return Ok(false);
                }
                self.0 -= 1;
                Ok(true)
            }
        }

        let mut counter = DisplayControlCounter::new();
        let mut events = Queue(2);
        while counter.poll(&mut events) == Ok(true) {}
        assert_eq!(counter.value(), 2);
    }
}
