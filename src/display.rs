//! Core display operations

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use heapless::String;
use log::{debug, trace, warn};

use crate::command::{
    CLEAR_DELAY_US, CLEAR_DISPLAY, CONTROL_STEP_DELAY_US, DDRAM_SECOND_LINE, DISPLAY_BLINK,
    DISPLAY_CURSOR, DISPLAY_OFF, ENABLE_PULSE_NS, ENTRY_AUTOSCROLL, FUNCTION_SET_4BIT,
    GLYPH_COUNT, GLYPH_ROWS, INIT_CLEAR_DELAY_US, INIT_STEP_DELAY_US, POWER_ON_DELAY_US, RETURN_HOME, SET_CGRAM_ADDR,
    SET_DDRAM_ADDR, SHIFT_LEFT, SHIFT_RIGHT, SHORT_DELAY_US,
};
use crate::config::{Config, SyncStrategy};
use crate::control::{COUNTER_RESET_STATE, DisplayControlCounter};
use crate::error::Error;
use crate::interface::{DisplayInterface, InterruptGuard, NoInterruptGuard};

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Length of `i32::MIN` rendered in decimal
const INT_BUFFER_LEN: usize = 11;

/// Controller register addressed by a write (RS line)
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Register {
    /// Instruction register (RS low)
    Instruction,
    /// Data register (RS high), DDRAM or CGRAM
    Data,
}

/// Core display driver for KS0066
///
/// Owns the port, the configuration and the interrupt guard. Every operation
/// blocks until the controller can accept the next instruction.
pub struct Display<I, G = NoInterruptGuard>
where
    I: DisplayInterface,
    G: InterruptGuard,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Critical section around each primitive write
    guard: G,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    pub fn new(interface: I, config: Config) -> Self {
        Self::with_guard(interface, config, NoInterruptGuard)
    }
}

impl<I, G> Display<I, G>
where
    I: DisplayInterface,
    G: InterruptGuard,
{
    /// Create a new Display that wraps every primitive write in `guard`
    pub fn with_guard(interface: I, config: Config, guard: G) -> Self {
        Self {
            interface,
            config,
            guard,
        }
    }

    /// Run the power-on initialization sequence
    ///
    /// Open loop: a missing display is not detected here.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let mode = self.config.mode;
        debug!("init: mode word {:#04x}", mode.bits());

        self.set_direction(self.config.binding.direction)?;
        delay.delay_us(POWER_ON_DELAY_US);

        // Function set, twice to leave any half-finished 8-bit transfer
        self.write_command(Register::Instruction, FUNCTION_SET_4BIT, delay)?;
        self.write_command(Register::Instruction, FUNCTION_SET_4BIT, delay)?;
        self.write_command(Register::Instruction, mode.function_set(), delay)?;
        delay.delay_us(INIT_STEP_DELAY_US);

        // Display on/off control
        self.write_command(Register::Instruction, 0x00, delay)?;
        self.write_command(Register::Instruction, mode.display_control(), delay)?;
        delay.delay_us(INIT_STEP_DELAY_US);

        self.write_command(Register::Instruction, CLEAR_DISPLAY, delay)?;
        delay.delay_us(INIT_CLEAR_DELAY_US);

        // Entry mode set
        self.write_command(Register::Instruction, 0x00, delay)?;
        self.write_command(Register::Instruction, mode.entry_mode(), delay)?;

        debug!("init: done");
        Ok(())
    }

    /// Write one byte as two nibbles, most significant first
    ///
    /// Each nibble is placed on DB4..DB7 together with RS and a high enable
    /// line, then latched by dropping enable. The controller is given time to
    /// finish before this returns (see [`SyncStrategy`]).
    pub fn write_command<D: DelayNs>(
        &mut self,
        register: Register,
        byte: u8,
        delay: &mut D,
    ) -> DisplayResult<I> {
        self.guard.acquire();
        let result = self.write_nibbles(register, byte, delay);
        self.guard.release();
        result?;
        self.wait_ready(delay)
    }

    fn write_nibbles<D: DelayNs>(
        &mut self,
        register: Register,
        byte: u8,
        delay: &mut D,
    ) -> DisplayResult<I> {
        let binding = self.config.binding;
        // All lines out, RW low
        self.set_direction(binding.direction)?;

        let rs = match register {
            Register::Instruction => 0,
            Register::Data => binding.register_select_mask(),
        };
        for nibble in [byte >> 4, byte & 0x0F] {
            trace!("nibble {:04b} rs={}", nibble, rs != 0);
            let value = binding.data_bits(nibble) | rs;
            self.write_port(value | binding.enable_mask())?;
            delay.delay_ns(ENABLE_PULSE_NS);
            self.write_port(value)?;
            delay.delay_us(self.config.settle_us);
        }
        Ok(())
    }

    /// Wait until the controller can take the next instruction
    ///
    /// The flag line, if bound, is high for the duration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HardwareTimeout`] if the busy flag is still set after
    /// `max_polls` reads.
    pub fn wait_ready<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        match self.config.sync {
            SyncStrategy::FixedDelay { us } => {
                self.write_port(self.config.binding.flag_mask())?;
                delay.delay_us(us);
                self.write_port(0)
            }
            SyncStrategy::PollBusyFlag {
                max_polls,
                interval_us,
            } => self.poll_busy_flag(max_polls, interval_us, delay),
        }
    }

    fn poll_busy_flag<D: DelayNs>(
        &mut self,
        max_polls: u32,
        interval_us: u32,
        delay: &mut D,
    ) -> DisplayResult<I> {
        let binding = self.config.binding;
        let result = self.read_busy_flag(max_polls, interval_us, delay);

        // Give the data lines back even if the read failed
        let restored = self
            .write_port(0)
            .and_then(|()| self.set_direction(binding.direction));
        let (ready, polls) = result?;
        restored?;

        if !ready {
            warn!("busy flag still set after {} polls", polls);
            return Err(Error::HardwareTimeout { polls });
        }
        trace!("ready after {} polls", polls);
        Ok(())
    }

    fn read_busy_flag<D: DelayNs>(
        &mut self,
        max_polls: u32,
        interval_us: u32,
        delay: &mut D,
    ) -> core::result::Result<(bool, u32), Error<I>> {
        let binding = self.config.binding;
        let read = binding.read_write_mask() | binding.flag_mask();
        let strobe = read | binding.enable_mask();

        self.set_direction(binding.direction & !binding.data_mask())?;
        self.write_port(read)?;

        let mut polls = 0;
        while polls < max_polls {
            polls += 1;

            self.write_port(strobe)?;
            delay.delay_ns(ENABLE_PULSE_NS);
            let status = self.interface.read().map_err(Error::Interface)?;
            self.write_port(read)?;
            // Second nibble carries the address counter low bits
            self.write_port(strobe)?;
            delay.delay_ns(ENABLE_PULSE_NS);
            self.write_port(read)?;

            if status & binding.busy_mask() == 0 {
                return Ok((true, polls));
            }
            delay.delay_us(interval_us);
        }
        Ok((false, polls))
    }

    /// Clear display and return the cursor home
    pub fn clear<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.instruction(CLEAR_DISPLAY, CLEAR_DELAY_US, delay)
    }

    /// Return the cursor and display shift home
    pub fn home<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.instruction(RETURN_HOME, CLEAR_DELAY_US, delay)
    }

    /// Shift the display one position right
    pub fn shift_right<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.instruction(SHIFT_RIGHT, SHORT_DELAY_US, delay)
    }

    /// Shift the display one position left
    pub fn shift_left<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.instruction(SHIFT_LEFT, SHORT_DELAY_US, delay)
    }

    /// Autoscroll (0x1C)
    pub fn autoscroll<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.instruction(ENTRY_AUTOSCROLL, SHORT_DELAY_US, delay)
    }

    /// Turn the cursor and blink off (0x0C)
    pub fn display_off<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.instruction(DISPLAY_OFF, SHORT_DELAY_US, delay)
    }

    /// Apply the current state of a [`DisplayControlCounter`]
    ///
    /// States 1 to 3 select a cursor style, state 4 resets the counter and
    /// state 0 does nothing.
    pub fn display_control<D: DelayNs>(
        &mut self,
        counter: &mut DisplayControlCounter,
        delay: &mut D,
    ) -> DisplayResult<I> {
        let opcode = match counter.value() {
            1 => DISPLAY_BLINK,
            2 => DISPLAY_CURSOR,
            3 => DISPLAY_OFF,
            COUNTER_RESET_STATE => {
                counter.reset();
                return Ok(());
            }
            _ => return Ok(()),
        };
        self.instruction(opcode, CONTROL_STEP_DELAY_US, delay)
    }

    /// Move to `glyph_code` on the first or second line and write `text`
    ///
    /// `extended` selects the second line. Stops at the first NUL byte.
    pub fn write_char<D: DelayNs>(
        &mut self,
        extended: bool,
        glyph_code: u8,
        text: &str,
        delay: &mut D,
    ) -> DisplayResult<I> {
        let mut address = glyph_code | SET_DDRAM_ADDR;
        if extended {
            address |= DDRAM_SECOND_LINE;
        }
        self.write_command(Register::Instruction, address, delay)?;
        self.write_string(text, delay)
    }

    /// Write `text` at the cursor, stopping at the first NUL byte
    pub fn write_string<D: DelayNs>(&mut self, text: &str, delay: &mut D) -> DisplayResult<I> {
        self.write_bytes(text.as_bytes(), delay)
    }

    /// Write raw character codes at the cursor, stopping at the first NUL byte
    pub fn write_bytes<D: DelayNs>(&mut self, bytes: &[u8], delay: &mut D) -> DisplayResult<I> {
        for &byte in bytes.iter().take_while(|&&byte| byte != 0) {
            self.write_byte(byte, delay)?;
        }
        Ok(())
    }

    /// Write a single character code at the cursor
    ///
    /// Unlike [`write_string`](Self::write_string) this accepts code 0, the
    /// first custom glyph.
    pub fn write_byte<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> DisplayResult<I> {
        self.write_command(Register::Data, byte, delay)
    }

    /// Write `value` in decimal at the cursor
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatOverflow`] if the digits do not fit the buffer.
    pub fn write_int<D: DelayNs>(&mut self, value: i32, delay: &mut D) -> DisplayResult<I> {
        let mut buffer: String<INT_BUFFER_LEN> = String::new();
        write!(buffer, "{value}").map_err(|_| Error::FormatOverflow)?;
        self.write_string(&buffer, delay)
    }

    /// Store a custom glyph in CGRAM slot `location`
    ///
    /// Each row uses the low 5 bits. Locations past 7 are ignored. The
    /// address pointer is moved back to DDRAM afterwards.
    pub fn load_glyph<D: DelayNs>(
        &mut self,
        location: u8,
        rows: &[u8; GLYPH_ROWS],
        delay: &mut D,
    ) -> DisplayResult<I> {
        if location >= GLYPH_COUNT {
            warn!("glyph location {} out of range, ignored", location);
            return Ok(());
        }
        debug!("load glyph {}", location);
        self.write_command(Register::Instruction, SET_CGRAM_ADDR + location * 8, delay)?;
        for &row in rows {
            self.write_command(Register::Data, row, delay)?;
        }
        self.write_command(Register::Instruction, SET_DDRAM_ADDR, delay)
    }

    /// Print custom glyph `location` at the cursor
    ///
    /// Locations past 7 are ignored.
    pub fn write_glyph<D: DelayNs>(&mut self, location: u8, delay: &mut D) -> DisplayResult<I> {
        if location >= GLYPH_COUNT {
            return Ok(());
        }
        self.write_byte(location, delay)
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the underlying interface
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Give back the interface and guard
    pub fn release(self) -> (I, G) {
        (self.interface, self.guard)
    }

    fn instruction<D: DelayNs>(
        &mut self,
        opcode: u8,
        post_us: u32,
        delay: &mut D,
    ) -> DisplayResult<I> {
        debug!("instruction {:#04x}", opcode);
        self.write_command(Register::Instruction, opcode, delay)?;
        delay.delay_us(post_us);
        Ok(())
    }

    fn set_direction(&mut self, mask: u8) -> DisplayResult<I> {
        self.interface.set_direction(mask).map_err(Error::Interface)
    }

    fn write_port(&mut self, value: u8) -> DisplayResult<I> {
        self.interface.write(value).map_err(Error::Interface)
    }
}
