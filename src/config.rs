//! Display configuration types and builder

use crate::command::{DEFAULT_BUSY_DELAY_US, NIBBLE_SETTLE_US};
pub use crate::error::BuilderError;

/// Mode configuration word
///
/// Seven flags consumed once by [`Display::init`](crate::display::Display::init)
/// to derive the function-set, display-control and entry-mode instructions.
///
/// | Bit | Flag           |
/// |-----|----------------|
/// | 6   | `two_lines`    |
/// | 5   | `large_font`   |
/// | 4   | `display_on`   |
/// | 3   | `cursor_on`    |
/// | 2   | `blink_on`     |
/// | 1   | `increment`    |
/// | 0   | `entire_shift` |
///
/// Bit 7 is reserved and ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeConfig {
    /// Two-line display (N)
    pub two_lines: bool,
    /// 5x11 font instead of 5x8 (F)
    pub large_font: bool,
    /// Display on (D)
    pub display_on: bool,
    /// Underline cursor visible (C)
    pub cursor_on: bool,
    /// Cursor blinks (B)
    pub blink_on: bool,
    /// Address counter increments after each write (I/D)
    pub increment: bool,
    /// Shift the entire display on each write (S)
    pub entire_shift: bool,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            two_lines: false,
            large_font: false,
            display_on: true,
            cursor_on: false,
            blink_on: false,
            increment: false,
            entire_shift: false,
        }
    }
}

impl ModeConfig {
    /// Decode a mode word
    ///
    /// The display is always switched on at initialization, so `display_on`
    /// is set whatever bit 4 says.
    ///
    /// ```
    /// use ks0066::ModeConfig;
    ///
    /// let mode = ModeConfig::from_bits((1 << 3) | (1 << 2));
    /// assert!(mode.cursor_on && mode.blink_on);
    /// assert!(mode.display_on);
    /// ```
    pub fn from_bits(bits: u8) -> Self {
        let bit = |n: u8| bits & (1 << n) != 0;
        Self {
            two_lines: bit(6),
            large_font: bit(5),
            display_on: true,
            cursor_on: bit(3),
            blink_on: bit(2),
            increment: bit(1),
            entire_shift: bit(0),
        }
    }

    /// Encode back into a mode word (bit 7 always clear)
    pub fn bits(&self) -> u8 {
        (self.two_lines as u8) << 6
            | (self.large_font as u8) << 5
            | (self.display_on as u8) << 4
            | (self.cursor_on as u8) << 3
            | (self.blink_on as u8) << 2
            | (self.increment as u8) << 1
            | self.entire_shift as u8
    }

    /// Function-set nibble: `0 0 N F`
    pub fn function_set(&self) -> u8 {
        (self.two_lines as u8) << 3 | (self.large_font as u8) << 2
    }

    /// Display-control nibble: `1 D C B`
    pub fn display_control(&self) -> u8 {
        1 << 3 | (self.display_on as u8) << 2 | (self.cursor_on as u8) << 1 | self.blink_on as u8
    }

    /// Entry-mode nibble: `0 1 I/D S`
    pub fn entry_mode(&self) -> u8 {
        1 << 2 | (self.increment as u8) << 1 | self.entire_shift as u8
    }
}

/// Port binding
///
/// Bit positions of the control lines and the data nibble on the 8-bit port.
/// The default matches the reference circuit:
///
/// | Bit | Line |
/// |-----|------|
/// | 7-4 | DB7-DB4 |
/// | 3   | EN   |
/// | 2   | RW   |
/// | 1   | RS   |
/// | 0   | FLAG |
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortBinding {
    /// Enable strobe bit
    pub enable: u8,
    /// Read/write bit (high = read)
    pub read_write: u8,
    /// Register select bit (high = data register)
    pub register_select: u8,
    /// Status LED bit, lit while waiting for the controller
    pub flag: Option<u8>,
    /// Bit of DB4; DB4..DB7 occupy `data_shift..data_shift + 4`
    pub data_shift: u8,
    /// Output-enable mask written to the direction register
    pub direction: u8,
}

impl Default for PortBinding {
    fn default() -> Self {
        Self {
            enable: 3,
            read_write: 2,
            register_select: 1,
            flag: Some(0),
            data_shift: 4,
            direction: 0xFF,
        }
    }
}

impl PortBinding {
    /// Enable strobe mask
    pub fn enable_mask(&self) -> u8 {
        bit_mask(self.enable)
    }

    /// Read/write mask
    pub fn read_write_mask(&self) -> u8 {
        bit_mask(self.read_write)
    }

    /// Register select mask
    pub fn register_select_mask(&self) -> u8 {
        bit_mask(self.register_select)
    }

    /// Flag mask (0 when no flag line is bound)
    pub fn flag_mask(&self) -> u8 {
        self.flag.map_or(0, bit_mask)
    }

    /// Mask covering DB4..DB7
    pub fn data_mask(&self) -> u8 {
        self.data_bits(0x0F)
    }

    /// Mask of DB7, where the busy flag appears on a read
    pub fn busy_mask(&self) -> u8 {
        bit_mask(self.data_shift.saturating_add(3))
    }

    /// Place a nibble on the data lines
    ///
    /// Bits shifted past the port are dropped.
    pub fn data_bits(&self, nibble: u8) -> u8 {
        (nibble & 0x0F)
            .checked_shl(u32::from(self.data_shift))
            .unwrap_or(0)
    }

    fn validate(&self) -> Result<(), BuilderError> {
        if self.data_shift > 4 {
            return Err(BuilderError::InvalidDataShift {
                shift: self.data_shift,
            });
        }

        let mut claimed = self.data_mask();
        let lines = [
            Some(self.enable),
            Some(self.read_write),
            Some(self.register_select),
            self.flag,
        ];
        for bit in lines.into_iter().flatten() {
            if bit > 7 {
                return Err(BuilderError::InvalidBit { bit });
            }
            if claimed & (1 << bit) != 0 {
                return Err(BuilderError::PinConflict { bit });
            }
            claimed |= 1 << bit;
        }
        Ok(())
    }
}

/// Mask of a single port bit, 0 for bits past the port
fn bit_mask(bit: u8) -> u8 {
    1u8.checked_shl(u32::from(bit)).unwrap_or(0)
}

/// How the driver waits for the controller after each write
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SyncStrategy {
    /// Block for a fixed time above the worst-case busy period
    FixedDelay {
        /// Wait in microseconds
        us: u32,
    },
    /// Read the busy flag on DB7 until it clears
    PollBusyFlag {
        /// Polls before [`Error::HardwareTimeout`](crate::Error::HardwareTimeout)
        max_polls: u32,
        /// Wait between polls in microseconds
        interval_us: u32,
    },
}

impl Default for SyncStrategy {
    fn default() -> Self {
        Self::FixedDelay {
            us: DEFAULT_BUSY_DELAY_US,
        }
    }
}

/// Display configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Mode flags applied at initialization
    pub mode: ModeConfig,
    /// Port bit layout
    pub binding: PortBinding,
    /// Synchronization after each write
    pub sync: SyncStrategy,
    /// Settle time after each enable strobe, in microseconds
    pub settle_us: u32,
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use ks0066::{Builder, ModeConfig, SyncStrategy};
///
/// let config = match Builder::new()
///     .mode(ModeConfig::from_bits(1 << 6))
///     .sync(SyncStrategy::PollBusyFlag { max_polls: 100, interval_us: 10 })
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert!(config.mode.two_lines);
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    mode: ModeConfig,
    binding: PortBinding,
    sync: SyncStrategy,
    settle_us: Option<u32>,
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mode flags
    pub fn mode(mut self, mode: ModeConfig) -> Self {
        self.mode = mode;
        self
    }

    /// Set the mode flags from a raw mode word
    pub fn mode_bits(mut self, bits: u8) -> Self {
        self.mode = ModeConfig::from_bits(bits);
        self
    }

    /// Set the port bit layout
    pub fn binding(mut self, binding: PortBinding) -> Self {
        self.binding = binding;
        self
    }

    /// Set the synchronization strategy
    pub fn sync(mut self, sync: SyncStrategy) -> Self {
        self.sync = sync;
        self
    }

    /// Set the settle time after each enable strobe
    pub fn settle_us(mut self, us: u32) -> Self {
        self.settle_us = Some(us);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns a [`BuilderError`] if the port binding is inconsistent.
    pub fn build(self) -> Result<Config, BuilderError> {
        self.binding.validate()?;
        Ok(Config {
            mode: self.mode,
            binding: self.binding,
            sync: self.sync,
            settle_us: self.settle_us.unwrap_or(NIBBLE_SETTLE_US),
        })
    }
}
