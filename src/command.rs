//! KS0066 instruction opcodes and datasheet delays
//!
//! Every instruction is one byte written with RS low. In 4-bit mode the byte
//! travels as two nibbles, most significant first (see
//! [`Display::write_command`](crate::display::Display::write_command)).
//!
//! Delays are in microseconds and sit above the datasheet minimums, since the
//! driver runs open loop and relies on worst-case margins.

// Instructions

/// Clear display (0x01)
///
/// Fills DDRAM with spaces and returns the cursor home. Slow: 1.53 ms.
pub const CLEAR_DISPLAY: u8 = 0x01;

/// Return home (0x02)
///
/// Also the "function set, 4-bit" nibble sent twice at power on.
pub const RETURN_HOME: u8 = 0x02;

/// Function set nibble forcing 4-bit mode (0x02)
pub const FUNCTION_SET_4BIT: u8 = 0x02;

/// Shift display right (0x14)
pub const SHIFT_RIGHT: u8 = 0x14;

/// Shift display left (0x10)
pub const SHIFT_LEFT: u8 = 0x10;

/// Entry mode autoscroll (0x1C)
pub const ENTRY_AUTOSCROLL: u8 = 0x1C;

/// Display control with cursor and blink off (0x0C)
///
/// Clears any cursor style while leaving the display lit.
pub const DISPLAY_OFF: u8 = 0x0C;

/// Display control with blinking block cursor (0x0D)
pub const DISPLAY_BLINK: u8 = 0x0D;

/// Display control with underline cursor (0x0E)
pub const DISPLAY_CURSOR: u8 = 0x0E;

/// Set CGRAM address (0x40 | address)
///
/// Each glyph occupies 8 consecutive rows, so glyph `n` starts at `0x40 + n * 8`.
pub const SET_CGRAM_ADDR: u8 = 0x40;

/// Set DDRAM address (0x80 | address)
pub const SET_DDRAM_ADDR: u8 = 0x80;

/// DDRAM offset of the second line (0x40)
pub const DDRAM_SECOND_LINE: u8 = 0x40;

/// Number of user-definable glyphs in CGRAM
pub const GLYPH_COUNT: u8 = 8;

/// Rows per glyph
pub const GLYPH_ROWS: usize = 8;

// Delays (microseconds)

/// Post-delay for clear and home
pub const CLEAR_DELAY_US: u32 = 1_530;

/// Post-delay for shift, entry-mode and display control instructions
pub const SHORT_DELAY_US: u32 = 40;

/// Post-delay after a display control counter step
pub const CONTROL_STEP_DELAY_US: u32 = 40_000;

/// Power-on wait before the first instruction (datasheet: 30 ms)
pub const POWER_ON_DELAY_US: u32 = 40_000;

/// Wait between initialization steps (datasheet: 39 us)
pub const INIT_STEP_DELAY_US: u32 = 45;

/// Wait after the initial clear (datasheet: 1.53 ms)
pub const INIT_CLEAR_DELAY_US: u32 = 1_800;

/// Settle time after each enable strobe
pub const NIBBLE_SETTLE_US: u32 = 1_000;

/// Enable high time before the falling edge, in nanoseconds (datasheet: 450 ns)
pub const ENABLE_PULSE_NS: u32 = 450;

/// Fixed wait standing in for the busy flag
pub const DEFAULT_BUSY_DELAY_US: u32 = 1_530;
