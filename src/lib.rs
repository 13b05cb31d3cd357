//! A platform agnostic driver for the MAX7219 LED display driver IC wired to
//! 7-segment digits, built on [`embedded-hal`] traits.
//!
//! The chip is driven over its 3-wire serial interface (DIN, CLK, CS) by
//! bit-banging three output pins, so no SPI peripheral is required. The
//! driver supports both of the chip's decode modes: hardware BCD decode,
//! where the chip maps digit codes to segments itself, and no-decode, where
//! the driver looks up raw segment patterns and can render letters as well
//! as numbers.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/~1.0

#![no_std]

mod constants;

pub use constants::*;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use num_traits::ToPrimitive;

/// Who turns a digit code into lit segments: the chip or this driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeMode {
    /// Hardware Code-B decode; digit registers take BCD codes (0-9, minus,
    /// blank) and only digits and a minus sign can be shown.
    HardwareBcd,
    /// No decode; digit registers take raw segment patterns looked up from
    /// the glyph tables, so arbitrary characters are supported.
    SoftwareSegments,
}

impl DecodeMode {
    fn register_value(self) -> u8 {
        match self {
            DecodeMode::HardwareBcd => register::decode_mode::DECODE_ALL,
            DecodeMode::SoftwareSegments => register::decode_mode::NO_DECODE,
        }
    }

    fn blank_code(self) -> u8 {
        match self {
            DecodeMode::HardwareBcd => bcd::BLANK,
            DecodeMode::SoftwareSegments => SEGMENT_BLANK,
        }
    }
}

/// How logical digit positions map onto the physical digit registers.
///
/// With [`Alignment::Right`] logical position 0 is the rightmost (least
/// significant) digit and maps straight to digit register 0. [`Alignment::Left`]
/// and [`Alignment::Center`] flip the mapping so logical position 0 is the
/// visually leftmost digit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

pub struct Max7219<DIN, CLK, CS, D> {
    din: DIN,
    clk: CLK,
    cs: CS,
    delay: D,
    num_digits: u8,
    mode: DecodeMode,
    alignment: Alignment,
    brightness: u8,
}

impl<DIN, CLK, CS, D, E> Max7219<DIN, CLK, CS, D>
where
    DIN: OutputPin<Error = E>,
    CLK: OutputPin<Error = E>,
    CS: OutputPin<Error = E>,
    D: DelayNs,
{
    /// Creates a driver owning the three bus pins and a delay source.
    ///
    /// `num_digits` is clamped to 1-8. No hardware access happens until
    /// [`Max7219::init`].
    pub fn new(din: DIN, clk: CLK, cs: CS, delay: D, num_digits: u8) -> Self {
        Self {
            din,
            clk,
            cs,
            delay,
            num_digits: num_digits.clamp(1, MAX_DIGITS),
            mode: DecodeMode::HardwareBcd,
            alignment: Alignment::Right,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }

    /// Releases the pins and delay source.
    pub fn destroy(self) -> (DIN, CLK, CS, D) {
        (self.din, self.clk, self.cs, self.delay)
    }

    /// Initializes the chip with the currently configured decode mode.
    ///
    /// Must be called once before any display operation.
    pub fn init(&mut self) -> Result<(), Max7219Error<E>> {
        self.init_with_mode(self.mode)
    }

    /// Initializes the chip: idles the bus, wakes the chip, programs the scan
    /// limit, decode mode and intensity, disables display test and clears.
    pub fn init_with_mode(&mut self, mode: DecodeMode) -> Result<(), Max7219Error<E>> {
        self.cs.set_high()?;
        self.clk.set_low()?;
        self.din.set_low()?;
        self.delay.delay_ms(10);

        self.mode = mode;

        self.write_command(register::SHUTDOWN, register::shutdown_mode::NORMAL_OPERATION)?;
        self.write_command(register::SCAN_LIMIT, self.num_digits - 1)?;
        self.write_command(register::DECODE_MODE, mode.register_value())?;
        self.write_command(register::INTENSITY, self.brightness)?;
        self.write_command(register::DISPLAY_TEST, register::display_test_mode::NORMAL)?;
        self.clear()
    }

    pub fn num_digits(&self) -> u8 {
        self.num_digits
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Switches decode mode and clears the display; prior digit contents are
    /// meaningless in the new mode.
    pub fn set_mode(&mut self, mode: DecodeMode) -> Result<(), Max7219Error<E>> {
        self.mode = mode;
        self.write_command(register::DECODE_MODE, mode.register_value())?;
        self.clear()
    }

    /// Pure configuration change; takes effect on the next render.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    /// Sets intensity, clamped to 0-15.
    pub fn set_brightness(&mut self, level: u8) -> Result<(), Max7219Error<E>> {
        self.brightness = level.min(MAX_INTENSITY);
        self.write_command(register::INTENSITY, self.brightness)
    }

    /// Normal operation (`true`) or low-power shutdown (`false`). Register
    /// contents survive shutdown.
    pub fn set_power(&mut self, on: bool) -> Result<(), Max7219Error<E>> {
        let value = if on {
            register::shutdown_mode::NORMAL_OPERATION
        } else {
            register::shutdown_mode::SHUTDOWN
        };
        self.write_command(register::SHUTDOWN, value)
    }

    /// Writes the blank code of the current mode to every digit.
    pub fn clear(&mut self) -> Result<(), Max7219Error<E>> {
        let blank = self.mode.blank_code();
        for i in 0..self.num_digits {
            self.write_digit(i, blank)?;
        }
        Ok(())
    }

    /// Renders text mode-aware: in [`DecodeMode::SoftwareSegments`] the string is
    /// placed per the current alignment; in [`DecodeMode::HardwareBcd`] the
    /// leading integer of the string is parsed and rendered as a number.
    pub fn display_str(&mut self, text: &str) -> Result<(), Max7219Error<E>> {
        match self.mode {
            DecodeMode::HardwareBcd => self.render_decimal(parse_integer_prefix(text), None),
            DecodeMode::SoftwareSegments => self.render_text(text.as_bytes()),
        }
    }

    /// Renders an integer per the current alignment. Values needing more than
    /// eight digits are truncated to their least significant digits.
    pub fn display_number<T>(&mut self, number: T) -> Result<(), Max7219Error<E>>
    where
        T: ToPrimitive,
    {
        let value = number.to_i64().ok_or(Max7219Error::InvalidValue)?;
        self.render_decimal(value, None)
    }

    /// Renders a fractional number with `decimals` digits after the decimal
    /// point (clamped to `num_digits - 1`), using the decimal-point segment
    /// of the digit left of the fraction.
    pub fn display_float(&mut self, number: f32, decimals: u8) -> Result<(), Max7219Error<E>> {
        let decimals = decimals.min(self.num_digits - 1);
        let mut multiplier: i64 = 1;
        for _ in 0..decimals {
            multiplier *= 10;
        }
        let scaled = (number * multiplier as f32) as i64;
        self.render_decimal(scaled, Some(decimals as usize))
    }

    /// Mode-aware write of a single decimal digit (0-9) at a logical
    /// position. Out-of-range positions are ignored.
    pub fn set_digit(&mut self, position: u8, value: u8, dp: bool) -> Result<(), Max7219Error<E>> {
        if position >= self.num_digits {
            return Ok(());
        }
        let phys = self.physical_position(position);
        let data = match self.mode {
            DecodeMode::HardwareBcd => {
                let mut code = value.min(9);
                if dp {
                    code |= bcd::DOT;
                }
                code
            }
            DecodeMode::SoftwareSegments => {
                let mut segments = if value <= 9 {
                    SEGMENT_DIGITS[value as usize]
                } else {
                    SEGMENT_BLANK
                };
                if dp {
                    segments |= SEGMENT_DOT;
                }
                segments
            }
        };
        self.write_digit(phys, data)
    }

    /// Mode-aware write of a single character at a logical position. In
    /// hardware decode mode only digits and `-` are representable; anything
    /// else renders blank. Out-of-range positions are ignored.
    pub fn set_char(&mut self, position: u8, c: char, dp: bool) -> Result<(), Max7219Error<E>> {
        let byte = if c.is_ascii() { c as u8 } else { 0 };
        self.write_char(position, byte, dp)
    }

    /// Shows `HH MM` with the decimal point of the hours-units digit acting
    /// as separator. No-op on displays narrower than four digits.
    pub fn display_time(&mut self, hours: u8, minutes: u8) -> Result<(), Max7219Error<E>> {
        self.render_time(hours, minutes, None)
    }

    /// Shows `HH MM SS`; separators on the hours-units and minutes-units
    /// digits. No-op on displays narrower than six digits.
    pub fn display_time_with_seconds(
        &mut self,
        hours: u8,
        minutes: u8,
        seconds: u8,
    ) -> Result<(), Max7219Error<E>> {
        self.render_time(hours, minutes, Some(seconds))
    }

    /// Renders a hexadecimal value, least significant nibble at digit
    /// register 0, leading zero nibbles blanked. Hex glyphs need segment
    /// control, so hardware decode mode is switched to
    /// [`DecodeMode::SoftwareSegments`] first and stays there.
    pub fn display_hex(&mut self, value: u32) -> Result<(), Max7219Error<E>> {
        if self.mode == DecodeMode::HardwareBcd {
            self.set_mode(DecodeMode::SoftwareSegments)?;
        }

        let mut rest = value;
        for phys in 0..self.num_digits {
            let nibble = (rest & 0xF) as u8;
            let glyph = if nibble < 10 {
                SEGMENT_DIGITS[nibble as usize]
            } else {
                SEGMENT_LETTERS[(nibble - 10) as usize]
            };
            self.write_digit(phys, glyph)?;

            rest >>= 4;
            if rest == 0 {
                for blank in (phys + 1)..self.num_digits {
                    self.write_digit(blank, SEGMENT_BLANK)?;
                }
                break;
            }
        }
        Ok(())
    }

    /// Renders the eight bits of `value` as `0`/`1` digits, most significant
    /// bit at logical position 0. No-op on displays narrower than eight
    /// digits.
    pub fn display_binary(&mut self, value: u8) -> Result<(), Max7219Error<E>> {
        if self.num_digits < 8 {
            return Ok(());
        }
        for i in 0..8u8 {
            let bit = (value >> (7 - i)) & 1;
            self.set_digit(i, bit, false)?;
        }
        Ok(())
    }

    /// Toggles the display off and on `times` times. Blocks for the full
    /// duration.
    pub fn blink(&mut self, times: u8, interval_ms: u16) -> Result<(), Max7219Error<E>> {
        for _ in 0..times {
            self.set_power(false)?;
            self.delay.delay_ms(interval_ms as u32);
            self.set_power(true)?;
            self.delay.delay_ms(interval_ms as u32);
        }
        Ok(())
    }

    /// Steps intensity from 0 up to 15, then restores the configured
    /// brightness.
    pub fn fade_in(&mut self, interval_ms: u16) -> Result<(), Max7219Error<E>> {
        let original = self.brightness;
        for level in 0..=MAX_INTENSITY {
            self.set_brightness(level)?;
            self.delay.delay_ms(interval_ms as u32);
        }
        self.set_brightness(original)
    }

    /// Steps intensity from the configured brightness down to 0, then
    /// restores it.
    pub fn fade_out(&mut self, interval_ms: u16) -> Result<(), Max7219Error<E>> {
        let original = self.brightness;
        for level in (0..=original).rev() {
            self.set_brightness(level)?;
            self.delay.delay_ms(interval_ms as u32);
        }
        self.set_brightness(original)
    }

    /// Scrolls text across the display from left to right. Scrolling works on
    /// absolute digit register offsets; the alignment setting is not
    /// consulted.
    pub fn scroll_str(&mut self, text: &str, interval_ms: u16) -> Result<(), Max7219Error<E>> {
        self.scroll_bytes(text.as_bytes(), interval_ms)
    }

    /// Formats a number and scrolls it like [`Max7219::scroll_str`].
    pub fn scroll_number<T>(&mut self, number: T, interval_ms: u16) -> Result<(), Max7219Error<E>>
    where
        T: ToPrimitive,
    {
        let value = number.to_i64().ok_or(Max7219Error::InvalidValue)?;
        let mut buf = [0u8; 20];
        let len = format_decimal(value, &mut buf).len();
        self.scroll_bytes(&buf[..len], interval_ms)
    }

    /// Sweeps a lone `8` across all digits, visually left to right and back.
    pub fn chase(&mut self, interval_ms: u16) -> Result<(), Max7219Error<E>> {
        let eight = match self.mode {
            DecodeMode::HardwareBcd => 0x08,
            DecodeMode::SoftwareSegments => SEGMENT_DIGITS[8],
        };
        for phys in (0..self.num_digits).rev() {
            self.clear()?;
            self.write_digit(phys, eight)?;
            self.delay.delay_ms(interval_ms as u32);
        }
        for phys in 0..self.num_digits {
            self.clear()?;
            self.write_digit(phys, eight)?;
            self.delay.delay_ms(interval_ms as u32);
        }
        Ok(())
    }

    /// Renders `from..=to` in sequence. No-op when `from > to`.
    pub fn count_up(&mut self, from: i64, to: i64, interval_ms: u16) -> Result<(), Max7219Error<E>> {
        if from > to {
            return Ok(());
        }
        let mut value = from;
        while value <= to {
            self.render_decimal(value, None)?;
            self.delay.delay_ms(interval_ms as u32);
            value += 1;
        }
        Ok(())
    }

    /// Renders `from..=to` counting downward. No-op when `from < to`.
    pub fn count_down(
        &mut self,
        from: i64,
        to: i64,
        interval_ms: u16,
    ) -> Result<(), Max7219Error<E>> {
        if from < to {
            return Ok(());
        }
        let mut value = from;
        while value >= to {
            self.render_decimal(value, None)?;
            self.delay.delay_ms(interval_ms as u32);
            value -= 1;
        }
        Ok(())
    }

    /// Writes a raw segment byte at a logical position, bypassing the glyph
    /// tables. Only meaningful in no-decode mode; the caller is responsible
    /// for mode correctness.
    pub fn set_segments(&mut self, position: u8, segments: u8) -> Result<(), Max7219Error<E>> {
        if position >= self.num_digits {
            return Ok(());
        }
        let phys = self.physical_position(position);
        self.write_digit(phys, segments)
    }

    /// Writes a raw register value plus optional decimal-point bit at a
    /// logical position, unconditioned on mode.
    pub fn set_raw_digit(
        &mut self,
        position: u8,
        value: u8,
        dp: bool,
    ) -> Result<(), Max7219Error<E>> {
        if position >= self.num_digits {
            return Ok(());
        }
        let phys = self.physical_position(position);
        let mut data = value;
        if dp {
            data |= SEGMENT_DOT;
        }
        self.write_digit(phys, data)
    }

    fn physical_position(&self, logical: u8) -> u8 {
        match self.alignment {
            Alignment::Right => logical,
            Alignment::Left | Alignment::Center => self.num_digits - 1 - logical,
        }
    }

    fn write_char(&mut self, position: u8, c: u8, dp: bool) -> Result<(), Max7219Error<E>> {
        if position >= self.num_digits {
            return Ok(());
        }
        let phys = self.physical_position(position);
        let data = self.encode_char(c, dp);
        self.write_digit(phys, data)
    }

    fn encode_char(&self, c: u8, dp: bool) -> u8 {
        match self.mode {
            DecodeMode::HardwareBcd => match c {
                b'0'..=b'9' => {
                    let mut code = c - b'0';
                    if dp {
                        code |= bcd::DOT;
                    }
                    code
                }
                b'-' => bcd::MINUS,
                _ => bcd::BLANK,
            },
            DecodeMode::SoftwareSegments => {
                let mut segments = char_to_segments(c);
                if dp {
                    segments |= SEGMENT_DOT;
                }
                segments
            }
        }
    }

    // Shared by the integer, float, string-fallback and counting paths.
    // `dp_index` is the index, counted from the least significant digit, of
    // the digit that carries the decimal point.
    fn render_decimal(
        &mut self,
        value: i64,
        dp_index: Option<usize>,
    ) -> Result<(), Max7219Error<E>> {
        self.clear()?;

        let negative = value < 0;
        let mut rest = value.unsigned_abs();

        // least significant first, capped at the register count
        let mut digits = [0u8; MAX_DIGITS as usize];
        let mut count = 1;
        if rest > 0 {
            count = 0;
            while rest > 0 && count < MAX_DIGITS as usize {
                digits[count] = (rest % 10) as u8;
                rest /= 10;
                count += 1;
            }
        }

        let start = match self.alignment {
            Alignment::Center => self.num_digits.saturating_sub(count as u8) / 2,
            Alignment::Left | Alignment::Right => 0,
        };

        let mut last_pos = 0;
        let mut shown = false;
        for i in (0..count).rev() {
            let pos = match self.alignment {
                Alignment::Right => i as u8,
                Alignment::Left => (count - 1 - i) as u8,
                Alignment::Center => start + (count - 1 - i) as u8,
            };
            self.set_digit(pos, digits[i], dp_index == Some(i))?;
            shown = true;
            last_pos = pos;
        }

        // The minus sign gets the slot outside the rendered span; if that
        // slot coincides with a digit or falls off the display it is dropped.
        if negative && shown {
            let leftmost = match self.alignment {
                Alignment::Left => 0,
                Alignment::Center => start.saturating_sub(1),
                Alignment::Right => self.num_digits - 1,
            };
            if leftmost != last_pos && leftmost < self.num_digits {
                self.write_char(leftmost, b'-', false)?;
            }
        }
        Ok(())
    }

    fn render_text(&mut self, bytes: &[u8]) -> Result<(), Max7219Error<E>> {
        self.clear()?;

        let n = self.num_digits as usize;
        let len = bytes.len();
        if len <= n {
            match self.alignment {
                // reversed so the first character lands visually leftmost
                Alignment::Right => {
                    for i in 0..len {
                        self.write_char((len - 1 - i) as u8, bytes[i], false)?;
                    }
                }
                Alignment::Left => {
                    for (i, &b) in bytes.iter().enumerate() {
                        self.write_char(i as u8, b, false)?;
                    }
                }
                Alignment::Center => {
                    let start = (n - len) / 2;
                    for (i, &b) in bytes.iter().enumerate() {
                        self.write_char((start + i) as u8, b, false)?;
                    }
                }
            }
        } else {
            // keep the tail; the window fills the display so alignment has
            // no visible effect beyond the position numbering
            let tail = &bytes[len - n..];
            match self.alignment {
                Alignment::Right => {
                    for i in 0..n {
                        self.write_char((n - 1 - i) as u8, tail[i], false)?;
                    }
                }
                Alignment::Left | Alignment::Center => {
                    for (i, &b) in tail.iter().enumerate() {
                        self.write_char(i as u8, b, false)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn render_time(
        &mut self,
        hours: u8,
        minutes: u8,
        seconds: Option<u8>,
    ) -> Result<(), Max7219Error<E>> {
        let width: u8 = if seconds.is_some() { 6 } else { 4 };
        if self.num_digits < width {
            return Ok(());
        }

        let hours = hours.min(99);
        let minutes = minutes.min(59);

        let mut field = [(0u8, false); 6];
        field[0] = (hours / 10, false);
        field[1] = (hours % 10, true);
        field[2] = (minutes / 10, false);
        field[3] = (minutes % 10, seconds.is_some());
        if let Some(seconds) = seconds {
            let seconds = seconds.min(59);
            field[4] = (seconds / 10, false);
            field[5] = (seconds % 10, false);
        }

        self.clear()?;

        let w = width as usize;
        match self.alignment {
            Alignment::Right => {
                for (i, &(digit, dp)) in field[..w].iter().enumerate() {
                    self.set_digit((w - 1 - i) as u8, digit, dp)?;
                }
            }
            Alignment::Left => {
                for (i, &(digit, dp)) in field[..w].iter().enumerate() {
                    self.set_digit(i as u8, digit, dp)?;
                }
            }
            Alignment::Center => {
                let start = (self.num_digits - width) / 2;
                for (i, &(digit, dp)) in field[..w].iter().enumerate() {
                    self.set_digit(start + i as u8, digit, dp)?;
                }
            }
        }
        Ok(())
    }

    fn scroll_bytes(&mut self, bytes: &[u8], interval_ms: u16) -> Result<(), Max7219Error<E>> {
        let len = bytes.len() as i16;
        let n = self.num_digits as i16;

        let mut offset = n - 1;
        while offset >= -len {
            self.clear()?;
            for (i, &b) in bytes.iter().enumerate() {
                let pos = offset + i as i16;
                if (0..n).contains(&pos) {
                    let data = self.encode_char(b, false);
                    self.write_digit(pos as u8, data)?;
                }
            }
            self.delay.delay_ms(interval_ms as u32);
            offset -= 1;
        }
        Ok(())
    }

    fn write_digit(&mut self, physical: u8, data: u8) -> Result<(), Max7219Error<E>> {
        self.write_command(register::DIGIT_OFFSET + physical, data)
    }

    // One 16-bit frame: address byte then data byte, MSB first, CS framed.
    fn write_command(&mut self, address: u8, data: u8) -> Result<(), Max7219Error<E>> {
        self.cs.set_low()?;
        self.delay.delay_us(1);
        self.write_byte(address)?;
        self.write_byte(data)?;
        self.delay.delay_us(1);
        self.cs.set_high()?;
        self.delay.delay_us(1);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Max7219Error<E>> {
        for bit in (0..8u8).rev() {
            if (byte >> bit) & 1 == 1 {
                self.din.set_high()?;
            } else {
                self.din.set_low()?;
            }
            self.delay.delay_us(1);
            self.clk.set_high()?;
            self.delay.delay_us(1);
            self.clk.set_low()?;
        }
        Ok(())
    }
}

// atol-style: skip leading whitespace, optional sign, digits until the first
// non-digit; saturates instead of wrapping.
fn parse_integer_prefix(text: &str) -> i64 {
    let bytes = text.trim_start().as_bytes();
    let (negative, digits) = match bytes.first().copied() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            break;
        }
        value = value
            .saturating_mul(10)
            .saturating_add((b - b'0') as i64);
    }
    if negative {
        -value
    } else {
        value
    }
}

fn format_decimal(value: i64, buf: &mut [u8; 20]) -> &[u8] {
    if value == 0 {
        buf[0] = b'0';
        return &buf[..1];
    }

    let negative = value < 0;
    let mut rest = value.unsigned_abs();
    let mut len = 0;
    while rest > 0 {
        buf[len] = b'0' + (rest % 10) as u8;
        rest /= 10;
        len += 1;
    }
    if negative {
        buf[len] = b'-';
        len += 1;
    }
    buf[..len].reverse();
    &buf[..len]
}

#[derive(Clone, Copy, Debug)]
pub enum Max7219Error<E> {
    /// A bus pin reported a failure.
    Pin(E),
    /// A numeric argument could not be converted to a machine integer.
    InvalidValue,
}

impl<E> From<E> for Max7219Error<E> {
    fn from(error: E) -> Self {
        Max7219Error::Pin(error)
    }
}
