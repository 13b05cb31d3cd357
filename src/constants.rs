pub const MAX_DIGITS: u8 = 8;
pub const MAX_INTENSITY: u8 = 15; // 4 bits
pub const DEFAULT_BRIGHTNESS: u8 = 8;

// Segment bit layout: DP-A-B-C-D-E-F-G
pub const SEGMENT_DIGITS: [u8; 10] = [
    0x7E, 0x30, 0x6D, 0x79, 0x33, 0x5B, 0x5F, 0x70, 0x7F, 0x7B,
];
// A-Z; the first six double as hex digits A-F
pub const SEGMENT_LETTERS: [u8; 26] = [
    0x77, 0x1F, 0x4E, 0x3D, 0x4F, 0x47, 0x5E, 0x37, 0x06, 0x3C, 0x57, 0x0E, 0x54, 0x15, 0x7E, 0x67,
    0x73, 0x05, 0x5B, 0x0F, 0x3E, 0x1C, 0x2A, 0x37, 0x3B, 0x6D,
];
pub const SEGMENT_BLANK: u8 = 0x00;
pub const SEGMENT_MINUS: u8 = 0x01;
pub const SEGMENT_DOT: u8 = 0x80;

/// Maps an ASCII byte to its 7-segment pattern. Unmapped bytes render blank.
pub fn char_to_segments(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => SEGMENT_DIGITS[(c - b'0') as usize],
        b'a'..=b'z' => SEGMENT_LETTERS[(c - b'a') as usize],
        b'A'..=b'Z' => SEGMENT_LETTERS[(c - b'A') as usize],
        b'-' => SEGMENT_MINUS,
        _ => SEGMENT_BLANK,
    }
}

/// Digit codes understood by the chip when hardware BCD decode is active.
pub mod bcd {
    pub const MINUS: u8 = 0x0A;
    pub const BLANK: u8 = 0x0F;
    pub const DOT: u8 = 0x80; // top bit of a digit register
}

pub mod register {
    pub const NOOP: u8 = 0x00;
    pub const DIGIT_OFFSET: u8 = 0x01; // Digit0 - Digit7
    pub const DECODE_MODE: u8 = 0x09;
    pub const INTENSITY: u8 = 0x0A;
    pub const SCAN_LIMIT: u8 = 0x0B;
    pub const SHUTDOWN: u8 = 0x0C;
    pub const DISPLAY_TEST: u8 = 0x0F;

    pub mod decode_mode {
        pub const NO_DECODE: u8 = 0x00; // no decode for digits 7:0
        pub const DECODE_ALL: u8 = 0xFF; // Code-B decode for digits 7:0
    }

    pub mod shutdown_mode {
        pub const SHUTDOWN: u8 = 0x00; // bit 0 clear: shutdown mode
        pub const NORMAL_OPERATION: u8 = 0x01; // bit 0 set: normal operation
    }

    pub mod display_test_mode {
        pub const NORMAL: u8 = 0x00;
        pub const TEST: u8 = 0x01;
    }
}
