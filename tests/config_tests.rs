mod common;

use common::{driver, init_driver};
use max7219_7seg::{register, Alignment, DecodeMode};

#[test]
fn digit_count_is_clamped() {
    let (display, _) = driver(20);
    assert_eq!(display.num_digits(), 8);

    let (display, _) = driver(0);
    assert_eq!(display.num_digits(), 1);

    let (display, _) = driver(5);
    assert_eq!(display.num_digits(), 5);
}

#[test]
fn construction_touches_no_hardware() {
    let (_display, bus) = driver(8);
    assert!(bus.frames().is_empty());
}

#[test]
fn init_programs_the_chip_and_clears() {
    let (mut display, bus) = driver(4);
    display.init().unwrap();

    assert_eq!(
        bus.frames(),
        vec![
            (register::SHUTDOWN, 0x01),
            (register::SCAN_LIMIT, 3),
            (register::DECODE_MODE, register::decode_mode::DECODE_ALL),
            (register::INTENSITY, 8),
            (register::DISPLAY_TEST, 0x00),
            (0x01, 0x0F),
            (0x02, 0x0F),
            (0x03, 0x0F),
            (0x04, 0x0F),
        ]
    );
}

#[test]
fn init_with_mode_overrides_the_default() {
    let (mut display, bus) = driver(8);
    display.init_with_mode(DecodeMode::SoftwareSegments).unwrap();

    assert_eq!(display.mode(), DecodeMode::SoftwareSegments);
    assert_eq!(
        bus.last_write(register::DECODE_MODE),
        Some(register::decode_mode::NO_DECODE)
    );
    // software-mode blank is all segments off
    assert_eq!(bus.digit_registers(), [Some(0x00); 8]);
}

#[test]
fn brightness_is_clamped_to_15() {
    let (mut display, bus) = init_driver(8);

    display.set_brightness(20).unwrap();
    assert_eq!(display.brightness(), 15);
    assert_eq!(bus.last_write(register::INTENSITY), Some(15));

    display.set_brightness(255).unwrap();
    assert_eq!(bus.last_write(register::INTENSITY), Some(15));

    display.set_brightness(3).unwrap();
    assert_eq!(display.brightness(), 3);
    assert_eq!(bus.last_write(register::INTENSITY), Some(3));
}

#[test]
fn set_power_drives_the_shutdown_register() {
    let (mut display, bus) = init_driver(8);

    display.set_power(false).unwrap();
    display.set_power(true).unwrap();
    assert_eq!(bus.writes_to(register::SHUTDOWN), vec![0x00, 0x01]);
}

#[test]
fn mode_switch_blanks_the_display() {
    let (mut display, bus) = init_driver(4);
    display.display_number(1234).unwrap();

    bus.clear_frames();
    display.set_mode(DecodeMode::SoftwareSegments).unwrap();

    assert_eq!(display.mode(), DecodeMode::SoftwareSegments);
    assert_eq!(bus.frames()[0], (register::DECODE_MODE, 0x00));
    assert_eq!(bus.digit_registers()[..4], [Some(0x00); 4]);

    display.display_str("AB").unwrap();
    bus.clear_frames();
    display.set_mode(DecodeMode::HardwareBcd).unwrap();
    assert_eq!(bus.frames()[0], (register::DECODE_MODE, 0xFF));
    assert_eq!(bus.digit_registers()[..4], [Some(0x0F); 4]);
}

#[test]
fn set_alignment_is_pure_configuration() {
    let (mut display, bus) = init_driver(8);
    display.set_alignment(Alignment::Left);

    assert_eq!(display.alignment(), Alignment::Left);
    assert!(bus.frames().is_empty());
}

#[test]
fn clear_is_idempotent() {
    let (mut display, bus) = init_driver(4);
    display.display_number(42).unwrap();

    bus.clear_frames();
    display.clear().unwrap();
    let first = bus.frames();

    bus.clear_frames();
    display.clear().unwrap();
    assert_eq!(bus.frames(), first);
    assert_eq!(bus.digit_registers()[..4], [Some(0x0F); 4]);
}

#[test]
fn alignment_maps_logical_to_physical_positions() {
    let (mut display, bus) = init_driver(8);

    display.set_digit(0, 5, false).unwrap();
    assert_eq!(bus.frames(), vec![(0x01, 0x05)]);

    bus.clear_frames();
    display.set_alignment(Alignment::Left);
    display.set_digit(0, 5, false).unwrap();
    assert_eq!(bus.frames(), vec![(0x08, 0x05)]);

    bus.clear_frames();
    display.set_alignment(Alignment::Center);
    display.set_digit(0, 5, false).unwrap();
    assert_eq!(bus.frames(), vec![(0x08, 0x05)]);
}

#[test]
fn out_of_range_positions_are_ignored() {
    let (mut display, bus) = init_driver(4);

    display.set_digit(4, 5, false).unwrap();
    display.set_char(9, 'A', false).unwrap();
    display.set_segments(4, 0xFF).unwrap();
    display.set_raw_digit(200, 0x01, true).unwrap();
    assert!(bus.frames().is_empty());
}

#[test]
fn destroy_returns_the_collaborators() {
    let (display, _) = driver(8);
    let (_din, _clk, _cs, _delay) = display.destroy();
}
