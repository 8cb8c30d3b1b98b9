//! Integration Tests für den HD44780 Treiber
//!
//! Mock-Pins auf einem gemeinsamen Bus: bei jeder fallenden Enable-Flanke
//! wird (RS, Nibble) mitgeschrieben, wie es das Display übernehmen würde.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use sergeant_core::lcd::{
    CMD_CLEAR, CMD_DISPLAY_ON, CMD_ENTRY_MODE_INCREMENT, CMD_FUNCTION_4BIT_2LINE, CMD_SET_DDRAM,
};
use sergeant_core::{CharDisplay, DisplayError, Hd44780, LcdPins, Profile, StatusReconciler};
use sergeant_core::{IndicatorLeds, Lamp, LedError};

// Bus-Indizes der Pins
const RS: usize = 0;
const EN: usize = 1;
const D4: usize = 2;

// ============================================================================
// Mock Hardware
// ============================================================================

#[derive(Default)]
pub struct Bus {
    levels: [bool; 6],
    /// Übernommene Nibbles (RS, Wert)
    pub nibbles: Vec<(bool, u8)>,
    pub fail_pin: Option<usize>,
}

#[derive(Debug)]
pub struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct MockPin {
    id: usize,
    bus: Rc<RefCell<Bus>>,
}

impl MockPin {
    fn set(&mut self, high: bool) -> Result<(), PinFault> {
        let mut bus = self.bus.borrow_mut();
        if bus.fail_pin == Some(self.id) {
            return Err(PinFault);
        }
        let was_high = bus.levels[self.id];
        bus.levels[self.id] = high;

        if self.id == EN && was_high && !high {
            let levels = bus.levels;
            let nibble = (0..4).fold(0u8, |acc, bit| acc | (levels[D4 + bit] as u8) << bit);
            bus.nibbles.push((levels[RS], nibble));
        }
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = PinFault;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        self.set(false)
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        self.set(true)
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn pins(bus: &Rc<RefCell<Bus>>) -> LcdPins<MockPin> {
    let pin = |id| MockPin {
        id,
        bus: Rc::clone(bus),
    };
    LcdPins {
        rs: pin(0),
        en: pin(1),
        d4: pin(2),
        d5: pin(3),
        d6: pin(4),
        d7: pin(5),
    }
}

fn lcd() -> (Hd44780<MockPin, NoDelay>, Rc<RefCell<Bus>>) {
    let bus = Rc::new(RefCell::new(Bus::default()));
    let lcd = match Hd44780::new(pins(&bus), NoDelay) {
        Ok(lcd) => lcd,
        Err(e) => panic!("init failed: {:?}", e),
    };
    (lcd, bus)
}

/// Nibble-Paare zu Bytes zusammensetzen (High-Nibble zuerst)
fn bytes(nibbles: &[(bool, u8)]) -> Vec<(bool, u8)> {
    assert_eq!(nibbles.len() % 2, 0, "incomplete byte");
    nibbles
        .chunks(2)
        .map(|pair| {
            assert_eq!(pair[0].0, pair[1].0, "RS changed within a byte");
            (pair[0].0, pair[0].1 << 4 | pair[1].1)
        })
        .collect()
}

fn take_bytes(bus: &Rc<RefCell<Bus>>) -> Vec<(bool, u8)> {
    let nibbles = std::mem::take(&mut bus.borrow_mut().nibbles);
    bytes(&nibbles)
}

// ============================================================================
// Tests: Init + Kommandos
// ============================================================================

#[test]
fn test_init_sequence_switches_to_4bit() {
    let (_lcd, bus) = lcd();
    let nibbles = bus.borrow().nibbles.clone();

    assert_eq!(
        nibbles[..4],
        [(false, 0x3), (false, 0x3), (false, 0x3), (false, 0x2)]
    );
    assert_eq!(
        bytes(&nibbles[4..]),
        vec![
            (false, CMD_FUNCTION_4BIT_2LINE),
            (false, CMD_DISPLAY_ON),
            (false, CMD_CLEAR),
            (false, CMD_ENTRY_MODE_INCREMENT),
        ]
    );
}

#[test]
fn test_set_cursor_addresses_second_row() {
    let (mut lcd, bus) = lcd();
    take_bytes(&bus);

    lcd.set_cursor(3, 1).unwrap();
    assert_eq!(take_bytes(&bus), vec![(false, CMD_SET_DDRAM | 0x43)]);

    lcd.set_cursor(0, 0).unwrap();
    assert_eq!(take_bytes(&bus), vec![(false, CMD_SET_DDRAM)]);
}

#[test]
fn test_write_str_sends_data_bytes() {
    let (mut lcd, bus) = lcd();
    take_bytes(&bus);

    lcd.write_str("Hi!").unwrap();

    assert_eq!(take_bytes(&bus), vec![(true, b'H'), (true, b'i'), (true, b'!')]);
}

#[test]
fn test_cursor_out_of_range_rejected_without_output() {
    let (mut lcd, bus) = lcd();
    take_bytes(&bus);

    assert_eq!(lcd.set_cursor(0, 2), Err(DisplayError::WriteFailed));
    assert_eq!(lcd.set_cursor(16, 0), Err(DisplayError::WriteFailed));
    assert!(bus.borrow().nibbles.is_empty());
}

#[test]
fn test_pin_fault_reported() {
    let bus = Rc::new(RefCell::new(Bus::default()));
    bus.borrow_mut().fail_pin = Some(EN);
    assert!(matches!(
        Hd44780::new(pins(&bus), NoDelay),
        Err(DisplayError::WriteFailed)
    ));

    let (mut lcd, bus) = lcd();
    bus.borrow_mut().fail_pin = Some(D4);
    assert_eq!(lcd.write_str("x"), Err(DisplayError::WriteFailed));
}

// ============================================================================
// Tests: Reconciler auf dem Treiber
// ============================================================================

#[derive(Default)]
struct NoLeds;

impl IndicatorLeds for NoLeds {
    fn set_lamp(&mut self, _lamp: Lamp, _on: bool) -> Result<(), LedError> {
        Ok(())
    }
}

#[test]
fn test_start_frame_reaches_display_ram() {
    let (lcd, bus) = lcd();
    take_bytes(&bus);
    let mut r = StatusReconciler::new(NoLeds, lcd, Profile::remote(10_000));

    r.start(0).unwrap();

    let written = take_bytes(&bus);
    assert_eq!(written.len(), 2 * (1 + 16));
    assert_eq!(written[0], (false, CMD_SET_DDRAM));
    assert_eq!(written[17], (false, CMD_SET_DDRAM | 0x40));

    let text = |range: std::ops::Range<usize>| -> String {
        written[range].iter().map(|(_, b)| *b as char).collect()
    };
    assert_eq!(text(1..17), "Study Sergeant  ");
    assert_eq!(text(18..34), "Connecting...   ");
}
