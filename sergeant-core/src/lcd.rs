//! HD44780 Zeichen-Display (16x2) im 4-Bit Modus
//!
//! Generisch über die embedded-hal Traits, damit die Byte-Folge auf dem
//! Host mit Mock-Pins geprüft werden kann. Nur Schreiben (RW fest auf GND),
//! daher feste Wartezeiten statt Busy-Flag Abfrage.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::display::{LCD_COLUMNS, LCD_ROWS};
use crate::traits::{CharDisplay, DisplayError};

// Kommandos (Datenblatt Tabelle 6)
pub const CMD_CLEAR: u8 = 0x01;
pub const CMD_ENTRY_MODE_INCREMENT: u8 = 0x06;
pub const CMD_DISPLAY_ON: u8 = 0x0C;
pub const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
pub const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM Startadresse pro Zeile
const ROW_OFFSETS: [u8; LCD_ROWS] = [0x00, 0x40];

/// Pins des Displays
pub struct LcdPins<P> {
    pub rs: P,
    pub en: P,
    pub d4: P,
    pub d5: P,
    pub d6: P,
    pub d7: P,
}

pub struct Hd44780<P: OutputPin, D: DelayNs> {
    pins: LcdPins<P>,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// Initialisiert das Display (4-Bit, 2 Zeilen, Cursor aus) und löscht es
    ///
    /// Blockiert ca. 60 ms (Power-On Wartezeit laut Datenblatt).
    pub fn new(pins: LcdPins<P>, delay: D) -> Result<Self, DisplayError> {
        let mut lcd = Self { pins, delay };
        lcd.init()?;
        Ok(lcd)
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        set_pin(&mut self.pins.rs, false)?;
        set_pin(&mut self.pins.en, false)?;
        self.delay.delay_ms(50);

        // Reset-Sequenz: dreimal 8-Bit, dann Umschalten auf 4-Bit
        self.write_nibble(0x03)?;
        self.delay.delay_us(4500);
        self.write_nibble(0x03)?;
        self.delay.delay_us(150);
        self.write_nibble(0x03)?;
        self.delay.delay_us(150);
        self.write_nibble(0x02)?;
        self.delay.delay_us(150);

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_us(2000);
        self.command(CMD_ENTRY_MODE_INCREMENT)
    }

    fn command(&mut self, byte: u8) -> Result<(), DisplayError> {
        set_pin(&mut self.pins.rs, false)?;
        self.write_byte(byte)
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        set_pin(&mut self.pins.rs, true)?;
        self.write_byte(byte)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)?;
        // Ausführungszeit der meisten Befehle: 37 µs
        self.delay.delay_us(50);
        Ok(())
    }

    /// Datenleitungen setzen, dann Enable-Puls (Übernahme bei fallender Flanke)
    fn write_nibble(&mut self, nibble: u8) -> Result<(), DisplayError> {
        set_pin(&mut self.pins.d4, nibble & 0x01 != 0)?;
        set_pin(&mut self.pins.d5, nibble & 0x02 != 0)?;
        set_pin(&mut self.pins.d6, nibble & 0x04 != 0)?;
        set_pin(&mut self.pins.d7, nibble & 0x08 != 0)?;

        set_pin(&mut self.pins.en, true)?;
        self.delay.delay_us(1);
        set_pin(&mut self.pins.en, false)?;
        self.delay.delay_us(1);
        Ok(())
    }
}

fn set_pin<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), DisplayError> {
    pin.set_state(PinState::from(high))
        .map_err(|_| DisplayError::WriteFailed)
}

impl<P: OutputPin, D: DelayNs> CharDisplay for Hd44780<P, D> {
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        let offset = ROW_OFFSETS
            .get(row as usize)
            .ok_or(DisplayError::WriteFailed)?;
        if col as usize >= LCD_COLUMNS {
            return Err(DisplayError::WriteFailed);
        }
        self.command(CMD_SET_DDRAM | (offset + col))
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        for byte in text.bytes() {
            self.data(byte)?;
        }
        Ok(())
    }
}
