//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.

use rgb::RGB8;

use crate::types::Lamp;

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedError {
    WriteFailed,
}

/// Fehler-Typ für Display-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    WriteFailed,
}

/// Trait für die drei Indikator-LEDs
///
/// # Implementierungen
/// - **Production:** GpioIndicator (drei GPIO-Ausgänge + Onboard-Spiegel)
/// - **Testing:** MockIndicator (zeichnet jeden Aufruf auf)
pub trait IndicatorLeds {
    /// Setzt eine einzelne LED an oder aus
    fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), LedError>;
}

/// Trait für ein Zeichen-Display (16x2)
///
/// Schreibzugriffe sind immer Paare aus Cursor setzen + Text schreiben.
pub trait CharDisplay {
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError>;

    /// Schreibt Text ab der aktuellen Cursor-Position
    fn write_str(&mut self, text: &str) -> Result<(), DisplayError>;
}

/// Trait für SmartLED Hardware-Zugriff
///
/// Abstrahiert die Onboard RGB LED (WS2812), die den Indikator spiegelt.
pub trait SmartLedWriter {
    /// Schreibt eine RGB-Farbe auf die LED
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write(&mut self, color: RGB8) -> Result<(), LedError>;
}

#[cfg(feature = "defmt")]
impl defmt::Format for LedError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "LED write failed")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DisplayError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Display write failed")
    }
}
