// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Traits aus sergeant-core für die echte Hardware.
// Die Logik dahinter ist in sergeant-tests mit Mocks getestet.

pub mod buttons;
pub mod indicator;
pub mod onboard_led;

use esp_hal::delay::Delay;
use esp_hal::gpio::Output;

pub use buttons::ButtonPanel;
pub use indicator::{GpioIndicator, IndicatorPins};
pub use onboard_led::RmtLedWriter;

/// 16x2 Display an den GPIOs aus config.rs (Treiber in sergeant-core)
pub type Lcd = sergeant_core::Hd44780<Output<'static>, Delay>;

/// Pins des Displays
pub type LcdPins = sergeant_core::LcdPins<Output<'static>>;
