// Taster: active-low mit internem Pull-Up, Level-basiert gepollt

use esp_hal::gpio::Input;
use sergeant_core::ButtonLevels;

pub struct ButtonPanel<'a> {
    pub blue: Input<'a>,
    pub green: Input<'a>,
    pub red: Input<'a>,
}

impl ButtonPanel<'_> {
    /// Low = gedrückt (Pull-Up hält den Pin sonst auf 3.3V)
    pub fn read(&self) -> ButtonLevels {
        ButtonLevels {
            blue: self.blue.is_low(),
            green: self.green.is_low(),
            red: self.red.is_low(),
        }
    }
}
