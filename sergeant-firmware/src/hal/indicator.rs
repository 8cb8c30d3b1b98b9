// Indikator-LEDs: drei GPIO-Ausgänge plus Onboard-Spiegel

use defmt::warn;
use esp_hal::gpio::Output;
use sergeant_core::{IndicatorLeds, Lamp, LampMirror, LedError, SmartLedWriter};

/// Die drei Ausgänge in der Reihenfolge von `Lamp::ALL` (Grün, Rot, Blau)
pub struct IndicatorPins<'a> {
    pub green: Output<'a>,
    pub red: Output<'a>,
    pub blue: Output<'a>,
}

/// GPIO Indikator
///
/// Jeder `set_lamp` Aufruf schaltet genau einen Pin, die Onboard LED
/// folgt über `LampMirror`. Ein Fehler der Onboard LED wird nur geloggt,
/// der Pin ist zu dem Zeitpunkt schon geschaltet.
pub struct GpioIndicator<'a, M: SmartLedWriter> {
    pins: IndicatorPins<'a>,
    mirror: LampMirror<M>,
}

impl<'a, M: SmartLedWriter> GpioIndicator<'a, M> {
    pub fn new(pins: IndicatorPins<'a>, mirror: Option<M>, brightness: u8) -> Self {
        Self {
            pins,
            mirror: LampMirror::new(mirror, brightness),
        }
    }

    fn pin(&mut self, lamp: Lamp) -> &mut Output<'a> {
        match lamp {
            Lamp::Green => &mut self.pins.green,
            Lamp::Red => &mut self.pins.red,
            Lamp::Blue => &mut self.pins.blue,
        }
    }
}

impl<M: SmartLedWriter> IndicatorLeds for GpioIndicator<'_, M> {
    fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), LedError> {
        let pin = self.pin(lamp);
        if on {
            pin.set_high();
        } else {
            pin.set_low();
        }
        if let Err(e) = self.mirror.follow(lamp, on) {
            warn!("Indicator: Onboard LED write failed: {}", e);
        }
        Ok(())
    }
}
