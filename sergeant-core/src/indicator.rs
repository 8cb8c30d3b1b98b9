//! Indikator-Mapping: Status → genau eine LED

use rgb::RGB8;

use crate::traits::{LedError, SmartLedWriter};
use crate::types::{FeedCategory, Lamp, StatusValue};

impl FeedCategory {
    /// LED für eine Feed-Kategorie
    pub fn lamp(self) -> Lamp {
        match self {
            FeedCategory::Studying => Lamp::Green,
            FeedCategory::OnPhone => Lamp::Red,
            FeedCategory::Other => Lamp::Blue,
        }
    }
}

impl Lamp {
    /// Farbe der Onboard RGB LED für diese Lampe
    pub fn color(self, brightness: u8) -> RGB8 {
        match self {
            Lamp::Green => RGB8 {
                r: 0,
                g: brightness,
                b: 0,
            },
            Lamp::Red => RGB8 {
                r: brightness,
                g: 0,
                b: 0,
            },
            Lamp::Blue => RGB8 {
                r: 0,
                g: 0,
                b: brightness,
            },
        }
    }
}

/// Welche LED gehört zu diesem Status?
///
/// Jede Kategorie (auch unbekannter Feed-Text) liefert genau eine LED.
/// Nur der Startzustand `Ready` hat keine, dort sind alle LEDs aus.
pub fn indicator_for(status: &StatusValue) -> Option<Lamp> {
    match status {
        StatusValue::Ready => None,
        StatusValue::Mode(lamp) => Some(*lamp),
        StatusValue::Feed { category, .. } => Some(category.lamp()),
    }
}

/// Soll-Zustand aller Ausgänge, indiziert wie `Lamp::ALL`
pub fn lamp_states(lamp: Option<Lamp>) -> [bool; 3] {
    let mut states = [false; 3];
    if let Some(lamp) = lamp {
        states[lamp.index()] = true;
    }
    states
}

/// Farbe für die Onboard LED (schwarz wenn keine Lampe an)
pub fn mirror_color(lamp: Option<Lamp>, brightness: u8) -> RGB8 {
    lamp.map(|l| l.color(brightness)).unwrap_or_default()
}

/// Onboard RGB LED folgt der zuletzt eingeschalteten Lampe
///
/// Geht aus, sobald genau diese Lampe ausgeschaltet wird. Geschrieben wird
/// nur bei einer Änderung, ein fehlgeschlagener Write wird beim nächsten
/// Aufruf wiederholt. Ohne Writer (z.B. RMT Init fehlgeschlagen) wird nur
/// der Zustand verfolgt.
pub struct LampMirror<M: SmartLedWriter> {
    writer: Option<M>,
    mirrored: Option<Lamp>,
    brightness: u8,
}

impl<M: SmartLedWriter> LampMirror<M> {
    pub fn new(writer: Option<M>, brightness: u8) -> Self {
        Self {
            writer,
            mirrored: None,
            brightness,
        }
    }

    pub fn mirrored(&self) -> Option<Lamp> {
        self.mirrored
    }

    pub fn writer(&self) -> Option<&M> {
        self.writer.as_ref()
    }

    /// Nach jedem Schalten einer Lampe aufrufen
    pub fn follow(&mut self, lamp: Lamp, on: bool) -> Result<(), LedError> {
        let next = match self.mirrored {
            _ if on => Some(lamp),
            Some(current) if current == lamp => None,
            current => current,
        };
        if next == self.mirrored {
            return Ok(());
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.write(mirror_color(next, self.brightness))?;
        }
        self.mirrored = next;
        Ok(())
    }
}
