//! Status-Quellen: Taster/Endpoint (lokal) und Broker-Feed (remote)
//!
//! Beide Adapter liefern pro Loop-Durchlauf genau ein `SourcePoll`.

use crate::types::{FeedCategory, Lamp, SourcePoll, StatusValue, truncate_to};

/// Taster-Zustand nach Auswertung der Pegel (true = gedrückt)
///
/// Die Taster sind active-low mit Pull-Up, die Umrechnung macht der
/// Hardware-Adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonLevels {
    pub blue: bool,
    pub green: bool,
    pub red: bool,
}

impl ButtonLevels {
    /// Gedrückter Taster mit fester Priorität: Blau vor Grün vor Rot
    pub fn pressed(&self) -> Option<Lamp> {
        if self.blue {
            Some(Lamp::Blue)
        } else if self.green {
            Some(Lamp::Green)
        } else if self.red {
            Some(Lamp::Red)
        } else {
            None
        }
    }
}

/// Lokaler Adapter
///
/// `pending` ist ein vom `setStatus` Endpoint übergebener Modus. Er wird
/// zuerst angewendet, ein gedrückter Taster im selben Durchlauf schreibt
/// danach und gewinnt. Ohne Taster und ohne Kommando bleibt der letzte
/// Status stehen (kein Reset beim Loslassen).
pub fn local_poll(buttons: ButtonLevels, pending: Option<Lamp>) -> SourcePoll {
    match buttons.pressed().or(pending) {
        Some(lamp) => SourcePoll::Received(StatusValue::Mode(lamp)),
        None => SourcePoll::NoUpdate,
    }
}

/// Remote Adapter: Ergebnis eines Receive mit Timeout
///
/// `None` = Timeout, das ist kein Fehler und kein Statuswechsel.
pub fn receive_outcome(payload: Option<&[u8]>) -> SourcePoll {
    match payload {
        Some(bytes) => SourcePoll::Received(StatusValue::from_feed_payload(bytes)),
        None => SourcePoll::NoUpdate,
    }
}

impl StatusValue {
    /// Normalisiert eine Feed-Payload
    ///
    /// Die Kategorie wird aus der vollständigen Payload bestimmt, nicht aus
    /// dem abgeschnittenen Anzeigetext. Ungültiges UTF-8 zählt als
    /// unbekannter Text, der gültige Anfang wird trotzdem angezeigt.
    pub fn from_feed_payload(payload: &[u8]) -> Self {
        match core::str::from_utf8(payload) {
            Ok(text) => StatusValue::feed(text),
            Err(e) => {
                let valid = core::str::from_utf8(&payload[..e.valid_up_to()]).unwrap_or("");
                StatusValue::Feed {
                    category: FeedCategory::Other,
                    text: truncate_to(valid),
                }
            }
        }
    }
}
