//! Core Types für die Status-Anzeige
//!
//! Datenstrukturen ohne Hardware-Dependencies

use heapless::String;

/// Maximale Länge eines gespeicherten Feed-Status in Bytes
///
/// Längere Payloads werden beim Speichern abgeschnitten. Die Kategorie wird
/// vorher aus der vollständigen Payload bestimmt.
pub const STATUS_TEXT_CAPACITY: usize = 64;

/// Status-Text aus dem Broker-Feed
pub type StatusText = String<STATUS_TEXT_CAPACITY>;

/// Eine der drei Indikator-LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Lamp {
    Green,
    Red,
    Blue,
}

impl Lamp {
    /// Alle LEDs in fester Reihenfolge (Reihenfolge der Ausgänge)
    pub const ALL: [Lamp; 3] = [Lamp::Green, Lamp::Red, Lamp::Blue];

    /// Name wie er vom `setStatus` Endpoint erwartet wird
    pub fn as_str(self) -> &'static str {
        match self {
            Lamp::Green => "green",
            Lamp::Red => "red",
            Lamp::Blue => "blue",
        }
    }

    /// Index im Ausgangs-Array (siehe `Lamp::ALL`)
    pub fn index(self) -> usize {
        match self {
            Lamp::Green => 0,
            Lamp::Red => 1,
            Lamp::Blue => 2,
        }
    }
}

/// Anzeige-Kategorie eines Feed-Status
///
/// Freitext aus dem Broker wird immer auf genau eine Kategorie abgebildet.
/// Unbekannter Text landet in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedCategory {
    Studying,
    OnPhone,
    Other,
}

impl FeedCategory {
    /// Exakter Vergleich (case-sensitive), alles andere ist `Other`
    pub fn classify(text: &str) -> Self {
        match text {
            "Studying" => FeedCategory::Studying,
            "On Phone" => FeedCategory::OnPhone,
            _ => FeedCategory::Other,
        }
    }
}

/// Aktueller Status der Anzeige
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusValue {
    /// Neutraler Startzustand, noch kein Status empfangen
    Ready,
    /// Lokal gewählter Modus (Taster oder `setStatus`)
    Mode(Lamp),
    /// Status-Text vom Broker
    Feed {
        category: FeedCategory,
        text: StatusText,
    },
}

impl StatusValue {
    /// Baut einen Feed-Status aus Text (Kategorie aus dem vollen Text)
    pub fn feed(text: &str) -> Self {
        StatusValue::Feed {
            category: FeedCategory::classify(text),
            text: truncate_to(text),
        }
    }
}

/// Ergebnis einer Quellen-Abfrage pro Loop-Durchlauf
///
/// `NoUpdate` (Timeout / kein Taster) ist bewusst etwas anderes als ein
/// empfangener Wert der dem aktuellen entspricht.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePoll {
    NoUpdate,
    Received(StatusValue),
}

/// Kopiert `text` in einen fixen Buffer und schneidet an einer Zeichengrenze ab
pub(crate) fn truncate_to<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for Lamp {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FeedCategory {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            FeedCategory::Studying => defmt::write!(fmt, "Studying"),
            FeedCategory::OnPhone => defmt::write!(fmt, "OnPhone"),
            FeedCategory::Other => defmt::write!(fmt, "Other"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusValue {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            StatusValue::Ready => defmt::write!(fmt, "Ready"),
            StatusValue::Mode(lamp) => defmt::write!(fmt, "Mode {{ {} }}", lamp),
            StatusValue::Feed { category, text } => {
                defmt::write!(
                    fmt,
                    "Feed {{ category: {}, text: {} }}",
                    category,
                    text.as_str()
                )
            }
        }
    }
}
