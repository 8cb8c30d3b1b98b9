//! Display-Policy für das 16x2 Zeichen-Display
//!
//! Reine Funktionen: welcher Text steht wann auf dem Display.
//! Das eigentliche Schreiben übernimmt der Reconciler über `CharDisplay`.

use core::fmt::Write;

use heapless::String;

use crate::types::{FeedCategory, Lamp, StatusValue};

/// Zeichen pro Zeile
pub const LCD_COLUMNS: usize = 16;

/// Anzahl Zeilen
pub const LCD_ROWS: usize = 2;

/// Eine Display-Zeile mit exakt `LCD_COLUMNS` Zeichen
///
/// Kurzer Text wird mit Leerzeichen aufgefüllt (überschreibt alte Zeichen
/// ohne sichtbares Clear), langer Text wird abgeschnitten. Zeichen außerhalb
/// von druckbarem ASCII werden als `?` dargestellt, da der Display-ROM
/// nur ASCII sicher abbildet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine(String<LCD_COLUMNS>);

impl DisplayLine {
    pub fn fit(text: &str) -> Self {
        let mut line = String::new();
        for c in text.chars().take(LCD_COLUMNS) {
            let c = if c.is_ascii() && !c.is_ascii_control() {
                c
            } else {
                '?'
            };
            // ASCII = 1 Byte, passt immer
            let _ = line.push(c);
        }
        while line.len() < LCD_COLUMNS {
            let _ = line.push(' ');
        }
        Self(line)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Kompletter Inhalt beider Zeilen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    pub top: DisplayLine,
    pub bottom: DisplayLine,
}

impl DisplayFrame {
    pub fn new(top: &str, bottom: &str) -> Self {
        Self {
            top: DisplayLine::fit(top),
            bottom: DisplayLine::fit(bottom),
        }
    }

    pub fn lines(&self) -> [&DisplayLine; LCD_ROWS] {
        [&self.top, &self.bottom]
    }
}

/// Woher kommt der Status?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Taster + `setStatus` Endpoint
    Local,
    /// Status-Feed vom MQTT Broker
    Remote,
}

/// Wann wird nach einem Wechsel die ausführlichere Meldung gezeigt?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebouncePolicy {
    /// Nur sofortige Anzeige bei Wechsel
    Immediate,
    /// Zusätzlich einmalige Meldung nach `delay_ms` ohne Wechsel
    Settled { delay_ms: u64 },
}

impl DebouncePolicy {
    /// Prüft den Settle-Timer
    ///
    /// Liefert den zu zeichnenden Frame (falls fällig) und den neuen
    /// Latch-Wert. Der Latch wird auch gesetzt wenn die Kategorie keine
    /// Meldung hat, damit pro Ruhephase nur einmal ausgewertet wird.
    pub fn settle(
        &self,
        status: &StatusValue,
        elapsed_ms: u64,
        message_shown: bool,
    ) -> (Option<DisplayFrame>, bool) {
        match *self {
            DebouncePolicy::Immediate => (None, message_shown),
            DebouncePolicy::Settled { delay_ms } => {
                if message_shown || elapsed_ms <= delay_ms {
                    (None, message_shown)
                } else {
                    (settled_frame(status), true)
                }
            }
        }
    }
}

/// Frame direkt nach dem Start
pub fn initial_frame(source: SourceKind) -> DisplayFrame {
    match source {
        SourceKind::Local => DisplayFrame::new("Ready...", ""),
        SourceKind::Remote => DisplayFrame::new("Study Sergeant", "Connecting..."),
    }
}

/// Frame der sofort bei einem Statuswechsel gezeichnet wird
pub fn immediate_frame(status: &StatusValue) -> DisplayFrame {
    match status {
        StatusValue::Ready => DisplayFrame::new("Ready...", ""),
        StatusValue::Mode(lamp) => {
            let top = match lamp {
                Lamp::Blue => "Blue Mode",
                Lamp::Green => "Green Mode",
                Lamp::Red => "Red Mode",
            };
            DisplayFrame::new(top, "")
        }
        StatusValue::Feed { text, .. } => DisplayFrame::new("Status:", text.as_str()),
    }
}

/// Ausführliche Meldung nach Ablauf der Settle-Zeit
///
/// Lokale Modi haben keine Meldung. `Ready` zählt wie unbekannter Text.
pub fn settled_frame(status: &StatusValue) -> Option<DisplayFrame> {
    let category = match status {
        StatusValue::Ready => FeedCategory::Other,
        StatusValue::Mode(_) => return None,
        StatusValue::Feed { category, .. } => *category,
    };
    let frame = match category {
        FeedCategory::Studying => DisplayFrame::new("Great Job!", "Keep it up!"),
        FeedCategory::OnPhone => DisplayFrame::new("GET OFF PHONE!", "Focus now!"),
        FeedCategory::Other => DisplayFrame::new("Are you there?", "Start working!"),
    };
    Some(frame)
}

/// Fußzeile mit Sekunden seit Start ("Time: 42")
pub fn uptime_line(secs: u64) -> DisplayLine {
    let mut text: String<LCD_COLUMNS> = String::new();
    // Overflow erst bei > 10 Stellen, dann bleibt der Anfang stehen
    let _ = write!(text, "Time: {}", secs);
    DisplayLine::fit(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_pads_short_text() {
        let line = DisplayLine::fit("Status:");
        assert_eq!(line.as_str(), "Status:         ");
        assert_eq!(line.as_str().len(), LCD_COLUMNS);
        assert_eq!(line.as_str().trim_end(), "Status:");
    }

    #[test]
    fn test_fit_truncates_long_text() {
        let line = DisplayLine::fit("Distracted by something shiny");
        assert_eq!(line.as_str(), "Distracted by so");
    }

    #[test]
    fn test_fit_replaces_non_ascii() {
        let line = DisplayLine::fit("Grün");
        assert_eq!(line.as_str().trim_end(), "Gr?n");
        assert_eq!(line.as_str().len(), LCD_COLUMNS);
    }

    #[test]
    fn test_settle_fires_only_after_delay() {
        let policy = DebouncePolicy::Settled { delay_ms: 10_000 };
        let status = StatusValue::feed("Studying");

        assert_eq!(policy.settle(&status, 10_000, false), (None, false));

        let (frame, shown) = policy.settle(&status, 10_001, false);
        assert!(shown);
        assert_eq!(frame, Some(DisplayFrame::new("Great Job!", "Keep it up!")));
    }

    #[test]
    fn test_settle_latched_does_nothing() {
        let policy = DebouncePolicy::Settled { delay_ms: 10_000 };
        let status = StatusValue::feed("On Phone");
        assert_eq!(policy.settle(&status, 60_000, true), (None, true));
    }

    #[test]
    fn test_immediate_policy_never_settles() {
        let policy = DebouncePolicy::Immediate;
        let status = StatusValue::feed("Studying");
        assert_eq!(policy.settle(&status, u64::MAX, false), (None, false));
    }

    #[test]
    fn test_settled_frame_for_modes_is_none() {
        assert_eq!(settled_frame(&StatusValue::Mode(Lamp::Red)), None);
        assert_eq!(
            settled_frame(&StatusValue::Ready),
            Some(DisplayFrame::new("Are you there?", "Start working!"))
        );
    }

    #[test]
    fn test_uptime_line() {
        assert_eq!(uptime_line(42).as_str().trim_end(), "Time: 42");
        assert_eq!(uptime_line(0).as_str().len(), LCD_COLUMNS);
    }
}
