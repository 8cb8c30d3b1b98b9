//! Status Reconciler - Testbare Loop-Logik ohne Hardware-Abhängigkeit
//!
//! Pro Loop-Durchlauf:
//! 1. Quelle abfragen (macht der Aufrufer, Ergebnis ist ein `SourcePoll`)
//! 2. Bei Wechsel: Status übernehmen, LEDs sofort umschalten, Display sofort
//! 3. Ohne Wechsel: Settle-Timer prüfen (einmalige Meldung)
//!
//! Läuft auf genau einem Thread. Zeit kommt als monotone Millisekunden
//! von außen, damit Tests die Uhr steuern können.

use crate::display::{
    DebouncePolicy, DisplayFrame, DisplayLine, SourceKind, immediate_frame, initial_frame,
    uptime_line,
};
use crate::indicator::indicator_for;
use crate::traits::{CharDisplay, DisplayError, IndicatorLeds, LedError};
use crate::types::{Lamp, SourcePoll, StatusValue};

/// Konfiguration einer Variante (Quelle + Display-Verhalten)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub source: SourceKind,
    pub debounce: DebouncePolicy,
    /// Zeile 2 zeigt die Sekunden seit Start, solange keine Meldung steht
    pub uptime_footer: bool,
}

impl Profile {
    /// Taster + Endpoint, sofortige Anzeige, Uptime in Zeile 2
    pub const fn local() -> Self {
        Self {
            source: SourceKind::Local,
            debounce: DebouncePolicy::Immediate,
            uptime_footer: true,
        }
    }

    /// Broker-Feed mit einmaliger Meldung nach `settle_delay_ms`
    pub const fn remote(settle_delay_ms: u64) -> Self {
        Self {
            source: SourceKind::Remote,
            debounce: DebouncePolicy::Settled {
                delay_ms: settle_delay_ms,
            },
            uptime_footer: false,
        }
    }

    /// Profil aus Build-Einstellungen
    ///
    /// `source`: "local" | "remote", `policy`: "immediate" | "settled".
    /// Unbekannte Werte fallen auf lokal bzw. sofortige Anzeige zurück.
    pub fn from_settings(source: &str, policy: &str, settle_delay_ms: u64) -> Self {
        let source = match source {
            "remote" => SourceKind::Remote,
            _ => SourceKind::Local,
        };
        let debounce = match policy {
            "settled" => DebouncePolicy::Settled {
                delay_ms: settle_delay_ms,
            },
            _ => DebouncePolicy::Immediate,
        };
        Self {
            source,
            debounce,
            uptime_footer: source == SourceKind::Local && debounce == DebouncePolicy::Immediate,
        }
    }
}

/// Zustand des Reconcilers
///
/// `status` ist gleichzeitig der aktuelle und der zuletzt übernommene
/// Status, beide werden nur gemeinsam geändert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerState {
    pub status: StatusValue,
    pub last_change_ms: u64,
    /// Debounce-Latch: Meldung für die aktuelle Ruhephase ausgewertet
    pub message_shown: bool,
}

impl ReconcilerState {
    fn initial(now_ms: u64) -> Self {
        Self {
            status: StatusValue::Ready,
            last_change_ms: now_ms,
            message_shown: false,
        }
    }
}

/// Was ist in einem Durchlauf passiert? (für Logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Changed { lamp: Option<Lamp> },
    Settled,
}

/// Fehler beim Ansteuern der Ausgänge
///
/// Der Status ist zu diesem Zeitpunkt schon übernommen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileError {
    Led(LedError),
    Display(DisplayError),
}

impl From<LedError> for ReconcileError {
    fn from(e: LedError) -> Self {
        ReconcileError::Led(e)
    }
}

impl From<DisplayError> for ReconcileError {
    fn from(e: DisplayError) -> Self {
        ReconcileError::Display(e)
    }
}

/// Bildet den Status auf LEDs und Display ab
///
/// # Trait-basierte Abstraktion
/// - Real Hardware (GpioIndicator, Hd44780) im Production-Code
/// - Mock Implementationen in Tests
pub struct StatusReconciler<L: IndicatorLeds, D: CharDisplay> {
    leds: L,
    display: D,
    profile: Profile,
    state: ReconcilerState,
    footer_secs: Option<u64>,
}

impl<L: IndicatorLeds, D: CharDisplay> StatusReconciler<L, D> {
    pub fn new(leds: L, display: D, profile: Profile) -> Self {
        Self {
            leds,
            display,
            profile,
            state: ReconcilerState::initial(0),
            footer_secs: None,
        }
    }

    /// Startzustand herstellen: alle LEDs aus, Start-Frame zeichnen
    pub fn start(&mut self, now_ms: u64) -> Result<(), ReconcileError> {
        self.state = ReconcilerState::initial(now_ms);
        self.footer_secs = None;

        let leds = self.drive_leds(None);
        let frame = self.with_footer(initial_frame(self.profile.source), now_ms);
        let display = self.render(&frame);
        leds?;
        display?;
        Ok(())
    }

    /// Ein Loop-Durchlauf
    ///
    /// Ein Wechsel im selben Durchlauf wie ein abgelaufener Settle-Timer hat
    /// Vorrang: der Timer wird zurückgesetzt und die alte Meldung entfällt.
    pub fn tick(&mut self, poll: SourcePoll, now_ms: u64) -> Result<Tick, ReconcileError> {
        if let SourcePoll::Received(next) = poll {
            if next != self.state.status {
                return self.transition(next, now_ms);
            }
        }

        let elapsed = now_ms.saturating_sub(self.state.last_change_ms);
        let (frame, shown) =
            self.profile
                .debounce
                .settle(&self.state.status, elapsed, self.state.message_shown);

        if shown && !self.state.message_shown {
            self.state.message_shown = true;
            if let Some(frame) = frame {
                self.render(&frame)?;
            }
            return Ok(Tick::Settled);
        }

        self.refresh_footer(now_ms)?;
        Ok(Tick::Idle)
    }

    pub fn state(&self) -> &ReconcilerState {
        &self.state
    }

    /// Zugriff auf die LED-Ausgänge (z.B. für Tests)
    pub fn leds(&self) -> &L {
        &self.leds
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    fn transition(&mut self, next: StatusValue, now_ms: u64) -> Result<Tick, ReconcileError> {
        let lamp = indicator_for(&next);
        let frame = self.with_footer(immediate_frame(&next), now_ms);

        self.state = ReconcilerState {
            status: next,
            last_change_ms: now_ms,
            message_shown: false,
        };

        let leds = self.drive_leds(lamp);
        let display = self.render(&frame);
        leds?;
        display?;
        Ok(Tick::Changed { lamp })
    }

    /// Erst alle aus, dann genau eine an
    ///
    /// Jeder Ausgang wird geschrieben, auch wenn ein vorheriger fehlschlägt.
    /// Gemeldet wird der erste Fehler.
    fn drive_leds(&mut self, lamp: Option<Lamp>) -> Result<(), LedError> {
        let mut result = Ok(());
        for l in Lamp::ALL {
            result = result.and(self.leds.set_lamp(l, false));
        }
        if let Some(lamp) = lamp {
            result = result.and(self.leds.set_lamp(lamp, true));
        }
        result
    }

    fn render(&mut self, frame: &DisplayFrame) -> Result<(), DisplayError> {
        for (row, line) in frame.lines().into_iter().enumerate() {
            self.write_line(row as u8, line)?;
        }
        Ok(())
    }

    fn write_line(&mut self, row: u8, line: &DisplayLine) -> Result<(), DisplayError> {
        self.display.set_cursor(0, row)?;
        self.display.write_str(line.as_str())
    }

    fn with_footer(&mut self, mut frame: DisplayFrame, now_ms: u64) -> DisplayFrame {
        if self.profile.uptime_footer {
            let secs = now_ms / 1000;
            frame.bottom = uptime_line(secs);
            self.footer_secs = Some(secs);
        }
        frame
    }

    /// Zeile 2 nur neu schreiben wenn sich die volle Sekunde geändert hat
    fn refresh_footer(&mut self, now_ms: u64) -> Result<(), DisplayError> {
        if !self.profile.uptime_footer || self.state.message_shown {
            return Ok(());
        }
        let secs = now_ms / 1000;
        if self.footer_secs == Some(secs) {
            return Ok(());
        }
        self.footer_secs = Some(secs);
        self.write_line(1, &uptime_line(secs))
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Profile {
    fn format(&self, fmt: defmt::Formatter) {
        let source = match self.source {
            SourceKind::Local => "local",
            SourceKind::Remote => "remote",
        };
        match self.debounce {
            DebouncePolicy::Immediate => defmt::write!(fmt, "{} / immediate", source),
            DebouncePolicy::Settled { delay_ms } => {
                defmt::write!(fmt, "{} / settled after {} ms", source, delay_ms)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ReconcileError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ReconcileError::Led(e) => defmt::write!(fmt, "{}", e),
            ReconcileError::Display(e) => defmt::write!(fmt, "{}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Tick {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Tick::Idle => defmt::write!(fmt, "Idle"),
            Tick::Changed { lamp } => defmt::write!(fmt, "Changed {{ lamp: {} }}", lamp),
            Tick::Settled => defmt::write!(fmt, "Settled"),
        }
    }
}
