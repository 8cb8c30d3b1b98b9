// Library-Root: Hardware-Anbindung und Tasks der Firmware
// Keine Standard-Bibliothek (Embedded System)
//
// Die eigentliche Logik (Reconciler, Quellen, Display-Texte) liegt in
// sergeant-core und ist dort auf dem Host getestet.
#![no_std]

// picoserve (alloc Feature) nutzt String für Pfad-Parameter
extern crate alloc;

// Module
pub mod config;
pub mod hal;
pub mod tasks;

// Re-exports von sergeant-core
pub use sergeant_core::{Lamp, Profile, SourceKind, StatusReconciler};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Übergabe von setStatus Kommandos (HTTP Task → Status Task)
///
/// Signal hält nur den letzten Wert: mehrere Kommandos vor dem nächsten
/// Durchlauf überschreiben sich, der letzte gewinnt.
pub type PendingStatus = Signal<CriticalSectionRawMutex, Lamp>;
