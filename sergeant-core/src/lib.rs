//! Sergeant Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies (nur embedded-hal Traits).
//! Sie definiert das Status-Modell, die Abbildung auf LEDs und Display
//! und die Traits für den Hardware-Zugriff.

#![no_std]

pub mod command;
pub mod display;
pub mod indicator;
pub mod lcd;
pub mod link;
pub mod reconciler;
pub mod source;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use command::{
    COMMAND_ACCEPTED, COMMAND_REJECTED, CommandError, command_return_code, parse_set_status,
};
pub use display::{
    DebouncePolicy, DisplayFrame, DisplayLine, LCD_COLUMNS, LCD_ROWS, SourceKind,
};
pub use indicator::{LampMirror, indicator_for, lamp_states, mirror_color};
pub use lcd::{Hd44780, LcdPins};
pub use link::{LinkState, LinkSupervisor, PingSchedule, ReceiveWindow, ReconnectPolicy};
pub use reconciler::{Profile, ReconcileError, ReconcilerState, StatusReconciler, Tick};
pub use source::{ButtonLevels, local_poll, receive_outcome};
pub use traits::{CharDisplay, DisplayError, IndicatorLeds, LedError, SmartLedWriter};
pub use types::{FeedCategory, Lamp, STATUS_TEXT_CAPACITY, SourcePoll, StatusText, StatusValue};
