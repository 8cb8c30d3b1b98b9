//! `setStatus` Endpoint: Argument → Modus

use crate::types::Lamp;

/// Rückgabewert bei akzeptiertem Kommando
pub const COMMAND_ACCEPTED: i32 = 1;

/// Rückgabewert bei unbekanntem Argument
pub const COMMAND_REJECTED: i32 = -1;

/// Fehler-Typ für den `setStatus` Endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    UnknownStatus,
}

impl core::convert::TryFrom<&str> for Lamp {
    type Error = CommandError;

    /// Exakter Vergleich, keine Groß/Kleinschreibungs-Toleranz
    fn try_from(name: &str) -> Result<Self, Self::Error> {
        match name {
            "blue" => Ok(Lamp::Blue),
            "green" => Ok(Lamp::Green),
            "red" => Ok(Lamp::Red),
            _ => Err(CommandError::UnknownStatus),
        }
    }
}

pub fn parse_set_status(arg: &str) -> Result<Lamp, CommandError> {
    Lamp::try_from(arg)
}

/// Integer-Code wie ihn der Aufrufer des Endpoints erwartet
pub fn command_return_code<T>(result: &Result<T, CommandError>) -> i32 {
    match result {
        Ok(_) => COMMAND_ACCEPTED,
        Err(_) => COMMAND_REJECTED,
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CommandError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Unknown status")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!(parse_set_status("blue"), Ok(Lamp::Blue));
        assert_eq!(parse_set_status("green"), Ok(Lamp::Green));
        assert_eq!(parse_set_status("red"), Ok(Lamp::Red));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(parse_set_status("Blue"), Err(CommandError::UnknownStatus));
        assert_eq!(parse_set_status(" red"), Err(CommandError::UnknownStatus));
    }

    #[test]
    fn test_return_codes() {
        assert_eq!(command_return_code(&parse_set_status("green")), 1);
        assert_eq!(command_return_code(&parse_set_status("purple")), -1);
    }

    #[test]
    fn test_as_str_round_trips() {
        for lamp in Lamp::ALL {
            assert_eq!(parse_set_status(lamp.as_str()), Ok(lamp));
        }
    }
}
