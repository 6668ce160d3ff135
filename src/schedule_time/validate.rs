//! Client-side validation for schedule-time fields.
//!
//! Every mutation is validated here before anything is patched locally or sent
//! over the wire. Messages are the Spanish texts shown to the user.

use super::error::ScheduleTimeError;
use chrono::NaiveTime;
use regex::Regex;
use std::sync::LazyLock;

// Zero-padded 24-hour wall-clock time. The backend stores times exactly in
// this shape, which is what makes lexicographic ordering safe.
static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap());

/// Parses a strict `HH:MM` string into a [`NaiveTime`].
pub fn parse_time(value: &str) -> Result<NaiveTime, ScheduleTimeError> {
    if !TIME_REGEX.is_match(value) {
        return Err(ScheduleTimeError::InvalidTime {
            value: value.to_string(),
        });
    }

    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| ScheduleTimeError::InvalidTime {
        value: value.to_string(),
    })
}

/// Validates the primary and optional extended time range of a record.
///
/// Rules:
/// - all present times must be strict `HH:MM`
/// - `end` must be strictly later than `start`
/// - the extended range is both-or-none, with the same ordering constraint
pub fn validate_times(
    start: &str,
    end: &str,
    start_ext: Option<&str>,
    end_ext: Option<&str>,
) -> Result<(), ScheduleTimeError> {
    let start_t = parse_time(start)?;
    let end_t = parse_time(end)?;

    if end_t <= start_t {
        return Err(ScheduleTimeError::Validation {
            message: "La hora de fin debe ser posterior a la hora de inicio.".to_string(),
        });
    }

    match (start_ext, end_ext) {
        (None, None) => Ok(()),
        (Some(s), Some(e)) => {
            let s_t = parse_time(s)?;
            let e_t = parse_time(e)?;
            if e_t <= s_t {
                return Err(ScheduleTimeError::Validation {
                    message: "La hora de fin del segundo rango debe ser posterior a la de inicio."
                        .to_string(),
                });
            }
            Ok(())
        }
        _ => Err(ScheduleTimeError::Validation {
            message: "Debe indicar ambas horas del segundo rango o ninguna.".to_string(),
        }),
    }
}

/// Validates that a day set is non-empty after canonicalization.
pub fn validate_days(days: &[u8]) -> Result<(), ScheduleTimeError> {
    if super::days::canonical_days(days).is_empty() {
        return Err(ScheduleTimeError::Validation {
            message: "Debe seleccionar al menos un día.".to_string(),
        });
    }
    Ok(())
}
