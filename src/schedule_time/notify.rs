//! User-facing notification messages.
//!
//! Core operations return plain `Result`s; turning an outcome into a toast is
//! the presentation layer's job. These are the values it renders.

use super::error::ScheduleTimeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A toast message in Spanish, produced as a value rather than fired as a
/// side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: &str) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.to_string(),
        }
    }

    pub fn created() -> Self {
        Self::success("Horario creado correctamente.")
    }

    pub fn updated() -> Self {
        Self::success("Horario actualizado correctamente.")
    }

    pub fn sent_to_recycle_bin() -> Self {
        Self::success("Horario enviado a la papelera.")
    }

    pub fn restored() -> Self {
        Self::success("Horario restaurado correctamente.")
    }

    pub fn deleted() -> Self {
        Self::success("Horario eliminado definitivamente.")
    }

    pub fn from_error(err: &ScheduleTimeError) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: err.user_message(),
        }
    }

    /// Maps a mutation outcome to the toast the presentation layer shows.
    pub fn for_outcome<T>(result: &Result<T, ScheduleTimeError>, on_success: Notice) -> Self {
        match result {
            Ok(_) => on_success,
            Err(err) => Self::from_error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_notice_uses_spanish_user_message() {
        let err = ScheduleTimeError::Validation {
            message: "La hora de fin debe ser posterior a la hora de inicio.".to_string(),
        };
        let notice = Notice::from_error(&err);
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(
            notice.text,
            "La hora de fin debe ser posterior a la hora de inicio."
        );
    }

    #[test]
    fn test_outcome_mapping() {
        let ok: Result<(), ScheduleTimeError> = Ok(());
        assert_eq!(Notice::for_outcome(&ok, Notice::updated()), Notice::updated());

        let err: Result<(), ScheduleTimeError> = Err(ScheduleTimeError::Network {
            message: "connection refused".to_string(),
        });
        let notice = Notice::for_outcome(&err, Notice::updated());
        assert_eq!(notice.kind, NoticeKind::Error);
    }
}
