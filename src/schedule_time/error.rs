//! Error types for schedule-time operations.

use thiserror::Error;

/// Errors that can occur while validating, fetching, or mutating schedule
/// times.
#[derive(Debug, Error, Clone)]
pub enum ScheduleTimeError {
    /// Client-side validation failed; no request was issued
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// A time value is not a zero-padded 24-hour HH:MM string
    #[error("Invalid time value: {value:?}")]
    InvalidTime { value: String },

    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// The backend rejected the credentials
    #[error("Unauthorized (status {status})")]
    Unauthorized { status: u16 },

    /// The record does not exist on the server
    #[error("Schedule time {id} not found")]
    NotFound { id: i64 },

    /// Server returned an unexpected status or body
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// Response body did not match the expected record shape
    #[error("Undecodable response: {message}")]
    Decode { message: String },

    /// URL parsing/construction failed
    #[error("URL error: {message}")]
    UrlError { message: String },
}

impl ScheduleTimeError {
    /// Returns the Spanish text the presentation layer shows as a toast.
    pub fn user_message(&self) -> String {
        match self {
            ScheduleTimeError::Validation { message } => message.clone(),
            ScheduleTimeError::InvalidTime { value } => {
                format!("Hora no válida: \"{value}\". Use el formato HH:MM.")
            }
            ScheduleTimeError::Network { .. } => {
                "No se pudo conectar con el servidor. Inténtelo de nuevo.".to_string()
            }
            ScheduleTimeError::Unauthorized { .. } => {
                "Su sesión ha expirado. Vuelva a iniciar sesión.".to_string()
            }
            ScheduleTimeError::NotFound { .. } => {
                "El horario no existe o ya fue eliminado.".to_string()
            }
            ScheduleTimeError::UnexpectedResponse { .. } => {
                "El servidor respondió con un error. Inténtelo de nuevo.".to_string()
            }
            ScheduleTimeError::Decode { .. } => {
                "Se recibió una respuesta no válida del servidor. Actualizando la lista."
                    .to_string()
            }
            ScheduleTimeError::UrlError { .. } => {
                "Error interno al preparar la solicitud.".to_string()
            }
        }
    }

    /// Returns true if retrying the same user action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScheduleTimeError::Network { .. }
                | ScheduleTimeError::UnexpectedResponse { .. }
                | ScheduleTimeError::Decode { .. }
        )
    }

    /// Returns true if the local list can no longer be trusted and must be
    /// refetched from the server.
    pub fn needs_refetch(&self) -> bool {
        matches!(self, ScheduleTimeError::Decode { .. })
    }

    /// Returns true if the failure happened before any network call.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            ScheduleTimeError::Validation { .. } | ScheduleTimeError::InvalidTime { .. }
        )
    }
}

impl From<reqwest::Error> for ScheduleTimeError {
    fn from(err: reqwest::Error) -> Self {
        ScheduleTimeError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ScheduleTimeError {
    fn from(err: url::ParseError) -> Self {
        ScheduleTimeError::UrlError {
            message: err.to_string(),
        }
    }
}
