use std::fmt;

/// What the user can do to recover from a location failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    /// Open the system settings and enable location access for the app.
    OpenSettings,
}

impl fmt::Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remediation::OpenSettings => f.write_str("open the system settings"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Server returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Location permission denied")]
    LocationPermissionDenied,

    #[error("Location services are disabled")]
    LocationServiceDisabled,

    #[error("Location unavailable; {remediation} to allow location access")]
    LocationUnavailable { remediation: Remediation },

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

impl WeatherError {
    /// Message suitable for an alert or inline error text.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::NetworkUnreachable(_) => {
                "Could not fetch weather data. Please check your internet connection.".to_string()
            }
            WeatherError::ServerError { status, message } => format!("Error: {status} - {message}"),
            WeatherError::LocationPermissionDenied => {
                "Location permission is required to show weather for your position.".to_string()
            }
            WeatherError::LocationServiceDisabled => {
                "Location services are off. Please turn them on.".to_string()
            }
            WeatherError::LocationUnavailable { remediation } => format!(
                "Your location could not be determined. Make sure location services are on \
                 and the app has permission ({remediation})."
            ),
            WeatherError::StorageFailure(_) => "Saved places could not be updated.".to_string(),
            WeatherError::Config(msg) => msg.clone(),
            WeatherError::Other(_) => "Something went wrong.".to_string(),
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            WeatherError::NetworkUnreachable(err.to_string())
        } else if let Some(status) = err.status() {
            WeatherError::ServerError { status: status.as_u16(), message: err.to_string() }
        } else {
            WeatherError::Other(err.to_string())
        }
    }
}

impl From<std::io::Error> for WeatherError {
    fn from(err: std::io::Error) -> Self {
        WeatherError::StorageFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_message_embeds_status_and_body_message() {
        let err = WeatherError::ServerError {
            status: 400,
            message: "No matching location found.".into(),
        };
        assert_eq!(err.user_message(), "Error: 400 - No matching location found.");
    }

    #[test]
    fn location_unavailable_mentions_settings() {
        let err = WeatherError::LocationUnavailable { remediation: Remediation::OpenSettings };
        assert!(err.to_string().contains("open the system settings"));
        assert!(err.user_message().contains("open the system settings"));
    }

    #[test]
    fn io_errors_become_storage_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: WeatherError = io.into();
        assert!(matches!(err, WeatherError::StorageFailure(msg) if msg.contains("read-only")));
    }
}
