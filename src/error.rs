use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid season format '{input}'. Expected e.g. '2023-24'.")]
    InvalidFormat { input: String },

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("No data for season {season} ({year}); run the refresh job for that year first")]
    NotSeeded { year: i32, season: String },
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Caller-input problems (bad label, unknown entity) as opposed to faults
    /// in the store, the provider or the deployment.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidFormat { .. } | Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::UpstreamUnavailable(format!("request timed out: {err}"));
        }
        Self::UpstreamUnavailable(format!("request failed: {err}"))
    }
}

impl From<parquet::errors::ParquetError> for Error {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Self::UpstreamUnavailable(format!("undecodable snapshot: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn client_errors_are_distinguished_from_faults() {
        assert!(
            Error::InvalidFormat {
                input: "x".to_string()
            }
            .is_client_error()
        );
        assert!(Error::not_found("player", "42").is_client_error());
        assert!(!Error::upstream("down").is_client_error());
        assert!(
            !Error::NotSeeded {
                year: 2024,
                season: "2023-24".to_string()
            }
            .is_client_error()
        );
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = Error::not_found("team", "duke");
        assert_eq!(err.to_string(), "team 'duke' not found");
    }
}
