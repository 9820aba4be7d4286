use std::error::Error as StdError;
use std::fmt;

use chrono::NaiveDate;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced while resolving and fetching station data.
#[derive(Debug, Error)]
pub enum TempestError {
    #[error("invalid --{flag} format (use YYYY-MM-DD): '{value}'")]
    InvalidDate {
        flag: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("both --from and --to are required for a date range")]
    IncompleteRange,

    #[error("invalid date range: --from {from} is after --to {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },

    #[error("date {0} is out of the supported range")]
    DateOutOfRange(NaiveDate),

    #[error(
        "device_id is required for historical data on station '{station}'.\n\
         Hint: add it to your station config or re-run `tempest config init`."
    )]
    MissingDeviceId { station: String },

    #[error("invalid server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request to {target} failed")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{target} returned status {status} for {path}")]
    UpstreamStatus {
        target: String,
        status: StatusCode,
        path: String,
    },

    #[error("response from {path} exceeds the {limit} byte limit")]
    ResponseTooLarge { path: String, limit: usize },

    #[error("{path} returned no data")]
    EmptyResponse { path: String },

    #[error("decoding response from {path}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request cancelled")]
    Cancelled,
}

/// Coarse classification callers use to decide how to report an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Transport,
    UpstreamStatus,
    Decode,
    Cancelled,
}

/// What went wrong underneath a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    Dns,
    Connect,
    Other,
}

impl TempestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TempestError::InvalidDate { .. }
            | TempestError::IncompleteRange
            | TempestError::InvertedRange { .. }
            | TempestError::DateOutOfRange(_) => ErrorKind::Validation,
            TempestError::MissingDeviceId { .. } | TempestError::InvalidServerUrl { .. } => {
                ErrorKind::Configuration
            }
            TempestError::ClientBuild(_) | TempestError::Transport { .. } => ErrorKind::Transport,
            TempestError::UpstreamStatus { .. } => ErrorKind::UpstreamStatus,
            TempestError::ResponseTooLarge { .. }
            | TempestError::EmptyResponse { .. }
            | TempestError::Decode { .. } => ErrorKind::Decode,
            TempestError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Sub-classifies transport failures; `None` for every other kind.
    pub fn transport_failure(&self) -> Option<TransportFailure> {
        let TempestError::Transport { source, .. } = self else {
            return None;
        };

        if source.is_timeout() {
            return Some(TransportFailure::Timeout);
        }
        if chain_mentions(source, "dns error") {
            return Some(TransportFailure::Dns);
        }
        if source.is_connect() {
            return Some(TransportFailure::Connect);
        }
        Some(TransportFailure::Other)
    }

    /// HTTP status of an upstream rejection, if that is what this is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TempestError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Transport => "transport",
            ErrorKind::UpstreamStatus => "upstream status",
            ErrorKind::Decode => "decode",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

fn chain_mentions(err: &(dyn StdError + 'static), needle: &str) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.to_string().to_lowercase().contains(needle) {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_name_the_flag_and_format() {
        let source = NaiveDate::parse_from_str("bad", "%Y-%m-%d").unwrap_err();
        let err = TempestError::InvalidDate {
            flag: "from",
            value: "bad".into(),
            source,
        };

        assert_eq!(err.kind(), ErrorKind::Validation);
        let msg = err.to_string();
        assert!(msg.contains("--from"));
        assert!(msg.contains("YYYY-MM-DD"));
    }

    #[test]
    fn missing_device_id_is_a_configuration_error_with_hint() {
        let err = TempestError::MissingDeviceId {
            station: "home".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("tempest config init"));
        assert_eq!(err.transport_failure(), None);
    }

    #[test]
    fn upstream_status_exposes_code_and_path() {
        let err = TempestError::UpstreamStatus {
            target: "tempestd".into(),
            status: StatusCode::NOT_FOUND,
            path: "/api/v1/stations/1/observations".into(),
        };
        assert_eq!(err.kind(), ErrorKind::UpstreamStatus);
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("/api/v1/stations/1/observations"));
    }
}
