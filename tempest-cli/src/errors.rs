use anyhow::anyhow;
use tempest_core::{ErrorKind, TempestError, TransportFailure, source::daemon};

/// Turns a core error into something a person can act on.
///
/// Validation and configuration errors already read well and pass through.
pub fn explain(err: TempestError) -> anyhow::Error {
    if let Some(status) = err.status() {
        return match status.as_u16() {
            401 if from_daemon(&err) => anyhow::Error::new(err).context(
                "authentication failed: tempestd rejected the request; \
                 check the daemon's access settings or --server URL",
            ),
            401 => anyhow!(
                "authentication failed: your API token may be invalid or expired.\n\
                 Check your token at https://tempestwx.com/settings/tokens"
            ),
            404 => anyhow::Error::new(err)
                .context("station not found: check that your station and device IDs are correct"),
            429 => anyhow!("rate limited by the WeatherFlow API; wait a moment and try again"),
            _ => err.into(),
        };
    }

    let target = match &err {
        TempestError::Transport { target, .. } => target.clone(),
        _ => return err.into(),
    };
    let hint = match err.transport_failure() {
        Some(TransportFailure::Timeout) => {
            format!("request timed out: {target} did not respond in time, try again later")
        }
        Some(TransportFailure::Dns) => {
            format!("DNS lookup failed for {target}: check your internet connection")
        }
        Some(TransportFailure::Connect) => {
            format!("network error: cannot reach {target}, check your connection or server URL")
        }
        _ => "network error".to_string(),
    };
    anyhow::Error::new(err).context(hint)
}

fn from_daemon(err: &TempestError) -> bool {
    matches!(err, TempestError::UpstreamStatus { target, .. } if target.as_str() == daemon::TARGET)
}

/// Whether the failure came from Ctrl-C rather than a real error.
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<TempestError>())
        .any(|e| e.kind() == ErrorKind::Cancelled)
}
