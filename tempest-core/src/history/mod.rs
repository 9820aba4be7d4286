//! The history pipeline: resolve a window, pick a resolution, fetch from one
//! source, convert where the source did not, and downsample.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    config::StationConfig,
    error::TempestError,
    model::Observation,
    source::{ObservationQuery, ObservationSource, SourceKind},
    units::UnitSystem,
};

pub mod downsample;
pub mod resolution;
pub mod window;

pub use downsample::downsample;
pub use resolution::Resolution;
pub use window::{DateFlags, TimeWindow};

/// A fully resolved history request.
#[derive(Debug, Clone)]
pub struct HistoryRequest {
    pub station: StationConfig,
    pub window: TimeWindow,
    pub resolution: Resolution,
    pub units: UnitSystem,
}

impl HistoryRequest {
    /// Resolves the raw flags against `now`.
    pub fn from_flags(
        station: StationConfig,
        flags: &DateFlags,
        resolution: Option<&str>,
        units: UnitSystem,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Self, TempestError> {
        let window = TimeWindow::resolve(flags, now)?;
        let resolution = Resolution::select(resolution, window.span());
        Ok(Self {
            station,
            window,
            resolution,
            units,
        })
    }
}

/// Observations ready for rendering, in `units`.
#[derive(Debug, Clone)]
pub struct History {
    pub window: TimeWindow,
    pub resolution: Resolution,
    pub units: UnitSystem,
    pub source: SourceKind,
    pub observations: Vec<Observation>,
}

/// Runs the pipeline against a single source.
///
/// Errors from the source are returned as-is; there is no fallback to the
/// other source. Cancelling `cancel` aborts an in-flight fetch.
pub async fn fetch_history(
    source: &dyn ObservationSource,
    request: &HistoryRequest,
    cancel: &CancellationToken,
) -> Result<History, TempestError> {
    let kind = source.kind();
    let query = ObservationQuery {
        station: &request.station,
        window: request.window,
        units: request.units,
        resolution: request.resolution,
    };

    debug!(
        source = %kind,
        start = %request.window.start(),
        end = %request.window.end(),
        resolution = %request.resolution,
        "fetching history"
    );

    let mut observations = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(TempestError::Cancelled),
        result = source.observations(&query) => result?,
    };

    if !kind.converts_units() && request.units != UnitSystem::Metric {
        observations = observations
            .iter()
            .map(|obs| obs.converted(request.units))
            .collect();
    }

    // The daemon was already asked for this resolution; thinning again here
    // keeps the output consistent when it ignores the hint.
    if request.resolution.is_positive() {
        let before = observations.len();
        observations = downsample(observations, request.resolution.duration());
        debug!(before, after = observations.len(), "downsampled");
    }

    Ok(History {
        window: request.window,
        resolution: request.resolution,
        units: request.units,
        source: kind,
        observations,
    })
}
