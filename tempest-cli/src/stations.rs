use std::io;

use anyhow::{Result, bail};
use chrono::Utc;
use tempest_core::{HttpClient, source_for, station_statuses};
use tokio_util::sync::CancellationToken;

use crate::{display, errors, output, settings::Settings};

/// Every configured station with its reporting status. Unreachable stations
/// are listed as offline rather than failing the command.
pub async fn run(settings: &Settings, cancel: &CancellationToken) -> Result<()> {
    if settings.config.stations.is_empty() {
        bail!("no stations configured; run `tempest config init` to set up");
    }

    let source = source_for(settings.server_url.as_ref(), HttpClient::new()?)?;
    let now = Utc::now();
    let statuses = station_statuses(source.as_ref(), &settings.config, now, cancel)
        .await
        .map_err(errors::explain)?;

    if settings.json {
        let rows: Vec<output::StationRow> = statuses.iter().map(output::StationRow::from).collect();
        output::write_json(io::stdout().lock(), &rows)
    } else {
        print!(
            "{}",
            display::render_stations(&statuses, &settings.theme(), now)
        );
        Ok(())
    }
}
