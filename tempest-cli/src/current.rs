use std::io;

use anyhow::Result;
use chrono::Utc;
use tempest_core::{HttpClient, fetch_current, source_for};
use tokio_util::sync::CancellationToken;

use crate::{display, errors, output, settings::Settings};

/// Latest conditions from tempestd when one is configured, else the cloud.
pub async fn run(settings: &Settings, cancel: &CancellationToken) -> Result<()> {
    let station = settings.station()?;
    let source = source_for(settings.server_url.as_ref(), HttpClient::new()?)?;

    let current = fetch_current(source.as_ref(), station, settings.units, cancel)
        .await
        .map_err(errors::explain)?;

    if settings.json {
        output::write_json(
            io::stdout().lock(),
            &output::CurrentDocument::new(&current, station),
        )
    } else {
        print!(
            "{}",
            display::render_current(
                &current,
                &current.station_name(station),
                &settings.theme(),
                Utc::now()
            )
        );
        Ok(())
    }
}
