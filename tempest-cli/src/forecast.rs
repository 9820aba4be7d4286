use std::io;

use anyhow::Result;
use clap::Args;
use tempest_core::{
    HttpClient,
    forecast::{clamp_days, fetch_forecast},
    source::{ObservationSource, cloud::CloudSource, daemon::DaemonSource},
};
use tokio_util::sync::CancellationToken;

use crate::{display, errors, output, settings::Settings};

#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// Number of days to show (1-10)
    #[arg(short, long, default_value_t = 5, allow_negative_numbers = true)]
    pub days: i64,
}

/// Asks tempestd first when one is configured and falls back to the cloud.
pub async fn run(args: ForecastArgs, settings: &Settings, cancel: &CancellationToken) -> Result<()> {
    let station = settings.station()?;
    let days = clamp_days(args.days);
    let http = HttpClient::new()?;
    let cloud = CloudSource::new(http.clone())?;

    let forecast = match &settings.server_url {
        Some(url) => {
            let daemon = DaemonSource::new(http, url.clone());
            let fallback: &dyn ObservationSource = &cloud;
            fetch_forecast(&daemon, Some(fallback), station, cancel).await
        }
        None => fetch_forecast(&cloud, None, station, cancel).await,
    }
    .map_err(errors::explain)?;

    if settings.json {
        output::write_json(
            io::stdout().lock(),
            &output::ForecastDocument::new(&forecast, days, settings.units, station),
        )
    } else {
        print!(
            "{}",
            display::render_forecast(
                &forecast,
                days,
                settings.units,
                &station.display_name(),
                &settings.theme()
            )
        );
        Ok(())
    }
}
