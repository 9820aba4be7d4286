use std::io;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use tempest_core::{DateFlags, HistoryRequest, HttpClient, fetch_history, source_for};
use tokio_util::sync::CancellationToken;

use crate::{display, errors, output, settings::Settings};

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Single day (YYYY-MM-DD, UTC midnight to midnight); wins over --from/--to
    #[arg(long)]
    pub date: Option<String>,

    /// Range start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Range end date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Data resolution: 1m, 5m, 30m or 3h (picked from the range if omitted)
    #[arg(long)]
    pub resolution: Option<String>,
}

pub async fn run(args: HistoryArgs, settings: &Settings, cancel: &CancellationToken) -> Result<()> {
    let station = settings.station()?.clone();
    let flags = DateFlags {
        date: args.date,
        from: args.from,
        to: args.to,
    };
    let request = HistoryRequest::from_flags(
        station,
        &flags,
        args.resolution.as_deref(),
        settings.units,
        Utc::now(),
    )?;

    let source = source_for(settings.server_url.as_ref(), HttpClient::new()?)?;
    let history = fetch_history(source.as_ref(), &request, cancel)
        .await
        .map_err(errors::explain)?;

    if settings.json {
        output::write_json(
            io::stdout().lock(),
            &output::HistoryDocument::new(&history, &request.station),
        )
    } else {
        print!(
            "{}",
            display::render_history(
                &history,
                &request.station.display_name(),
                &settings.theme()
            )
        );
        Ok(())
    }
}
