use std::{io, path::PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint, builder::FalseyValueParser};
use clap_complete::Shell;
use tempest_core::UnitSystem;
use tokio_util::sync::CancellationToken;

use crate::{configure, current, forecast, history, settings::Settings, stations, version};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "tempest",
    version,
    about = "CLI for WeatherFlow Tempest weather stations",
    long_about = "Query current conditions, forecasts and historical data from your \
                  WeatherFlow Tempest weather station, directly or through a local \
                  tempestd daemon."
)]
pub struct Cli {
    #[command(flatten)]
    pub globals: GlobalArgs,

    /// Defaults to `current`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options every command understands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Config file (defaults to the platform config dir, or $TEMPEST_CONFIG)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Station name from config
    #[arg(long, global = true, env = "TEMPEST_STATION")]
    pub station: Option<String>,

    /// Unit system: metric or imperial
    #[arg(long, global = true, env = "TEMPEST_UNITS", value_parser = parse_units)]
    pub units: Option<UnitSystem>,

    /// tempestd server URL for local data
    #[arg(long, global = true, env = "TEMPEST_SERVER", value_hint = ValueHint::Url)]
    pub server: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output (also set by NO_COLOR)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = FalseyValueParser::new(),
        hide_env_values = true
    )]
    pub no_color: bool,

    /// Use text labels instead of symbols for conditions
    #[arg(long, global = true)]
    pub no_emoji: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather conditions.
    Current,

    /// List configured stations and whether they are reporting.
    Stations,

    /// Show historical weather observations as a table.
    History(history::HistoryArgs),

    /// Show the multi-day forecast.
    Forecast(forecast::ForecastArgs),

    /// Manage configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Print version information.
    Version,

    /// Generate a shell completion script.
    #[command(after_help = "Examples:\n  \
                            source <(tempest completion bash)\n  \
                            tempest completion zsh > \"${fpath[1]}/_tempest\"\n  \
                            tempest completion fish > ~/.config/fish/completions/tempest.fish")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the current configuration with tokens redacted.
    Show,
    /// Interactive configuration wizard.
    Init,
}

fn parse_units(value: &str) -> Result<UnitSystem, String> {
    UnitSystem::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self, cancel: &CancellationToken) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Current);

        // These run without a usable config file.
        match &command {
            Command::Version => {
                print!("{}", version::render());
                return Ok(());
            }
            Command::Completion { shell } => {
                clap_complete::generate(*shell, &mut Cli::command(), "tempest", &mut io::stdout());
                return Ok(());
            }
            Command::Config {
                command: ConfigCommand::Init,
            } => return configure::init(&Settings::resolve_lenient(&self.globals)?),
            _ => {}
        }

        let settings = Settings::resolve(&self.globals)?;
        match command {
            Command::Current => current::run(&settings, cancel).await,
            Command::Stations => stations::run(&settings, cancel).await,
            Command::History(args) => history::run(args, &settings, cancel).await,
            Command::Forecast(args) => forecast::run(args, &settings, cancel).await,
            Command::Config { .. } => configure::show(&settings),
            Command::Version | Command::Completion { .. } => Ok(()),
        }
    }
}
