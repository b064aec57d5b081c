//! Explains a finder call: parses the method name, applies it to a recording
//! query and prints the resulting query as JSON.
//!
//! ```text
//! dynafinder [--config FILE] <Entity> <methodName> [JSON argument ...]
//! ```
//!
//! Entities come from the settings file (`dynafinder.{json,toml,yaml}` in the
//! working directory unless `--config` names another one).

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dynafinder::cli::Cli;
use dynafinder::entity::MappingContext;
use dynafinder::error::{FinderError, Result};
use dynafinder::finder::Finders;
use dynafinder::recording::RecordingSession;
use dynafinder::settings::FinderSettings;

fn run(cli: Cli) -> Result<String> {
    let settings = FinderSettings::load(cli.config.as_deref())?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let context = MappingContext::from_definitions(&settings.entities)?;
    info!(entities = context.len(), families = settings.families.len(), "loaded settings");
    let session = RecordingSession::new(context);
    let finders = Finders::from_settings(&settings)?;
    let results = finders.invoke(&session, &cli.entity, &cli.method, cli.values())?;
    info!(method = %cli.method, %results, "finder executed");

    let executed = session.executed()?;
    serde_json::to_string_pretty(&executed).map_err(|e| FinderError::Config(e.to_string()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(explained) => {
            println!("{}", explained);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "finder failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
