//! Command line of the `dynafinder` explain binary.

use std::path::PathBuf;

use clap::Parser;

use crate::value::Value;

/// Explains a finder call: parses the method name, applies it to a recording
/// query and prints the resulting query as JSON.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "dynafinder", version, about, long_about = None)]
pub struct Cli {
    /// Settings file; defaults to dynafinder.{json,toml,yaml} in the working directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Entity the finder is called on
    pub entity: String,

    /// Finder method name, e.g. findAllByLastNameAndAgeGreaterThan
    pub method: String,

    /// Call arguments as JSON; anything that is not JSON is taken as a string
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "JSON")]
    pub arguments: Vec<String>,
}

impl Cli {
    pub fn values(&self) -> Vec<Value> {
        self.arguments
            .iter()
            .map(|raw| match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(json) => Value::from(json),
                Err(_) => Value::Str(raw.clone()),
            })
            .collect()
    }
}
