use thiserror::Error;

use crate::value::ConversionError;

#[derive(Error, Debug)]
pub enum FinderError {
    /// The arguments do not fit the clause structure parsed from the method name.
    /// Callers treat this as "no such finder" and may fall back to other strategies.
    #[error("No signature of method {entity}.{method}() is applicable for argument values {arguments}")]
    NoMatchingMethod {
        method: String,
        entity: String,
        arguments: String,
    },
    #[error("Illegal configuration: {0}")]
    IllegalConfiguration(String),
    #[error("Method name {method} does not match finder pattern {pattern}")]
    MalformedMethodName { method: String, pattern: String },
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl FinderError {
    pub fn is_no_matching_method(&self) -> bool {
        matches!(self, Self::NoMatchingMethod { .. })
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;

// Helper conversions
impl From<config::ConfigError> for FinderError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
