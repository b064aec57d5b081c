//! Finder families: the top-level method name patterns a finder answers to.

use regex::Regex;

use crate::error::{FinderError, Result};

pub const FIND_BY: &str = "findBy";
pub const FIND_ALL_BY: &str = "findAllBy";
pub const FIND_ALL_BOOLEAN: &str = "findAllBoolean";
pub const FIND_BOOLEAN: &str = "findBoolean";
pub const COUNT_BY: &str = "countBy";

/// The built-in families, in the order a method name is tried against them.
/// `findAllBy` has to come before `findAllBoolean`, and both before
/// `findBoolean`, since the later patterns also match the earlier names.
pub const FAMILY_NAMES: [&str; 5] = [FIND_BY, FIND_ALL_BY, FIND_ALL_BOOLEAN, FIND_BOOLEAN, COUNT_BY];

#[derive(Debug, Clone)]
pub struct FinderFamily {
    name: String,
    pattern: Regex,
}

impl FinderFamily {
    pub fn new(name: &str, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| FinderError::IllegalConfiguration(e.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            pattern,
        })
    }
    pub fn built_in(name: &str) -> Result<Self> {
        let pattern = match name {
            FIND_BY => r"^(findBy)([A-Z]\w*)",
            FIND_ALL_BY => r"^(findAllBy)([A-Z]\w*)",
            FIND_ALL_BOOLEAN => r"^(findAll)((\w+)(By)([A-Z]\w*)|(\w+))",
            FIND_BOOLEAN => r"^(find)((\w+)(By)([A-Z]\w*)|(\w+))",
            COUNT_BY => r"^(countBy)([A-Z]\w*)",
            other => {
                return Err(FinderError::IllegalConfiguration(format!(
                    "Unknown finder family: {}",
                    other
                )));
            }
        };
        Self::new(name, pattern)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
    pub fn is_method_match(&self, method: &str) -> bool {
        self.pattern.is_match(method)
    }
}
