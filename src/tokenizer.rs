//! Splits a finder method name into its boolean clause and query sequence,
//! and the query sequence into clauses around a boolean operator.

use regex::Regex;
use tracing::trace;

use crate::error::{FinderError, Result};

/// Number of capture groups of a family pattern that can carry a boolean
/// property, e.g. `(findAll)((\w+)(By)([A-Z]\w*)|(\w+))`.
pub const BOOLEAN_LAYOUT_GROUPS: usize = 6;

const NOT: &str = "Not";

/// A bare boolean property such as `Enabled` in `findAllEnabledByName`.
/// A leading `Not` flips the value the property is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanClause<'m> {
    pub property: &'m str,
    pub value: bool,
}

impl<'m> BooleanClause<'m> {
    fn parse(property: &'m str) -> Self {
        let negated = property
            .strip_prefix(NOT)
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()));
        match negated {
            Some(rest) => Self { property: rest, value: false },
            None => Self { property, value: true },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTokens<'m> {
    pub boolean: Option<BooleanClause<'m>>,
    pub sequence: Option<&'m str>,
}

/// Applies a family pattern to a method name.
///
/// Patterns with the six-group layout yield a boolean clause from group 3 with
/// the sequence in group 5, or a boolean clause from group 6 alone. Any other
/// pattern yields its second group as the sequence.
pub fn tokenize<'m>(pattern: &Regex, method: &'m str) -> Result<MethodTokens<'m>> {
    let captures = pattern.captures(method).ok_or_else(|| FinderError::MalformedMethodName {
        method: method.to_string(),
        pattern: pattern.as_str().to_string(),
    })?;
    let group = |i: usize| captures.get(i).map(|m| m.as_str());
    let tokens = if pattern.captures_len() - 1 == BOOLEAN_LAYOUT_GROUPS {
        let (boolean, sequence) = match group(3) {
            Some(property) => (Some(property), group(5)),
            None => (group(6), None),
        };
        MethodTokens {
            boolean: boolean.map(BooleanClause::parse),
            sequence,
        }
    } else {
        MethodTokens {
            boolean: None,
            sequence: group(2),
        }
    };
    trace!(method, ?tokens, "tokenized finder method");
    Ok(tokens)
}

// ------------- Operators -------------
/// A boolean operator joining the clauses of a sequence, e.g. `And`.
#[derive(Debug, Clone)]
pub struct Operator {
    name: String,
    pattern: Regex,
}

impl Operator {
    pub fn new(name: &str) -> Result<Self> {
        let source = format!(r"(\w+)({})(\p{{Upper}})(\w+)", regex::escape(name));
        let pattern = Regex::new(&source).map_err(|e| FinderError::IllegalConfiguration(e.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            pattern,
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Whether the operator appears between two words of the sequence.
    pub fn is_match(&self, sequence: &str) -> bool {
        self.pattern.is_match(sequence)
    }
}

/// Splits a sequence on the first operator (in the given order) that joins two
/// words of it. Every occurrence of that operator splits, trailing empty
/// pieces are dropped. Returns `None` when the sequence is a single clause.
pub fn split_on_operator<'o, 's>(operators: &'o [Operator], sequence: &'s str) -> Option<(&'o Operator, Vec<&'s str>)> {
    let operator = operators.iter().find(|o| o.is_match(sequence))?;
    let mut clauses: Vec<&str> = sequence.split(operator.name()).collect();
    while clauses.last().is_some_and(|c| c.is_empty()) {
        clauses.pop();
    }
    trace!(operator = operator.name(), ?clauses, "split query sequence");
    Some((operator, clauses))
}
