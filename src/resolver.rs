//! Picks the expression variant for a single clause and recovers its property.

use tracing::trace;

use crate::error::{FinderError, Result};
use crate::expression::{ExpressionKind, MethodExpression};
use crate::registry::ExpressionSnapshot;

const NOT: &str = "Not";

/// Resolves a clause such as `AgeGreaterThan` against the registered variants.
///
/// The variant is the known name ending the clause; the text before it is the
/// property. Without a known ending the clause is an equality on the whole
/// clause. A trailing `Not` on the property is dropped. A clause that is
/// nothing but a variant name has no property and is rejected.
pub fn find_method_expression(snapshot: &ExpressionSnapshot, entity: &str, clause: &str) -> Result<MethodExpression> {
    if snapshot.contains(clause) {
        return Err(no_property_name(clause));
    }
    let matched = snapshot.pattern().captures(clause).and_then(|captures| {
        let suffix = captures.get(1)?;
        let factory = snapshot.factory(suffix.as_str())?;
        Some((factory, suffix.start()))
    });
    let expression = match matched {
        Some((factory, start)) => {
            let property = property_name(&clause[..start], clause)?;
            factory(entity, &property)
        }
        None => {
            let property = property_name(clause, clause)?;
            MethodExpression::new(ExpressionKind::Equal, entity, &property)
        }
    };
    trace!(clause, expression = %expression, "resolved clause");
    Ok(expression)
}

fn property_name(raw: &str, clause: &str) -> Result<String> {
    let raw = raw.strip_suffix(NOT).unwrap_or(raw);
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => Ok(first.to_lowercase().chain(chars).collect()),
        None => Err(no_property_name(clause)),
    }
}

fn no_property_name(clause: &str) -> FinderError {
    FinderError::IllegalConfiguration(format!("No property name specified in clause: {}", clause))
}
