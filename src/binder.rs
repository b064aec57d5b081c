//! Binds positional call arguments to resolved expressions, left to right.

use thiserror::Error;
use tracing::warn;

use crate::entity::PersistentEntity;
use crate::error::{FinderError, Result};
use crate::expression::{ExpressionKind, MethodExpression};
use crate::value::{render_arguments, Value};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{required} arguments required, {available} available")]
pub struct InsufficientArguments {
    pub required: usize,
    pub available: usize,
}

// ------------- Cursor -------------
/// A window over the call arguments that shrinks from the front.
#[derive(Debug, Clone)]
pub struct ArgumentCursor {
    arguments: Vec<Value>,
    position: usize,
}

impl ArgumentCursor {
    pub fn new(arguments: Vec<Value>) -> Self {
        Self { arguments, position: 0 }
    }
    pub fn take(&mut self, n: usize) -> std::result::Result<Vec<Value>, InsufficientArguments> {
        let available = self.arguments.len() - self.position;
        if n > available {
            return Err(InsufficientArguments { required: n, available });
        }
        let taken = self.arguments[self.position..self.position + n].to_vec();
        self.position += n;
        Ok(taken)
    }
    pub fn remaining(&self) -> &[Value] {
        &self.arguments[self.position..]
    }
    /// Every argument of the call, consumed or not.
    pub fn all(&self) -> &[Value] {
        &self.arguments
    }
    pub fn into_remaining(mut self) -> Vec<Value> {
        self.arguments.split_off(self.position)
    }
}

/// Sets the arguments of an expression, except that an equality against a
/// single null becomes an is-null check on the same property.
pub fn initialize_expression(mut expression: MethodExpression, arguments: Vec<Value>) -> MethodExpression {
    if *expression.kind() == ExpressionKind::Equal && arguments.len() == 1 && arguments[0].is_null() {
        return MethodExpression::new(ExpressionKind::IsNull, expression.entity(), expression.property());
    }
    expression.set_arguments(arguments);
    expression
}

/// How a failed argument conversion is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    /// Any conversion failure means the finder does not match.
    Strict,
    /// Failures on basic properties keep the unconverted arguments.
    BasicProperties,
}

// ------------- Binder -------------
pub struct Binder<'a> {
    entity: &'a PersistentEntity,
    method: &'a str,
    cursor: ArgumentCursor,
}

impl<'a> Binder<'a> {
    pub fn new(entity: &'a PersistentEntity, method: &'a str, arguments: Vec<Value>) -> Self {
        Self {
            entity,
            method,
            cursor: ArgumentCursor::new(arguments),
        }
    }

    fn no_matching_method(&self) -> FinderError {
        FinderError::NoMatchingMethod {
            method: self.method.to_string(),
            entity: self.entity.name().to_string(),
            arguments: render_arguments(self.cursor.all()),
        }
    }

    /// Consumes the arguments an expression requires and converts them to the
    /// type of its property.
    pub fn bind(&mut self, expression: MethodExpression, tolerance: Tolerance) -> Result<MethodExpression> {
        let arguments = match self.cursor.take(expression.arguments_required()) {
            Ok(arguments) => arguments,
            Err(_) => return Err(self.no_matching_method()),
        };
        let mut expression = initialize_expression(expression, arguments);
        if let Err(e) = expression.convert_arguments(self.entity) {
            let basic = self
                .entity
                .property_by_name(expression.property())
                .is_some_and(|p| p.is_basic());
            if tolerance == Tolerance::Strict || !basic {
                return Err(self.no_matching_method());
            }
            warn!(method = self.method, property = expression.property(), error = %e, "keeping unconverted arguments");
        }
        Ok(expression)
    }

    pub fn remaining(&self) -> &[Value] {
        self.cursor.remaining()
    }

    pub fn into_remaining(self) -> Vec<Value> {
        self.cursor.into_remaining()
    }
}
