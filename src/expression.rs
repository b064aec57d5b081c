//! Comparison expressions: one per clause of a finder method name.
//!
//! Every expression targets one property of one entity and knows how many
//! positional arguments it consumes. Once its arguments are bound it can be
//! turned into a [`Criterion`] for the query construct.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::entity::PersistentEntity;
use crate::query::Criterion;
use crate::value::{convert, ConversionError, Value};

/// Builds the criterion of a registered extension variant from its property
/// name and bound arguments.
pub type CriterionBuilder = fn(&str, &[Value]) -> Criterion;

// ------------- Custom Variants -------------
#[derive(Clone)]
pub struct CustomKind {
    name: Arc<str>,
    arity: usize,
    build: CriterionBuilder,
}

impl CustomKind {
    pub fn new(name: &str, arity: usize, build: CriterionBuilder) -> Self {
        Self {
            name: Arc::from(name),
            arity,
            build,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Debug for CustomKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CustomKind")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

// the builder is a plain function of the name, so name and arity identify a variant
impl PartialEq for CustomKind {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity == other.arity
    }
}

// ------------- Expression Kinds -------------
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Equal,
    NotEqual,
    Like,
    Ilike,
    Rlike,
    InList,
    InRange,
    Between,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    Custom(CustomKind),
}

impl ExpressionKind {
    pub const BUILT_IN: [ExpressionKind; 16] = [
        ExpressionKind::Equal,
        ExpressionKind::NotEqual,
        ExpressionKind::InList,
        ExpressionKind::InRange,
        ExpressionKind::Between,
        ExpressionKind::Like,
        ExpressionKind::Ilike,
        ExpressionKind::Rlike,
        ExpressionKind::GreaterThanEquals,
        ExpressionKind::LessThanEquals,
        ExpressionKind::GreaterThan,
        ExpressionKind::LessThan,
        ExpressionKind::IsNull,
        ExpressionKind::IsNotNull,
        ExpressionKind::IsEmpty,
        ExpressionKind::IsNotEmpty,
    ];

    /// The suffix that selects this variant in a method name clause.
    pub fn name(&self) -> &str {
        match self {
            Self::Equal => "Equal",
            Self::NotEqual => "NotEqual",
            Self::Like => "Like",
            Self::Ilike => "Ilike",
            Self::Rlike => "Rlike",
            Self::InList => "InList",
            Self::InRange => "InRange",
            Self::Between => "Between",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanEquals => "GreaterThanEquals",
            Self::LessThan => "LessThan",
            Self::LessThanEquals => "LessThanEquals",
            Self::IsNull => "IsNull",
            Self::IsNotNull => "IsNotNull",
            Self::IsEmpty => "IsEmpty",
            Self::IsNotEmpty => "IsNotEmpty",
            Self::Custom(custom) => custom.name(),
        }
    }

    pub fn arguments_required(&self) -> usize {
        match self {
            Self::IsNull | Self::IsNotNull | Self::IsEmpty | Self::IsNotEmpty => 0,
            Self::Between => 2,
            Self::Custom(custom) => custom.arity(),
            _ => 1,
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for ExpressionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ------------- Method Expression -------------
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodExpression {
    entity: String,
    property: String,
    kind: ExpressionKind,
    arguments: Vec<Value>,
}

impl MethodExpression {
    pub fn new(kind: ExpressionKind, entity: &str, property: &str) -> Self {
        Self {
            entity: entity.to_string(),
            property: property.to_string(),
            kind,
            arguments: Vec::new(),
        }
    }
    pub fn entity(&self) -> &str {
        &self.entity
    }
    pub fn property(&self) -> &str {
        &self.property
    }
    pub fn kind(&self) -> &ExpressionKind {
        &self.kind
    }
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }
    pub fn arguments_required(&self) -> usize {
        self.kind.arguments_required()
    }
    pub fn set_arguments(&mut self, arguments: Vec<Value>) {
        self.arguments = arguments;
    }

    /// Converts the bound arguments to the declared type of the target property.
    /// Arguments are only replaced when every one of them converts; unknown
    /// properties are left alone.
    pub fn convert_arguments(&mut self, entity: &PersistentEntity) -> Result<(), ConversionError> {
        let property = match entity.property_by_name(&self.property) {
            Some(property) => property,
            None => return Ok(()),
        };
        if self.arguments_required() == 0 {
            return Ok(());
        }
        let target = property.value_type();
        let converted = match self.kind {
            ExpressionKind::InList => self
                .arguments
                .iter()
                .map(|argument| match argument {
                    Value::List(values) => values
                        .iter()
                        .map(|v| convert(v, target))
                        .collect::<Result<Vec<_>, _>>()
                        .map(Value::List),
                    Value::Null => Ok(Value::Null),
                    other => convert(other, target).map(|v| Value::List(vec![v])),
                })
                .collect::<Result<Vec<_>, _>>()?,
            ExpressionKind::InRange => self
                .arguments
                .iter()
                .map(|argument| match argument {
                    Value::Range(from, to) => Ok(Value::range(convert(from, target)?, convert(to, target)?)),
                    Value::Null => Ok(Value::Null),
                    other => Err(ConversionError {
                        value: other.to_string(),
                        target: format!("Range<{}>", target),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => self
                .arguments
                .iter()
                .map(|argument| convert(argument, target))
                .collect::<Result<Vec<_>, _>>()?,
        };
        self.arguments = converted;
        Ok(())
    }

    fn argument(&self, index: usize) -> Value {
        self.arguments.get(index).cloned().unwrap_or(Value::Null)
    }

    pub fn create_criterion(&self) -> Criterion {
        let property = self.property.clone();
        match &self.kind {
            ExpressionKind::Equal => Criterion::Equals { property, value: self.argument(0) },
            ExpressionKind::NotEqual => Criterion::NotEquals { property, value: self.argument(0) },
            ExpressionKind::Like => Criterion::Like { property, value: self.argument(0) },
            ExpressionKind::Ilike => Criterion::ILike { property, value: self.argument(0) },
            ExpressionKind::Rlike => Criterion::RLike { property, value: self.argument(0) },
            ExpressionKind::InList => {
                let values = match self.argument(0) {
                    Value::List(values) => values,
                    other => vec![other],
                };
                Criterion::In { property, values }
            }
            ExpressionKind::InRange => match self.argument(0) {
                Value::Range(from, to) => Criterion::Between { property, from: *from, to: *to },
                other => Criterion::In { property, values: vec![other] },
            },
            ExpressionKind::Between => Criterion::Between {
                property,
                from: self.argument(0),
                to: self.argument(1),
            },
            ExpressionKind::GreaterThan => Criterion::GreaterThan { property, value: self.argument(0) },
            ExpressionKind::GreaterThanEquals => Criterion::GreaterThanEquals { property, value: self.argument(0) },
            ExpressionKind::LessThan => Criterion::LessThan { property, value: self.argument(0) },
            ExpressionKind::LessThanEquals => Criterion::LessThanEquals { property, value: self.argument(0) },
            ExpressionKind::IsNull => Criterion::IsNull { property },
            ExpressionKind::IsNotNull => Criterion::IsNotNull { property },
            ExpressionKind::IsEmpty => Criterion::IsEmpty { property },
            ExpressionKind::IsNotEmpty => Criterion::IsNotEmpty { property },
            ExpressionKind::Custom(custom) => (custom.build)(&property, &self.arguments),
        }
    }
}

impl fmt::Display for MethodExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.property)
    }
}
