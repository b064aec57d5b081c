//! The abstract query construct that finder invocations are applied to.
//!
//! Storage engines implement [`Query`] and [`Session`]; this crate only ever
//! adds criteria, projections, orderings, pagination and fetch strategies to
//! a query and asks it for results.

use std::sync::Arc;

use serde::Serialize;
use std::fmt;

use crate::entity::{MappingContext, PersistentEntity};
use crate::error::Result;
use crate::value::{ArgumentMap, Value};

// ------------- Criterion -------------
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Criterion {
    Equals { property: String, value: Value },
    NotEquals { property: String, value: Value },
    Like { property: String, value: Value },
    ILike { property: String, value: Value },
    RLike { property: String, value: Value },
    In { property: String, values: Vec<Value> },
    Between { property: String, from: Value, to: Value },
    GreaterThan { property: String, value: Value },
    GreaterThanEquals { property: String, value: Value },
    LessThan { property: String, value: Value },
    LessThanEquals { property: String, value: Value },
    IsNull { property: String },
    IsNotNull { property: String },
    IsEmpty { property: String },
    IsNotEmpty { property: String },
    Conjunction { criteria: Vec<Criterion> },
    Disjunction { criteria: Vec<Criterion> },
    Negation { criterion: Box<Criterion> },
}

impl Criterion {
    pub fn eq(property: &str, value: impl Into<Value>) -> Self {
        Self::Equals {
            property: property.to_string(),
            value: value.into(),
        }
    }
    pub fn gt(property: &str, value: impl Into<Value>) -> Self {
        Self::GreaterThan {
            property: property.to_string(),
            value: value.into(),
        }
    }
    pub fn lt(property: &str, value: impl Into<Value>) -> Self {
        Self::LessThan {
            property: property.to_string(),
            value: value.into(),
        }
    }
    pub fn is_null(property: &str) -> Self {
        Self::IsNull {
            property: property.to_string(),
        }
    }
    pub fn not(criterion: Criterion) -> Self {
        Self::Negation {
            criterion: Box::new(criterion),
        }
    }
}

// ------------- Projection -------------
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Projection {
    Id,
    Count,
    Distinct,
    Property { property: String },
    CountDistinct { property: String },
    Min { property: String },
    Max { property: String },
    Sum { property: String },
    Avg { property: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProjectionList {
    projections: Vec<Projection>,
}

impl ProjectionList {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add(&mut self, projection: Projection) -> &mut Self {
        self.projections.push(projection);
        self
    }
    pub fn count(&mut self) -> &mut Self {
        self.add(Projection::Count)
    }
    pub fn distinct(&mut self) -> &mut Self {
        self.add(Projection::Distinct)
    }
    pub fn id(&mut self) -> &mut Self {
        self.add(Projection::Id)
    }
    pub fn property(&mut self, property: &str) -> &mut Self {
        self.add(Projection::Property {
            property: property.to_string(),
        })
    }
    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }
    pub fn contains(&self, projection: &Projection) -> bool {
        self.projections.contains(projection)
    }
    pub fn is_empty(&self) -> bool {
        self.projections.is_empty()
    }
}

// ------------- Order -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything but a case-insensitive `desc` sorts ascending.
    pub fn from_param(order: Option<&str>) -> Self {
        match order {
            Some(o) if o.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    property: String,
    direction: SortDirection,
}

impl Order {
    pub fn asc(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: SortDirection::Asc,
        }
    }
    pub fn desc(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: SortDirection::Desc,
        }
    }
    pub fn property(&self) -> &str {
        &self.property
    }
    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

// ------------- Fetch -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchType {
    Eager,
    Lazy,
}

impl FetchType {
    /// `eager` and `join` fetch eagerly, everything else (including absent or
    /// unrecognized values) lazily. Matching is case-insensitive.
    pub fn from_value(value: Option<&Value>) -> Self {
        let name = value.map_or_else(|| "default".to_string(), |v| v.to_string());
        if name.eq_ignore_ascii_case("eager") || name.eq_ignore_ascii_case("join") {
            Self::Eager
        } else {
            Self::Lazy
        }
    }
}

// ------------- Query -------------
pub trait Query {
    fn add(&mut self, criterion: Criterion);
    fn projections(&mut self) -> &mut ProjectionList;
    fn order(&mut self, order: Order);
    fn max(&mut self, max: usize);
    fn offset(&mut self, offset: usize);
    /// Fetch the association eagerly.
    fn join(&mut self, association: &str);
    /// Fetch the association lazily.
    fn select(&mut self, association: &str);
    fn list(&mut self) -> Result<Vec<Value>>;
    fn single_result(&mut self) -> Result<Option<Value>>;
    /// Queries that want the raw options map return themselves here.
    fn arguments_aware(&mut self) -> Option<&mut dyn QueryArgumentsAware> {
        None
    }
}

pub trait QueryArgumentsAware {
    fn set_arguments(&mut self, arguments: &ArgumentMap);
}

pub trait Session {
    fn mapping_context(&self) -> &MappingContext;
    fn create_query(&self, entity: Arc<PersistentEntity>) -> Box<dyn Query + '_>;
}

// ------------- Detached Criteria -------------
/// A pre-built query description that can be copied onto any [`Query`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetachedCriteria {
    entity: String,
    criteria: Vec<Criterion>,
    projections: Vec<Projection>,
    orders: Vec<Order>,
    fetch_strategies: Vec<(String, FetchType)>,
}

impl DetachedCriteria {
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            ..Self::default()
        }
    }
    pub fn add(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }
    pub fn project(mut self, projection: Projection) -> Self {
        self.projections.push(projection);
        self
    }
    pub fn order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }
    pub fn fetch(mut self, association: &str, fetch_type: FetchType) -> Self {
        match self.fetch_strategies.iter_mut().find(|(a, _)| a == association) {
            Some(entry) => entry.1 = fetch_type,
            None => self.fetch_strategies.push((association.to_string(), fetch_type)),
        }
        self
    }
    pub fn join(self, association: &str) -> Self {
        self.fetch(association, FetchType::Eager)
    }
    pub fn select(self, association: &str) -> Self {
        self.fetch(association, FetchType::Lazy)
    }
    pub fn entity(&self) -> &str {
        &self.entity
    }
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }
    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
    pub fn fetch_strategies(&self) -> &[(String, FetchType)] {
        &self.fetch_strategies
    }
}

// ------------- Results -------------
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryResults {
    List(Vec<Value>),
    Single(Option<Value>),
    Count(u64),
}

impl fmt::Display for QueryResults {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::List(rows) => write!(f, "{} row(s)", rows.len()),
            Self::Single(Some(row)) => write!(f, "{}", row),
            Self::Single(None) => write!(f, "no result"),
            Self::Count(n) => write!(f, "count {}", n),
        }
    }
}
