//! Applies the trailing options map of a finder call, and pre-built detached
//! criteria, to a query.

use tracing::trace;

use crate::entity::PersistentEntity;
use crate::error::Result;
use crate::query::{DetachedCriteria, FetchType, Order, Query, SortDirection};
use crate::value::{convert, ArgumentMap, Value, ValueType};

pub const ARGUMENT_MAX: &str = "max";
pub const ARGUMENT_OFFSET: &str = "offset";
pub const ARGUMENT_ORDER: &str = "order";
pub const ARGUMENT_SORT: &str = "sort";
pub const ARGUMENT_FETCH: &str = "fetch";
pub const ARGUMENT_IGNORE_CASE: &str = "ignoreCase";
pub const ARGUMENT_CACHE: &str = "cache";
pub const ARGUMENT_LOCK: &str = "lock";

// ------------- Query Options -------------
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub max: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Option<String>,
    pub order: SortDirection,
    pub fetch: Vec<(String, FetchType)>,
    pub ignore_case: Option<bool>,
    pub cache: Option<bool>,
    pub lock: Option<bool>,
}

impl QueryOptions {
    /// Reads the recognized keys of an options map. `max` and `offset` are
    /// converted to integers; negative values count as unset.
    pub fn parse(options: &ArgumentMap) -> Result<Self> {
        let max = pagination(options, ARGUMENT_MAX)?;
        let offset = pagination(options, ARGUMENT_OFFSET)?;
        let order = SortDirection::from_param(options.get(ARGUMENT_ORDER).and_then(Value::as_str));
        let sort = options.get(ARGUMENT_SORT).and_then(Value::as_str).map(str::to_string);
        let fetch = match options.get(ARGUMENT_FETCH) {
            Some(Value::Map(fetch)) => fetch
                .iter()
                .map(|(association, mode)| (association.clone(), FetchType::from_value(Some(mode))))
                .collect(),
            _ => Vec::new(),
        };
        Ok(Self {
            max,
            offset,
            sort,
            order,
            fetch,
            ignore_case: options.get(ARGUMENT_IGNORE_CASE).and_then(Value::as_flag),
            cache: options.get(ARGUMENT_CACHE).and_then(Value::as_flag),
            lock: options.get(ARGUMENT_LOCK).and_then(Value::as_flag),
        })
    }

    /// Fetch strategies first, then pagination, then ordering.
    pub fn apply(&self, query: &mut dyn Query) {
        for (association, fetch_type) in &self.fetch {
            apply_fetch(query, association, *fetch_type);
        }
        if let Some(max) = self.max {
            query.max(max);
        }
        if let Some(offset) = self.offset {
            query.offset(offset);
        }
        if let Some(sort) = &self.sort {
            match self.order {
                SortDirection::Desc => query.order(Order::desc(sort)),
                SortDirection::Asc => query.order(Order::asc(sort)),
            }
        }
    }
}

fn pagination(options: &ArgumentMap, key: &str) -> Result<Option<usize>> {
    let value = match options.get(key) {
        Some(value) => convert(value, &ValueType::Long)?,
        None => return Ok(None),
    };
    Ok(match value {
        Value::Long(n) if n > -1 => usize::try_from(n).ok(),
        _ => None,
    })
}

fn apply_fetch(query: &mut dyn Query, association: &str, fetch_type: FetchType) {
    match fetch_type {
        FetchType::Eager => query.join(association),
        FetchType::Lazy => query.select(association),
    }
}

/// Applies an options map to a query. Queries that are arguments-aware also
/// receive the raw map, unchanged.
pub fn populate_arguments_for_criteria(
    entity: &PersistentEntity,
    query: &mut dyn Query,
    options: Option<&ArgumentMap>,
) -> Result<()> {
    let options = match options {
        Some(options) => options,
        None => return Ok(()),
    };
    let parsed = QueryOptions::parse(options)?;
    trace!(entity = entity.name(), ?parsed, "applying query options");
    parsed.apply(query);
    if let Some(aware) = query.arguments_aware() {
        aware.set_arguments(options);
    }
    Ok(())
}

/// Uses the first remaining call argument as the options map, if it is one.
pub fn configure_query_with_arguments(
    entity: &PersistentEntity,
    query: &mut dyn Query,
    arguments: &[Value],
) -> Result<()> {
    match arguments.first() {
        Some(Value::Map(options)) => populate_arguments_for_criteria(entity, query, Some(options)),
        _ => Ok(()),
    }
}

/// Copies criteria, projections, orders and fetch strategies, in that order.
pub fn apply_detached_criteria(query: &mut dyn Query, detached: Option<&DetachedCriteria>) {
    let detached = match detached {
        Some(detached) => detached,
        None => return,
    };
    for criterion in detached.criteria() {
        query.add(criterion.clone());
    }
    for projection in detached.projections() {
        query.projections().add(projection.clone());
    }
    for order in detached.orders() {
        query.order(order.clone());
    }
    for (association, fetch_type) in detached.fetch_strategies() {
        apply_fetch(query, association, *fetch_type);
    }
}
