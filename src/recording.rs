//! An in-memory [`Query`] that records everything applied to it.
//!
//! The recorded state is what the `dynafinder` binary prints when explaining a
//! finder, and what the integration tests assert against. Results come from a
//! fixed set of rows handed to the session; pagination is honored, criteria
//! are not evaluated.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::entity::{MappingContext, PersistentEntity};
use crate::error::{FinderError, Result};
use crate::query::{Criterion, Order, Projection, ProjectionList, Query, QueryArgumentsAware, Session};
use crate::value::{ArgumentMap, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuerySnapshot {
    pub entity: String,
    pub criteria: Vec<Criterion>,
    pub projections: ProjectionList,
    pub orders: Vec<Order>,
    pub max: Option<usize>,
    pub offset: Option<usize>,
    pub joins: Vec<String>,
    pub selects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<ArgumentMap>,
}

type ExecutionLog = Arc<Mutex<Vec<QuerySnapshot>>>;

pub struct RecordingQuery {
    state: QuerySnapshot,
    rows: Vec<Value>,
    log: Option<ExecutionLog>,
}

impl RecordingQuery {
    pub fn new(entity: &str) -> Self {
        Self {
            state: QuerySnapshot {
                entity: entity.to_string(),
                ..QuerySnapshot::default()
            },
            rows: Vec::new(),
            log: None,
        }
    }
    pub fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.rows = rows;
        self
    }
    pub fn snapshot(&self) -> &QuerySnapshot {
        &self.state
    }
    fn record_execution(&self) -> Result<()> {
        if let Some(log) = &self.log {
            log.lock()
                .map_err(|e| FinderError::Lock(e.to_string()))?
                .push(self.state.clone());
        }
        Ok(())
    }
    fn page(&self) -> Vec<Value> {
        let offset = self.state.offset.unwrap_or(0);
        let max = self.state.max.unwrap_or(usize::MAX);
        self.rows.iter().skip(offset).take(max).cloned().collect()
    }
}

impl Query for RecordingQuery {
    fn add(&mut self, criterion: Criterion) {
        self.state.criteria.push(criterion);
    }
    fn projections(&mut self) -> &mut ProjectionList {
        &mut self.state.projections
    }
    fn order(&mut self, order: Order) {
        self.state.orders.push(order);
    }
    fn max(&mut self, max: usize) {
        self.state.max = Some(max);
    }
    fn offset(&mut self, offset: usize) {
        self.state.offset = Some(offset);
    }
    fn join(&mut self, association: &str) {
        self.state.joins.push(association.to_string());
    }
    fn select(&mut self, association: &str) {
        self.state.selects.push(association.to_string());
    }
    fn list(&mut self) -> Result<Vec<Value>> {
        self.record_execution()?;
        Ok(self.page())
    }
    fn single_result(&mut self) -> Result<Option<Value>> {
        self.record_execution()?;
        if self.state.projections.contains(&Projection::Count) {
            return Ok(Some(Value::Long(self.rows.len() as i64)));
        }
        Ok(self.page().into_iter().next())
    }
    fn arguments_aware(&mut self) -> Option<&mut dyn QueryArgumentsAware> {
        Some(self)
    }
}

impl QueryArgumentsAware for RecordingQuery {
    fn set_arguments(&mut self, arguments: &ArgumentMap) {
        self.state.arguments = Some(arguments.clone());
    }
}

// ------------- Session -------------
pub struct RecordingSession {
    context: MappingContext,
    rows: Vec<Value>,
    log: ExecutionLog,
}

impl RecordingSession {
    pub fn new(context: MappingContext) -> Self {
        Self {
            context,
            rows: Vec::new(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }
    /// Rows every query created by this session hands back.
    pub fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.rows = rows;
        self
    }
    /// Snapshots of every query executed so far, oldest first.
    pub fn executed(&self) -> Result<Vec<QuerySnapshot>> {
        Ok(self
            .log
            .lock()
            .map_err(|e| FinderError::Lock(e.to_string()))?
            .clone())
    }
    pub fn last_executed(&self) -> Result<Option<QuerySnapshot>> {
        Ok(self.executed()?.pop())
    }
}

impl Session for RecordingSession {
    fn mapping_context(&self) -> &MappingContext {
        &self.context
    }
    fn create_query(&self, entity: Arc<PersistentEntity>) -> Box<dyn Query + '_> {
        let mut query = RecordingQuery::new(entity.name()).with_rows(self.rows.clone());
        query.log = Some(Arc::clone(&self.log));
        Box::new(query)
    }
}
