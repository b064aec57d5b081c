//! Dynamic finders: turn a method name and its call arguments into a
//! [`FinderInvocation`], then into a query, then into results.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::binder::{Binder, Tolerance};
use crate::entity::{MappingContext, PersistentEntity};
use crate::error::{FinderError, Result};
use crate::expression::MethodExpression;
use crate::family::{FinderFamily, COUNT_BY, FIND_ALL_BOOLEAN, FIND_ALL_BY, FIND_BOOLEAN, FIND_BY};
use crate::options::{apply_detached_criteria, configure_query_with_arguments};
use crate::query::{Criterion, DetachedCriteria, Query, QueryResults, Session};
use crate::registry::{self, ExpressionRegistry};
use crate::resolver::find_method_expression;
use crate::settings::FinderSettings;
use crate::tokenizer::{self, Operator};
use crate::value::Value;

pub const OPERATOR_AND: &str = "And";
pub const OPERATOR_OR: &str = "Or";

// ------------- Additional Criteria -------------
/// Extra criteria supplied by the caller, applied before anything parsed from
/// the method name.
#[derive(Clone)]
pub struct AdditionalCriteria(Arc<dyn Fn(&mut dyn Query) + Send + Sync>);

impl AdditionalCriteria {
    pub fn new(apply: impl Fn(&mut dyn Query) + Send + Sync + 'static) -> Self {
        Self(Arc::new(apply))
    }
    pub fn apply(&self, query: &mut dyn Query) {
        (self.0)(query)
    }
}

impl fmt::Debug for AdditionalCriteria {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AdditionalCriteria")
    }
}

// ------------- Invocation -------------
/// Everything parsed from one finder call. Built once, executed once.
#[derive(Debug, Clone, Serialize)]
pub struct FinderInvocation {
    entity: String,
    method: String,
    expressions: Vec<MethodExpression>,
    operator: Option<String>,
    arguments: Vec<Value>,
    /// The first expression is a bare boolean property that every result must satisfy.
    required_boolean: bool,
    #[serde(skip)]
    criteria: Option<AdditionalCriteria>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detached_criteria: Option<DetachedCriteria>,
}

impl FinderInvocation {
    pub fn entity(&self) -> &str {
        &self.entity
    }
    pub fn method(&self) -> &str {
        &self.method
    }
    pub fn expressions(&self) -> &[MethodExpression] {
        &self.expressions
    }
    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }
    /// Call arguments left over once every expression took its share.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }
    pub fn required_boolean(&self) -> bool {
        self.required_boolean
    }
    pub fn criteria(&self) -> Option<&AdditionalCriteria> {
        self.criteria.as_ref()
    }
    pub fn detached_criteria(&self) -> Option<&DetachedCriteria> {
        self.detached_criteria.as_ref()
    }
    pub fn set_detached_criteria(&mut self, detached: DetachedCriteria) {
        self.detached_criteria = Some(detached);
    }
    pub fn is_disjunction(&self) -> bool {
        self.operator.as_deref() == Some(OPERATOR_OR)
    }
}

// ------------- Execution -------------
/// The family-specific last step: run a fully built query.
pub trait InvocationExecutor: Send + Sync {
    fn execute(&self, query: &mut dyn Query, invocation: &FinderInvocation) -> Result<QueryResults>;
}

/// Every matching row.
pub struct ListExecutor;

impl InvocationExecutor for ListExecutor {
    fn execute(&self, query: &mut dyn Query, _invocation: &FinderInvocation) -> Result<QueryResults> {
        Ok(QueryResults::List(query.list()?))
    }
}

/// The first matching row, if any.
pub struct FirstResultExecutor;

impl InvocationExecutor for FirstResultExecutor {
    fn execute(&self, query: &mut dyn Query, _invocation: &FinderInvocation) -> Result<QueryResults> {
        query.max(1);
        Ok(QueryResults::Single(query.single_result()?))
    }
}

/// The number of matching rows.
pub struct CountExecutor;

impl InvocationExecutor for CountExecutor {
    fn execute(&self, query: &mut dyn Query, invocation: &FinderInvocation) -> Result<QueryResults> {
        query.projections().count();
        match query.single_result()? {
            Some(Value::Long(n)) if n >= 0 => Ok(QueryResults::Count(n as u64)),
            None | Some(Value::Null) => Ok(QueryResults::Count(0)),
            Some(other) => Err(FinderError::IllegalConfiguration(format!(
                "Count query for {}.{}() returned a non-numeric value {}",
                invocation.entity(),
                invocation.method(),
                other
            ))),
        }
    }
}

// ------------- Dynamic Finder -------------
pub struct DynamicFinder {
    family: FinderFamily,
    operators: Vec<Operator>,
    executor: Box<dyn InvocationExecutor>,
    registry: Arc<ExpressionRegistry>,
}

impl DynamicFinder {
    pub fn new(family: FinderFamily, operators: &[&str], executor: Box<dyn InvocationExecutor>) -> Result<Self> {
        let operators = operators.iter().map(|o| Operator::new(o)).collect::<Result<Vec<_>>>()?;
        Ok(Self {
            family,
            operators,
            executor,
            registry: registry::global(),
        })
    }

    /// One of the built-in families with its matching execution step.
    pub fn built_in(name: &str, operators: &[&str]) -> Result<Self> {
        let executor: Box<dyn InvocationExecutor> = match name {
            FIND_ALL_BY | FIND_ALL_BOOLEAN => Box::new(ListExecutor),
            FIND_BY | FIND_BOOLEAN => Box::new(FirstResultExecutor),
            COUNT_BY => Box::new(CountExecutor),
            other => {
                return Err(FinderError::IllegalConfiguration(format!(
                    "Unknown finder family: {}",
                    other
                )));
            }
        };
        Self::new(FinderFamily::built_in(name)?, operators, executor)
    }

    /// Resolves clauses against the given registry instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<ExpressionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn family(&self) -> &FinderFamily {
        &self.family
    }

    pub fn is_method_match(&self, method: &str) -> bool {
        self.family.is_method_match(method)
    }

    pub fn invoke(
        &self,
        session: &dyn Session,
        entity: &str,
        method: &str,
        criteria: Option<AdditionalCriteria>,
        arguments: Vec<Value>,
    ) -> Result<QueryResults> {
        let invocation = self.create_finder_invocation(session.mapping_context(), entity, method, criteria, arguments)?;
        self.do_invoke(session, &invocation)
    }

    /// Like [`invoke`](Self::invoke), with pre-built criteria applied alongside
    /// the clauses parsed from the method name.
    pub fn invoke_with_detached_criteria(
        &self,
        session: &dyn Session,
        entity: &str,
        method: &str,
        detached: Option<DetachedCriteria>,
        arguments: Vec<Value>,
    ) -> Result<QueryResults> {
        let mut invocation = self.create_finder_invocation(session.mapping_context(), entity, method, None, arguments)?;
        if let Some(detached) = detached {
            invocation.set_detached_criteria(detached);
        }
        self.do_invoke(session, &invocation)
    }

    pub fn create_finder_invocation(
        &self,
        context: &MappingContext,
        entity: &str,
        method: &str,
        criteria: Option<AdditionalCriteria>,
        arguments: Vec<Value>,
    ) -> Result<FinderInvocation> {
        let persistent_entity = context
            .entity(entity)
            .ok_or_else(|| FinderError::UnknownEntity(entity.to_string()))?;
        let snapshot = self.registry.snapshot()?;
        let tokens = tokenizer::tokenize(self.family.pattern(), method)?;

        let mut expressions = Vec::new();
        let required_boolean = tokens.boolean.is_some();
        if let Some(clause) = &tokens.boolean {
            let mut expression = find_method_expression(&snapshot, entity, clause.property)?;
            expression.set_arguments(vec![Value::Bool(clause.value)]);
            expressions.push(expression);
        }

        let mut binder = Binder::new(&persistent_entity, method, arguments);
        let mut operator = None;
        if let Some(sequence) = tokens.sequence {
            match tokenizer::split_on_operator(&self.operators, sequence) {
                Some((found, clauses)) => {
                    operator = Some(found.name().to_string());
                    for clause in clauses {
                        let expression = find_method_expression(&snapshot, entity, clause)?;
                        expressions.push(binder.bind(expression, Tolerance::Strict)?);
                    }
                }
                None => {
                    let expression = find_method_expression(&snapshot, entity, sequence)?;
                    expressions.push(binder.bind(expression, Tolerance::BasicProperties)?);
                }
            }
        }

        let invocation = FinderInvocation {
            entity: entity.to_string(),
            method: method.to_string(),
            expressions,
            operator,
            arguments: binder.into_remaining(),
            required_boolean,
            criteria,
            detached_criteria: None,
        };
        debug!(
            finder = self.family.name(),
            method,
            expressions = invocation.expressions.len(),
            operator = invocation.operator.as_deref().unwrap_or("none"),
            remaining = invocation.arguments.len(),
            "created finder invocation"
        );
        Ok(invocation)
    }

    /// Builds the query for an invocation: additional criteria, detached
    /// criteria, the options map, then one criterion per expression. With `Or`
    /// the expressions form a single disjunction; a required boolean clause
    /// stays outside of it.
    pub fn build_query<'s>(
        &self,
        session: &'s dyn Session,
        invocation: &FinderInvocation,
    ) -> Result<Box<dyn Query + 's>> {
        let entity = session
            .mapping_context()
            .entity(invocation.entity())
            .ok_or_else(|| FinderError::UnknownEntity(invocation.entity().to_string()))?;
        let mut query = session.create_query(Arc::clone(&entity));
        apply_invocation(query.as_mut(), &entity, invocation)?;
        Ok(query)
    }

    fn do_invoke(&self, session: &dyn Session, invocation: &FinderInvocation) -> Result<QueryResults> {
        let mut query = self.build_query(session, invocation)?;
        self.executor.execute(query.as_mut(), invocation)
    }
}

/// Applies everything an invocation carries to an existing query.
pub fn apply_invocation(query: &mut dyn Query, entity: &PersistentEntity, invocation: &FinderInvocation) -> Result<()> {
    if let Some(criteria) = invocation.criteria() {
        criteria.apply(query);
    }
    apply_detached_criteria(query, invocation.detached_criteria());
    configure_query_with_arguments(entity, query, invocation.arguments())?;

    let mut expressions = invocation.expressions().iter();
    if invocation.is_disjunction() {
        if invocation.required_boolean() {
            if let Some(boolean) = expressions.next() {
                query.add(boolean.create_criterion());
            }
        }
        let criteria = expressions.map(MethodExpression::create_criterion).collect();
        query.add(Criterion::Disjunction { criteria });
    } else {
        for expression in expressions {
            query.add(expression.create_criterion());
        }
    }
    Ok(())
}

// ------------- Dispatch -------------
/// An ordered set of finders; a method name goes to the first that matches.
pub struct Finders {
    finders: Vec<DynamicFinder>,
}

impl Finders {
    /// All built-in families with `And` and `Or`.
    pub fn new() -> Result<Self> {
        Self::from_settings(&FinderSettings::default())
    }

    pub fn from_settings(settings: &FinderSettings) -> Result<Self> {
        let operators: Vec<&str> = settings.operators.iter().map(String::as_str).collect();
        let finders = settings
            .families
            .iter()
            .map(|family| DynamicFinder::built_in(family, &operators))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { finders })
    }

    pub fn with_finders(finders: Vec<DynamicFinder>) -> Self {
        Self { finders }
    }

    pub fn finder_for(&self, method: &str) -> Option<&DynamicFinder> {
        self.finders.iter().find(|f| f.is_method_match(method))
    }

    pub fn invoke(
        &self,
        session: &dyn Session,
        entity: &str,
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<QueryResults> {
        match self.finder_for(method) {
            Some(finder) => finder.invoke(session, entity, method, None, arguments),
            None => Err(FinderError::NoMatchingMethod {
                method: method.to_string(),
                entity: entity.to_string(),
                arguments: crate::value::render_arguments(&arguments),
            }),
        }
    }
}
