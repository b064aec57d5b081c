//! The registry of comparison variants a clause can end with.
//!
//! Each variant name maps to a factory building a [`MethodExpression`] for an
//! (entity, property) pair. The registry also owns the pattern that recognizes
//! any known variant name at the end of a clause. Map and pattern live together
//! in one immutable snapshot; a registration builds a new snapshot and swaps it
//! in while holding the write lock, readers just clone the current `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::entity::NameHasher;
use crate::error::{FinderError, Result};
use crate::expression::{ExpressionKind, MethodExpression};

pub type ExpressionFactory = Arc<dyn Fn(&str, &str) -> MethodExpression + Send + Sync>;

const SAMPLE_ENTITY: &str = "SampleEntity";
const SAMPLE_PROPERTY: &str = "sampleProperty";

lazy_static! {
    static ref VARIANT_NAME: Regex = Regex::new(r"^\p{Upper}\w*$").expect("variant name pattern");
    static ref GLOBAL: Arc<ExpressionRegistry> = Arc::new(ExpressionRegistry::new());
}

/// The process-wide registry used by finders unless they are given their own.
pub fn global() -> Arc<ExpressionRegistry> {
    Arc::clone(&GLOBAL)
}

/// Registers an expression variant process-wide.
pub fn register_new_method_expression(kind: ExpressionKind) -> Result<()> {
    GLOBAL.register_kind(kind)
}

fn factory_for(kind: ExpressionKind) -> ExpressionFactory {
    Arc::new(move |entity: &str, property: &str| MethodExpression::new(kind.clone(), entity, property))
}

// ------------- Snapshot -------------
pub struct ExpressionSnapshot {
    factories: HashMap<String, ExpressionFactory, NameHasher>,
    pattern: Regex,
}

impl ExpressionSnapshot {
    fn compile(factories: HashMap<String, ExpressionFactory, NameHasher>) -> Result<Self> {
        let mut names: Vec<&String> = factories.keys().collect();
        // longer names first so that GreaterThanEquals wins over GreaterThan
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternatives: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
        let source = format!(r"\p{{Upper}}[\p{{Lower}}\d]+({})$", alternatives.join("|"));
        let pattern = Regex::new(&source).map_err(|e| FinderError::IllegalConfiguration(e.to_string()))?;
        debug!(variants = factories.len(), pattern = %pattern, "compiled method expression pattern");
        Ok(Self { factories, pattern })
    }
    fn built_in() -> Result<Self> {
        let mut factories = HashMap::default();
        for kind in ExpressionKind::BUILT_IN {
            factories.insert(kind.name().to_string(), factory_for(kind));
        }
        Self::compile(factories)
    }
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
    pub fn factory(&self, name: &str) -> Option<ExpressionFactory> {
        self.factories.get(name).map(Arc::clone)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
    pub fn len(&self) -> usize {
        self.factories.len()
    }
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ExpressionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ExpressionSnapshot")
            .field("names", &self.names())
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

// ------------- Registry -------------
#[derive(Debug)]
pub struct ExpressionRegistry {
    current: RwLock<Arc<ExpressionSnapshot>>,
}

impl ExpressionRegistry {
    /// A registry seeded with the built-in variants.
    pub fn new() -> Self {
        // the built-in names are plain identifiers, so this pattern always compiles
        let snapshot = ExpressionSnapshot::built_in().expect("built-in method expression pattern");
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn snapshot(&self) -> Result<Arc<ExpressionSnapshot>> {
        let current = self.current.read().map_err(|e| FinderError::Lock(e.to_string()))?;
        Ok(Arc::clone(&current))
    }

    pub fn resolve(&self, name: &str) -> Result<Option<ExpressionFactory>> {
        Ok(self.snapshot()?.factory(name))
    }

    /// Adds or replaces the factory for a variant name and recompiles the pattern.
    ///
    /// The name has to be an upper-case-led identifier, and the factory has to
    /// build an expression for exactly the entity and property it is given.
    pub fn register(&self, name: &str, factory: ExpressionFactory) -> Result<()> {
        if !VARIANT_NAME.is_match(name) {
            return Err(FinderError::IllegalConfiguration(format!(
                "Method expression [{}] is not a capitalized identifier",
                name
            )));
        }
        let sample = factory(SAMPLE_ENTITY, SAMPLE_PROPERTY);
        if sample.entity() != SAMPLE_ENTITY || sample.property() != SAMPLE_PROPERTY {
            return Err(FinderError::IllegalConfiguration(format!(
                "Method expression [{}] does not build an expression for the entity and property it is given",
                name
            )));
        }
        if sample.arguments_required() > 2 {
            return Err(FinderError::IllegalConfiguration(format!(
                "Method expression [{}] requires {} arguments, at most 2 are supported",
                name,
                sample.arguments_required()
            )));
        }
        let mut current = self.current.write().map_err(|e| FinderError::Lock(e.to_string()))?;
        let mut factories = current.factories.clone();
        factories.insert(name.to_string(), factory);
        *current = Arc::new(ExpressionSnapshot::compile(factories)?);
        debug!(name, "registered method expression");
        Ok(())
    }

    pub fn register_kind(&self, kind: ExpressionKind) -> Result<()> {
        let name = kind.name().to_string();
        self.register(&name, factory_for(kind))
    }
}

impl Default for ExpressionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
