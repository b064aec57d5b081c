//! Dynafinder – translates dynamic finder method names into structured queries.
//!
//! A finder method name such as `findAllByLastNameAndAgeGreaterThan` encodes a
//! query: a family prefix (`findAllBy`), then clauses joined by a boolean
//! operator (`And`), each clause being a property name followed by a
//! comparison variant (`GreaterThan`). Calling it with `["Smith", 30]` means
//! "every entity whose last name equals Smith and whose age exceeds 30".
//!
//! The pipeline:
//! * [`family`] – the prefix patterns (`findBy`, `findAllBy`, `countBy`, ...).
//! * [`tokenizer`] – splits a method name into an optional boolean clause and a
//!   query sequence, and the sequence into clauses around an operator.
//! * [`registry`] – the comparison variants a clause can end with, extensible at
//!   runtime, plus the pattern that recognizes them.
//! * [`resolver`] – turns a single clause into a [`expression::MethodExpression`].
//! * [`binder`] – hands the positional arguments to the expressions, converting
//!   them to the declared property types.
//! * [`options`] – the trailing options map (`max`, `offset`, `sort`, `order`,
//!   `fetch`, ...) and detached criteria.
//! * [`finder`] – ties it together: [`finder::DynamicFinder`] builds a
//!   [`finder::FinderInvocation`], applies it to a [`query::Query`] and runs the
//!   family's execution step; [`finder::Finders`] dispatches by method name.
//!
//! The [`cli`] module holds the command line of the `dynafinder` explain binary.
//!
//! Storage engines plug in through [`query::Session`] and [`query::Query`]. The
//! [`recording`] module provides an in-memory implementation that records the
//! applied query instead of evaluating it.
//!
//! ## Quick Start
//! ```
//! use dynafinder::entity::{MappingContext, PersistentEntity};
//! use dynafinder::finder::Finders;
//! use dynafinder::recording::RecordingSession;
//! use dynafinder::value::{Value, ValueType};
//!
//! let mut context = MappingContext::new();
//! context.keep(
//!     PersistentEntity::new("Person")
//!         .property("lastName", ValueType::String)
//!         .property("age", ValueType::Long),
//! );
//! let session = RecordingSession::new(context);
//! let finders = Finders::new().unwrap();
//! finders
//!     .invoke(&session, "Person", "findAllByLastNameAndAgeGreaterThan", vec![Value::from("Smith"), Value::from(30)])
//!     .unwrap();
//! let executed = session.last_executed().unwrap().unwrap();
//! assert_eq!(executed.criteria.len(), 2);
//! ```

pub mod binder;
pub mod cli;
pub mod entity;
pub mod error;
pub mod expression;
pub mod family;
pub mod finder;
pub mod options;
pub mod query;
pub mod recording;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod tokenizer;
pub mod value;

pub use error::{FinderError, Result};
pub use finder::{DynamicFinder, FinderInvocation, Finders};
pub use value::Value;
