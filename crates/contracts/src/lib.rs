//! `contracts` crate — the `RuleEvaluator`/`Action` traits and the per-run
//! types they operate on.
//!
//! Every pluggable unit — rule evaluators and actions alike — implements one
//! of the two traits here. The engine crate dispatches execution through
//! these trait objects. The run-scoped types (scope, trace, validation
//! collector, result sink) also live here so both the engine and the
//! implementations can import them without a circular dependency.

pub mod mock;
pub mod result;
pub mod scope;
pub mod trace;
pub mod traits;
pub mod validation;

pub use result::{RuleResult, RuleResultSink};
pub use scope::EngineScope;
pub use trace::{ExecutionTrace, TraceKind, TraceRecord};
pub use traits::{Action, Definition, RuleEvaluator};
pub use validation::{Validation, ValidationCollector, ValidationSeverity};
