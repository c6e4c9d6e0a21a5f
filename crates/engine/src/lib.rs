//! `engine` crate — the workflow graph model, factory resolution, and the
//! execution engine.

pub mod error;
pub mod executor;
pub mod factory;
pub mod graph;

pub use error::EngineError;
pub use executor::{Engine, EngineRun, RunInspector, ENGINE_FAULT_CODE};
pub use factory::{GraphRegistry, WorkflowFactory};
pub use graph::{WorkflowGraph, WorkflowNode};

#[cfg(test)]
mod executor_tests;
