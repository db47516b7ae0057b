#![forbid(unsafe_code)]

//! Orchestration engine for provisioning Stratus platforms.
//!
//! Expands a declarative platform description (`stratus-core`) into an
//! ordered step plan and executes Plan/Apply/Destroy lifecycles against the
//! external infrastructure-as-code tool.

pub mod compile;
pub mod executor;
pub mod runner;
pub mod task;

pub use crate::compile::{CompileError, Compiler, RunId, Step};
pub use crate::executor::{Engine, ExecutionError, ExecutionReport};
