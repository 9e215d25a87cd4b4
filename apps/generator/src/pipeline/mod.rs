//! External tool execution and the end-to-end generation run.

pub mod mock;
pub mod orchestrator;
pub mod process;
pub mod tools;
