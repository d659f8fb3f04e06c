//! projtask - project-local command runner.
//!
//! Commands are discovered from `src/commands/` at build time and dispatched
//! by name; see [`registry`] for how a command is added.

#[macro_use]
extern crate log;

pub mod command;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod exec;
pub mod prompt;
pub mod registry;
pub mod suites;
pub mod workflow;

pub use command::{Command, CommandInfo, Context, Status};
pub use config::{Config, Project};
pub use error::{CommandError, TaskError, TaskResult};
pub use registry::{registry, Registry};
