// src/cli/handlers/mod.rs

//! One module per CLI command. Each exposes a `handle` function taking the
//! command's own arguments.

pub(crate) mod commons;
/// `describe`: detailed views of projects and tasks.
pub mod describe;
/// `edit`: opens the configuration in the user's editor.
pub mod edit;
/// `exec`: runs an ad-hoc command across projects.
pub mod exec;
/// `list`: names of projects, tasks, tags and paths.
pub mod list;
/// `run`: runs declared tasks across projects.
pub mod run;
