//! reposet runs declarative shell tasks across many repositories.
//!
//! Projects, tasks and their execution options are declared in `reposet.toml`.
//! The binary in `src/bin/reposet.rs` dispatches to the handlers in [`cli`].

pub mod cli;
pub(crate) mod constants;
pub(crate) mod core;
pub(crate) mod models;
pub(crate) mod system;
