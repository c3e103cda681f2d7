//! # System Interaction Layer
//!
//! Abstractions over the operating system. This is the boundary between the
//! resolution engine and process management.
//!
//! ## Modules
//!
//! - **`executor`**: spawns the resolved commands of a `TaskRun` inside its project
//!   directory, either streaming to the terminal or capturing output. It also runs
//!   the short-lived shell calls that evaluate `$(...)` environment values.

pub(crate) mod executor;
