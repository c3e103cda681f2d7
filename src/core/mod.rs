// src/core/mod.rs

pub(crate) mod config_loader;
pub(crate) mod env;
pub(crate) mod errors;
pub(crate) mod filter;
pub(crate) mod plan;
pub(crate) mod shell;
pub(crate) mod store;
pub(crate) mod tag_expr;
pub(crate) mod target_resolver;
pub(crate) mod task_resolver;
