// src/core/errors.rs

use crate::models::ResourceKind;
use colored::Colorize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning declared configuration into runnable tasks.
#[derive(Error, Debug)]
pub(crate) enum ResolveError {
    /// One or more referenced names do not exist. Always carries every missing name.
    #[error("{kind} not found: {}", .names.join(", "))]
    NotFound {
        kind: ResourceKind,
        names: Vec<String>,
    },
    #[error("Invalid inline {kind}: {source}")]
    Decode {
        kind: ResourceKind,
        #[source]
        source: toml::de::Error,
    },
    /// Filtering succeeded but selected no project.
    #[error("No matching projects found.")]
    NoTargets,
    #[error("Failed to evaluate env variable '{key}': {reason}")]
    EnvEval { key: String, reason: String },
    #[error("Invalid env entry '{0}', expected KEY=VALUE.")]
    InvalidEnv(String),
    #[error("Invalid tag expression '{expr}': {reason}")]
    TagExpr { expr: String, reason: String },
    /// Aggregated configuration report, one problem per line.
    #[error("{0}")]
    Config(String),
}

impl ResolveError {
    pub(crate) fn not_found(kind: ResourceKind, name: &str) -> Self {
        Self::NotFound {
            kind,
            names: vec![name.to_string()],
        }
    }
}

/// All errors found for a single resource during a batch pass.
#[derive(Debug)]
pub(crate) struct ResourceErrors {
    pub(crate) kind: ResourceKind,
    pub(crate) name: String,
    /// File that declared the resource.
    pub(crate) context: PathBuf,
    pub(crate) line: Option<usize>,
    pub(crate) errors: Vec<ResolveError>,
}

impl ResourceErrors {
    pub(crate) fn new(kind: ResourceKind, name: &str, context: PathBuf, line: Option<usize>) -> Self {
        Self {
            kind,
            name: name.to_string(),
            context,
            line,
            errors: Vec::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Renders every batch into one multi-line report.
pub(crate) fn format_errors(batches: &[ResourceErrors]) -> String {
    let mut report = String::new();
    for batch in batches.iter().filter(|b| !b.is_empty()) {
        let location = match batch.line {
            Some(line) => format!("{}:{}", batch.context.display(), line),
            None => batch.context.display().to_string(),
        };
        report.push_str(&format!(
            "{} {} '{}' ({}):\n",
            "error in".red(),
            batch.kind,
            batch.name.bold(),
            location.dimmed()
        ));
        for error in &batch.errors {
            report.push_str(&format!("  - {}\n", error));
        }
    }
    report
}

/// Collapses the batches into a single error, or `Ok` when every batch is clean.
pub(crate) fn check_errors(batches: &[ResourceErrors]) -> Result<(), ResolveError> {
    if batches.iter().all(ResourceErrors::is_empty) {
        return Ok(());
    }
    Err(ResolveError::Config(format_errors(batches)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_every_name() {
        let err = ResolveError::NotFound {
            kind: ResourceKind::Project,
            names: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "project not found: a, b");
    }

    #[test]
    fn test_format_errors_skips_clean_batches() {
        colored::control::set_override(false);

        let clean = ResourceErrors::new(ResourceKind::Task, "ok", PathBuf::from("a.toml"), None);
        let mut broken =
            ResourceErrors::new(ResourceKind::Task, "deploy", PathBuf::from("a.toml"), Some(7));
        broken
            .errors
            .push(ResolveError::not_found(ResourceKind::Spec, "fast"));
        broken
            .errors
            .push(ResolveError::not_found(ResourceKind::Theme, "dark"));

        let batches = vec![clean, broken];
        let report = format_errors(&batches);

        assert!(!report.contains("'ok'"));
        assert!(report.contains("task 'deploy' (a.toml:7)"));
        assert!(report.contains("spec not found: fast"));
        assert!(report.contains("theme not found: dark"));
        assert!(check_errors(&batches).is_err());
        assert!(check_errors(&batches[..1]).is_ok());
    }
}
