//! # Environment Merger
//!
//! Builds the environment of a task or command from four tiers, lowest precedence
//! first: the config-level `env`, the parent task's env (for commands), the env
//! declared on the task or command itself, and `--env` entries from the command
//! line.
//!
//! A later tier overwrites the value of a key, but a key keeps the position where it
//! first appeared, so the resulting list is stable across runs.

use crate::{
    constants::ENV_EVAL_SHELL,
    core::errors::ResolveError,
    models::Task,
    system::executor,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    // A value that is entirely a `$(...)` expression is evaluated by a shell.
    static ref DYNAMIC_VALUE_RE: Regex = Regex::new(r"(?s)^\$\((.*)\)$").unwrap();
}

/// Converts a TOML env table into `KEY=VALUE` entries, keeping declaration order.
pub(crate) fn env_entries(table: &toml::Table) -> Result<Vec<String>, ResolveError> {
    table
        .iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => return Err(ResolveError::InvalidEnv(format!("{}={}", key, other))),
            };
            Ok(format!("{}={}", key, value))
        })
        .collect()
}

fn split_entry(entry: &str) -> Result<(&str, &str), ResolveError> {
    match entry.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(ResolveError::InvalidEnv(entry.to_string())),
    }
}

fn evaluate_value(key: &str, value: &str) -> Result<String, ResolveError> {
    let Some(expression) = DYNAMIC_VALUE_RE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return Ok(value.to_string());
    };

    log::debug!("Evaluating env '{}' with: {}", key, expression);
    let args = vec!["-c".to_string(), expression.to_string()];
    let output = executor::execute_and_capture_output(ENV_EVAL_SHELL, &args, &[]).map_err(
        |e| ResolveError::EnvEval {
            key: key.to_string(),
            reason: e.to_string(),
        },
    )?;

    Ok(output.trim_end_matches(['\n', '\r']).to_string())
}

/// Parses and evaluates one tier of `KEY=VALUE` entries.
pub(crate) fn evaluate_env(entries: &[String]) -> Result<Vec<(String, String)>, ResolveError> {
    entries
        .iter()
        .map(|entry| {
            let (key, value) = split_entry(entry)?;
            Ok((key.to_string(), evaluate_value(key, value)?))
        })
        .collect()
}

/// Merges evaluated tiers given in increasing precedence.
pub(crate) fn merge_envs(tiers: &[Vec<(String, String)>]) -> Vec<String> {
    let mut merged: Vec<(String, String)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (key, value) in tiers.iter().flatten() {
        match positions.get(key).and_then(|&i| merged.get_mut(i)) {
            Some(slot) => slot.1 = value.clone(),
            None => {
                positions.insert(key.clone(), merged.len());
                merged.push((key.clone(), value.clone()));
            }
        }
    }

    merged
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect()
}

/// Computes the final environment of a task or command.
///
/// Precedence, lowest to highest: `config_env`, `parent_env`, `declared`, `user_env`.
/// Any evaluation failure aborts the merge; no partial environment is returned.
pub(crate) fn parse_task_env(
    declared: &[String],
    user_env: &[String],
    parent_env: &[String],
    config_env: &[String],
) -> Result<Vec<String>, ResolveError> {
    let tiers = [
        evaluate_env(config_env)?,
        evaluate_env(parent_env)?,
        evaluate_env(declared)?,
        evaluate_env(user_env)?,
    ];
    Ok(merge_envs(&tiers))
}

/// Fills `env_list` on a task and on each of its commands.
///
/// The task's own declared env is the parent tier of its commands.
pub(crate) fn resolve_task_env(
    task: &mut Task,
    user_env: &[String],
    config_env: &[String],
) -> Result<(), ResolveError> {
    task.env_list = parse_task_env(&task.env, user_env, &[], config_env)?;
    for cmd in &mut task.commands {
        cmd.env_list = parse_task_env(&cmd.env, user_env, &task.env, config_env)?;
    }
    Ok(())
}
