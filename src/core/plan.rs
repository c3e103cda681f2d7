//! # Plan Builder
//!
//! Produces the list of `TaskRun`s for an invocation. Each run owns a deep copy of
//! the resolved task, with its final target, display overrides and environment,
//! bound to one project.

use crate::{
    constants::{AD_HOC_TASK_NAME, MANY_TASKS_NAME},
    core::{
        env,
        errors::{self, ResolveError, ResourceErrors},
        store::Config,
    },
    models::{Command, ResourceKind, RunFlags, SetRunFlags, Task, TaskRun},
};

/// Applies the invocation flags to a copy of `task` and fans it out per project.
fn plan_task(
    config: &Config,
    task: &Task,
    flags: &RunFlags,
    set: &SetRunFlags,
) -> Result<Vec<TaskRun>, ResolveError> {
    let mut task = task.clone();
    if flags.tty {
        task.tty = true;
        for cmd in &mut task.commands {
            cmd.tty = true;
        }
    }
    config.apply_display_overrides(&mut task, flags)?;
    let projects = config.get_task_projects(&mut task, flags, set)?;
    env::resolve_task_env(&mut task, &flags.env, &config.env)?;

    log::debug!(
        "Planned task '{}' for {} project(s).",
        task.name,
        projects.len()
    );
    Ok(projects
        .into_iter()
        .map(|project| TaskRun {
            task: task.clone(),
            project,
        })
        .collect())
}

/// Resolves a synthetic task and fails with the full report if anything is broken.
fn resolve_synthetic(config: &Config, task: &mut Task) -> Result<(), ResolveError> {
    let mut batch = ResourceErrors::new(
        ResourceKind::Task,
        &task.name,
        config.path.clone(),
        None,
    );
    task.parse_task(config, &mut batch.errors);
    errors::check_errors(&[batch])
}

/// Plans an ad-hoc shell command that is not declared in the configuration.
pub(crate) fn parse_cmd(
    config: &Config,
    cmd: &str,
    flags: &RunFlags,
    set: &SetRunFlags,
) -> Result<Vec<TaskRun>, ResolveError> {
    let mut task = Task {
        name: AD_HOC_TASK_NAME.to_string(),
        cmd: cmd.to_string(),
        tty: flags.tty,
        ..Default::default()
    };
    resolve_synthetic(config, &mut task)?;
    plan_task(config, &task, flags, set)
}

/// Plans one declared task.
pub(crate) fn parse_single_task(
    config: &Config,
    name: &str,
    flags: &RunFlags,
    set: &SetRunFlags,
) -> Result<Vec<TaskRun>, ResolveError> {
    let task = config.get_task(name)?;
    plan_task(config, task, flags, set)
}

/// Plans several declared tasks as one task whose commands run in the given order.
///
/// The combined task uses the default spec, target and theme unless flags say
/// otherwise. Commands taken from a task keep that task's env beneath their own.
pub(crate) fn parse_many_tasks(
    config: &Config,
    names: &[String],
    flags: &RunFlags,
    set: &SetRunFlags,
) -> Result<Vec<TaskRun>, ResolveError> {
    let mut parent = Task {
        name: MANY_TASKS_NAME.to_string(),
        ..Default::default()
    };
    resolve_synthetic(config, &mut parent)?;

    // Reports every unknown name at once before anything is combined.
    config.get_tasks_by_names(names)?;

    // A name given twice runs twice.
    for name in names {
        let task = config.get_task(name)?;
        if !task.cmd.trim().is_empty() {
            parent.commands.push(task.to_command());
        }
        for cmd in &task.commands {
            let mut env = task.env.clone();
            env.extend(cmd.env.iter().cloned());
            parent.commands.push(Command {
                env,
                ..cmd.clone()
            });
        }
    }

    plan_task(config, &parent, flags, set)
}
