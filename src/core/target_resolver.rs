//! # Target Resolver
//!
//! Applies command-line overrides to a task's target and runs the project filter.
//!
//! When any target flag is present the task's declared target is discarded
//! wholesale. `--target` then loads a named target as the new base, and each flag
//! that was given overwrites only its own field.

use crate::{
    core::{errors::ResolveError, store::Config},
    models::{Project, RunFlags, SetRunFlags, Target, Task},
};

fn has_target_overrides(flags: &RunFlags, set: &SetRunFlags) -> bool {
    !flags.projects.is_empty()
        || !flags.paths.is_empty()
        || !flags.tags.is_empty()
        || !flags.tags_expr.is_empty()
        || !flags.target.is_empty()
        || set.cwd
        || set.all
}

impl Config {
    /// Computes the target of one invocation of `task` and the projects it selects.
    ///
    /// `task` must be the caller's own copy: its `target_data` is replaced with the
    /// final target.
    pub(crate) fn get_task_projects(
        &self,
        task: &mut Task,
        flags: &RunFlags,
        set: &SetRunFlags,
    ) -> Result<Vec<Project>, ResolveError> {
        if has_target_overrides(flags, set) {
            let mut target = if flags.target.is_empty() {
                Target::default()
            } else {
                self.get_target(&flags.target)?.clone()
            };

            if !flags.projects.is_empty() {
                target.projects = flags.projects.clone();
            }
            if !flags.paths.is_empty() {
                target.paths = flags.paths.clone();
            }
            if !flags.tags.is_empty() {
                target.tags = flags.tags.clone();
            }
            if !flags.tags_expr.is_empty() {
                target.tags_expr = flags.tags_expr.clone();
            }
            if set.cwd {
                target.cwd = flags.cwd;
            }
            if set.all {
                target.all = flags.all;
            }

            log::debug!(
                "Target of task '{}' overridden from the command line: {:?}",
                task.name,
                target
            );
            task.target_data = target;
        }

        let projects = self.filter_projects(&task.target_data)?;
        if projects.is_empty() {
            return Err(ResolveError::NoTargets);
        }
        Ok(projects)
    }

    /// Applies `--spec`, `--theme`, `--output`, `--parallel` and `--ignore-errors`
    /// to a task copy.
    pub(crate) fn apply_display_overrides(
        &self,
        task: &mut Task,
        flags: &RunFlags,
    ) -> Result<(), ResolveError> {
        if !flags.spec.is_empty() {
            task.spec_data = self.get_spec(&flags.spec)?.clone();
        }
        if !flags.theme.is_empty() {
            task.theme_data = self.get_theme(&flags.theme)?.clone();
        }
        if let Some(output) = flags.output {
            task.spec_data.output = output;
        }
        if let Some(parallel) = flags.parallel {
            task.spec_data.parallel = parallel;
        }
        if let Some(ignore_errors) = flags.ignore_errors {
            task.spec_data.ignore_errors = ignore_errors;
        }
        Ok(())
    }
}
