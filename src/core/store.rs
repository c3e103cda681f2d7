//! # Reference Store
//!
//! `Config` owns every resource declared by the loaded configuration files and
//! answers lookups by exact, case-sensitive name. It is built once by the config
//! loader and is read-only afterwards, so it can be shared by any number of
//! concurrent readers.

use crate::{
    constants::{DEFAULT_RESOURCE_NAME, DEFAULT_SHELL},
    core::{errors::ResolveError, shell},
    models::{Command, Project, ResourceKind, Spec, Target, Task, Theme},
};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::PathBuf;

/// A named resource that tasks may declare inline or by reference.
pub(crate) trait Resource: DeserializeOwned + Clone {
    const KIND: ResourceKind;

    fn name(&self) -> &str;

    fn set_name(&mut self, name: &str);

    fn lookup<'a>(config: &'a Config, name: &str) -> Option<&'a Self>;
}

impl Resource for Spec {
    const KIND: ResourceKind = ResourceKind::Spec;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn lookup<'a>(config: &'a Config, name: &str) -> Option<&'a Self> {
        config.specs.iter().find(|s| s.name == name)
    }
}

impl Resource for Target {
    const KIND: ResourceKind = ResourceKind::Target;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn lookup<'a>(config: &'a Config, name: &str) -> Option<&'a Self> {
        config.targets.iter().find(|t| t.name == name)
    }
}

impl Resource for Theme {
    const KIND: ResourceKind = ResourceKind::Theme;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn lookup<'a>(config: &'a Config, name: &str) -> Option<&'a Self> {
        config.themes.iter().find(|t| t.name == name)
    }
}

/// The loaded configuration: the universe of projects and every named resource.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// The root configuration file.
    pub(crate) path: PathBuf,
    /// Formatted default shell for tasks that declare none.
    pub(crate) shell: String,
    /// Config-level `KEY=VALUE` entries, lowest env precedence.
    pub(crate) env: Vec<String>,
    pub(crate) projects: Vec<Project>,
    pub(crate) specs: Vec<Spec>,
    pub(crate) targets: Vec<Target>,
    pub(crate) themes: Vec<Theme>,
    pub(crate) tasks: Vec<Task>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            shell: DEFAULT_SHELL.to_string(),
            env: Vec::new(),
            projects: Vec::new(),
            specs: vec![Spec::builtin()],
            targets: vec![Target::builtin()],
            themes: vec![Theme::builtin()],
            tasks: Vec::new(),
        }
    }
}

impl Config {
    /// Registers a spec, target or theme. A user-defined `default` replaces the
    /// built-in one.
    pub(crate) fn insert_resource<T: Resource>(list: &mut Vec<T>, resource: T) {
        if resource.name() == DEFAULT_RESOURCE_NAME {
            if let Some(slot) = list.iter_mut().find(|r| r.name() == DEFAULT_RESOURCE_NAME) {
                *slot = resource;
                return;
            }
        }
        list.push(resource);
    }

    /// Looks up any named resource.
    pub(crate) fn get<T: Resource>(&self, name: &str) -> Result<&T, ResolveError> {
        T::lookup(self, name).ok_or_else(|| ResolveError::not_found(T::KIND, name))
    }

    pub(crate) fn get_spec(&self, name: &str) -> Result<&Spec, ResolveError> {
        self.get(name)
    }

    pub(crate) fn get_target(&self, name: &str) -> Result<&Target, ResolveError> {
        self.get(name)
    }

    pub(crate) fn get_theme(&self, name: &str) -> Result<&Theme, ResolveError> {
        self.get(name)
    }

    pub(crate) fn get_task(&self, name: &str) -> Result<&Task, ResolveError> {
        self.tasks
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ResolveError::not_found(ResourceKind::Task, name))
    }

    pub(crate) fn get_project(&self, name: &str) -> Result<&Project, ResolveError> {
        self.projects
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ResolveError::not_found(ResourceKind::Project, name))
    }

    /// Returns a task as a reusable command fragment.
    ///
    /// The shell is the task's own (formatted) shell, or the config shell when the
    /// task declares none.
    pub(crate) fn get_command(&self, task_name: &str) -> Result<Command, ResolveError> {
        let task = self.get_task(task_name)?;
        let shell = if task.shell.trim().is_empty() {
            self.shell.clone()
        } else {
            shell::format_shell(&task.shell)
        };

        Ok(Command {
            name: task.name.clone(),
            desc: task.desc.clone(),
            env: task.env.clone(),
            shell,
            cmd: task.cmd.clone(),
            tty: task.tty,
            ..Default::default()
        })
    }

    /// Returns the named tasks in the requested order, or every task when `names` is
    /// empty. Unknown names are all reported in one error.
    pub(crate) fn get_tasks_by_names(&self, names: &[String]) -> Result<Vec<Task>, ResolveError> {
        if names.is_empty() {
            return Ok(self.tasks.clone());
        }

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            if !seen.insert(name.as_str()) {
                continue;
            }
            match self.tasks.iter().find(|t| &t.name == name) {
                Some(task) => found.push(task.clone()),
                None => missing.push(name.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(ResolveError::NotFound {
                kind: ResourceKind::Task,
                names: missing,
            });
        }
        Ok(found)
    }

    pub(crate) fn task_names(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name.clone()).collect()
    }

    /// `name<TAB>desc` lines, as used by shell completion.
    pub(crate) fn task_names_and_desc(&self) -> Vec<String> {
        self.tasks
            .iter()
            .map(|t| format!("{}\t{}", t.name, t.desc))
            .collect()
    }

    pub(crate) fn project_names(&self) -> Vec<String> {
        self.projects.iter().map(|p| p.name.clone()).collect()
    }

    /// Every distinct tag, in order of first appearance.
    pub(crate) fn tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.projects
            .iter()
            .flat_map(|p| p.tags.iter())
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect()
    }

    /// Every distinct project path, in load order.
    pub(crate) fn paths(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.projects
            .iter()
            .map(|p| p.path.clone())
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }
}
