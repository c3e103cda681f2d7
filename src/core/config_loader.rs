//! # Config Loader
//!
//! Finds the configuration file, reads it together with every file it imports, and
//! builds the [`Config`] store. Each resource is decoded on its own so that one
//! broken entry does not hide the problems of its siblings; those problems are
//! returned as [`ResourceErrors`] batches next to the store.
//!
//! Once every file is read, each task is resolved against the finished store.

use crate::{
    constants::{CONFIG_FILENAMES, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILENAME, MAX_IMPORT_DEPTH},
    core::{
        env::env_entries,
        errors::{ResolveError, ResourceErrors},
        shell::format_shell,
        store::{Config, Resource},
    },
    models::{
        Command, CommandDefinition, ConfigFile, Project, ProjectDefinition, ResourceKind,
        ResourceRef, Spec, Target, Task, TaskDefinition, Theme,
    },
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that prevent a configuration from being loaded at all.
#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML file at '{}': {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("No configuration found. Create a 'reposet.toml' file or pass --config <path>.")]
    NotFound,
    #[error("Import cycle detected: {}", display_chain(.chain))]
    ImportCycle { chain: Vec<PathBuf> },
    #[error("Imports nested deeper than {limit} levels at '{}'.", .path.display())]
    ImportTooDeep { path: PathBuf, limit: usize },
    #[error(
        "Duplicate {kind} '{name}': declared in '{}' and again in '{}'.",
        .first.display(),
        .second.display()
    )]
    DuplicateName {
        kind: ResourceKind,
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("Failed to expand path '{value}': {reason}")]
    PathExpansion { value: String, reason: String },
    #[error("Invalid env in '{}': {source}", .path.display())]
    Env {
        path: PathBuf,
        #[source]
        source: ResolveError,
    },
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Returns the configuration file to use when none is given explicitly.
///
/// Searches `start` and its ancestors for `reposet.toml` or `.reposet.toml`, then
/// falls back to `<config_dir>/reposet/config.toml`.
pub(crate) fn find_config(start: &Path) -> Result<PathBuf, ConfigError> {
    for dir in start.ancestors() {
        for filename in CONFIG_FILENAMES {
            let candidate = dir.join(filename);
            if candidate.is_file() {
                log::debug!("Found configuration at '{}'.", candidate.display());
                return Ok(candidate);
            }
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILENAME))
        .filter(|path| path.is_file())
        .ok_or(ConfigError::NotFound)
}

/// Loads the configuration rooted at `path`.
///
/// Structural problems (unreadable files, TOML syntax, import cycles, duplicate
/// names) fail the whole load. Problems inside individual resources are collected
/// and returned with the store.
pub(crate) fn load_config(path: &Path) -> Result<(Config, Vec<ResourceErrors>), ConfigError> {
    let root = canonical(path)?;
    let mut loader = Loader {
        config: Config {
            path: root.clone(),
            ..Default::default()
        },
        ..Default::default()
    };

    loader.load_file(&root, 0)?;
    loader.resolve_tasks();

    log::debug!(
        "Loaded {} project(s) and {} task(s) from '{}'.",
        loader.config.projects.len(),
        loader.config.tasks.len(),
        root.display()
    );
    Ok((loader.config, loader.errors))
}

/// Finds the line of `name` inside the `[section]` table of a TOML document.
///
/// Both `[section.name]` headers and `name = ...` keys under `[section]` are
/// recognized. Lines are 1-based.
pub(crate) fn find_definition_line(content: &str, section: &str, name: &str) -> Option<usize> {
    let headers = [
        format!("[{}.{}]", section, name),
        format!("[{}.\"{}\"]", section, name),
    ];
    let section_header = format!("[{}]", section);

    let mut in_section = false;
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if headers.iter().any(|h| h == trimmed) {
            return Some(index + 1);
        }
        if trimmed.starts_with('[') {
            in_section = trimmed == section_header;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, _)) = trimmed.split_once('=') {
            let key = key.trim().trim_matches('"');
            if key == name {
                return Some(index + 1);
            }
        }
    }
    None
}

fn canonical(path: &Path) -> Result<PathBuf, ConfigError> {
    dunce::canonicalize(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn expand(value: &str) -> Result<String, ConfigError> {
    shellexpand::full(value)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| ConfigError::PathExpansion {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn section_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Project => "projects",
        ResourceKind::Spec => "specs",
        ResourceKind::Target => "targets",
        ResourceKind::Theme => "themes",
        ResourceKind::Task => "tasks",
    }
}

/// One configuration file being read.
struct Source {
    path: PathBuf,
    dir: PathBuf,
    content: String,
}

impl Source {
    fn line_of(&self, kind: ResourceKind, name: &str) -> Option<usize> {
        find_definition_line(&self.content, section_name(kind), name)
    }

    fn batch(&self, kind: ResourceKind, name: &str) -> ResourceErrors {
        ResourceErrors::new(kind, name, self.path.clone(), self.line_of(kind, name))
    }
}

#[derive(Default)]
struct Loader {
    config: Config,
    errors: Vec<ResourceErrors>,
    /// Files currently being read, outermost first.
    stack: Vec<PathBuf>,
    loaded: HashSet<PathBuf>,
    origins: HashMap<(ResourceKind, String), PathBuf>,
}

impl Loader {
    fn load_file(&mut self, path: &Path, depth: usize) -> Result<(), ConfigError> {
        if self.stack.iter().any(|p| p == path) {
            let mut chain = self.stack.clone();
            chain.push(path.to_path_buf());
            return Err(ConfigError::ImportCycle { chain });
        }
        if depth > MAX_IMPORT_DEPTH {
            return Err(ConfigError::ImportTooDeep {
                path: path.to_path_buf(),
                limit: MAX_IMPORT_DEPTH,
            });
        }
        // A file imported from two places is read once.
        if !self.loaded.insert(path.to_path_buf()) {
            return Ok(());
        }

        log::debug!("Reading configuration file '{}'.", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Source {
            path: path.to_path_buf(),
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            content,
        };

        // Shell and env are only taken from the root file.
        if depth == 0 {
            self.config.shell = format_shell(file.shell.as_deref().unwrap_or_default());
            self.config.env = env_entries(&file.env).map_err(|e| ConfigError::Env {
                path: source.path.clone(),
                source: e,
            })?;
        }

        self.stack.push(source.path.clone());

        self.add_projects(&file.projects, &source)?;
        for spec in self.decode_resources::<Spec>(&file.specs, &source)? {
            Config::insert_resource(&mut self.config.specs, spec);
        }
        for target in self.decode_resources::<Target>(&file.targets, &source)? {
            Config::insert_resource(&mut self.config.targets, target);
        }
        for theme in self.decode_resources::<Theme>(&file.themes, &source)? {
            Config::insert_resource(&mut self.config.themes, theme);
        }
        self.add_tasks(&file.tasks, &source)?;

        for import in &file.import {
            let import_path = canonical(&source.dir.join(expand(import)?))?;
            self.load_file(&import_path, depth + 1)?;
        }

        self.stack.pop();
        Ok(())
    }

    /// Records where a name was declared; a second declaration is an error.
    fn claim_name(
        &mut self,
        kind: ResourceKind,
        name: &str,
        path: &Path,
    ) -> Result<(), ConfigError> {
        let key = (kind, name.to_string());
        if let Some(first) = self.origins.get(&key) {
            return Err(ConfigError::DuplicateName {
                kind,
                name: name.to_string(),
                first: first.clone(),
                second: path.to_path_buf(),
            });
        }
        self.origins.insert(key, path.to_path_buf());
        Ok(())
    }

    fn decode_resources<T: Resource>(
        &mut self,
        table: &toml::Table,
        source: &Source,
    ) -> Result<Vec<T>, ConfigError> {
        let mut decoded = Vec::with_capacity(table.len());
        for (name, value) in table {
            self.claim_name(T::KIND, name, &source.path)?;
            match value.clone().try_into::<T>() {
                Ok(mut resource) => {
                    resource.set_name(name);
                    decoded.push(resource);
                }
                Err(e) => {
                    let mut batch = source.batch(T::KIND, name);
                    batch.errors.push(ResolveError::Decode {
                        kind: T::KIND,
                        source: e,
                    });
                    self.errors.push(batch);
                }
            }
        }
        Ok(decoded)
    }

    fn add_projects(&mut self, table: &toml::Table, source: &Source) -> Result<(), ConfigError> {
        for (name, value) in table {
            self.claim_name(ResourceKind::Project, name, &source.path)?;

            let definition: ProjectDefinition = match value.clone().try_into() {
                Ok(definition) => definition,
                Err(e) => {
                    let mut batch = source.batch(ResourceKind::Project, name);
                    batch.errors.push(ResolveError::Decode {
                        kind: ResourceKind::Project,
                        source: e,
                    });
                    self.errors.push(batch);
                    continue;
                }
            };

            let path = definition.path.unwrap_or_else(|| name.clone());
            let joined = source.dir.join(expand(&path)?);
            let dir = dunce::canonicalize(&joined).unwrap_or(joined);

            self.config.projects.push(Project {
                name: name.clone(),
                path,
                dir,
                desc: definition.desc,
                tags: definition.tags,
                context: source.path.clone(),
                context_line: source.line_of(ResourceKind::Project, name),
            });
        }
        Ok(())
    }

    fn add_tasks(&mut self, table: &toml::Table, source: &Source) -> Result<(), ConfigError> {
        for (name, value) in table {
            self.claim_name(ResourceKind::Task, name, &source.path)?;

            let mut batch = source.batch(ResourceKind::Task, name);
            let mut task = match value {
                toml::Value::String(cmd) => Task {
                    cmd: cmd.clone(),
                    ..Default::default()
                },
                other => match other.clone().try_into::<TaskDefinition>() {
                    Ok(definition) => build_task(definition, &mut batch.errors),
                    Err(e) => {
                        batch.errors.push(ResolveError::Decode {
                            kind: ResourceKind::Task,
                            source: e,
                        });
                        Task::default()
                    }
                },
            };
            task.name = name.clone();
            task.context = source.path.clone();
            task.context_line = batch.line;

            if !batch.is_empty() {
                self.errors.push(batch);
            }
            self.config.tasks.push(task);
        }
        Ok(())
    }

    /// Resolves every task against the finished store.
    fn resolve_tasks(&mut self) {
        let mut tasks = self.config.tasks.clone();
        for task in &mut tasks {
            let mut found = Vec::new();
            task.parse_task(&self.config, &mut found);
            if found.is_empty() {
                continue;
            }

            let existing = self
                .errors
                .iter_mut()
                .find(|b| b.kind == ResourceKind::Task && b.name == task.name);
            match existing {
                Some(batch) => batch.errors.append(&mut found),
                None => {
                    let mut batch = ResourceErrors::new(
                        ResourceKind::Task,
                        &task.name,
                        task.context.clone(),
                        task.context_line,
                    );
                    batch.errors = found;
                    self.errors.push(batch);
                }
            }
        }
        self.config.tasks = tasks;
    }
}

fn build_command(definition: CommandDefinition, errors: &mut Vec<ResolveError>) -> Command {
    let env = env_entries(&definition.env).unwrap_or_else(|e| {
        errors.push(e);
        Vec::new()
    });
    Command {
        name: definition.name,
        desc: definition.desc,
        shell: definition.shell,
        cmd: definition.cmd,
        task: definition.task,
        tty: definition.tty,
        env,
        ..Default::default()
    }
}

fn build_task(definition: TaskDefinition, errors: &mut Vec<ResolveError>) -> Task {
    let env = env_entries(&definition.env).unwrap_or_else(|e| {
        errors.push(e);
        Vec::new()
    });
    let commands = definition
        .commands
        .into_iter()
        .map(|c| build_command(c, errors))
        .collect();

    Task {
        desc: definition.desc,
        shell: definition.shell,
        cmd: definition.cmd,
        commands,
        env,
        tty: definition.tty,
        spec: ResourceRef::from(definition.spec),
        target: ResourceRef::from(definition.target),
        theme: ResourceRef::from(definition.theme),
        ..Default::default()
    }
}
