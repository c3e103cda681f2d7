// src/models.rs

use crate::constants::{DEFAULT_FORKS, DEFAULT_RESOURCE_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// --- `reposet.toml` MODELS (What is read from the configuration file) ---

/// The raw shape of one configuration file.
///
/// Resource sections are kept as tables so that every entry can be decoded on its
/// own; a broken task must not hide the errors of its siblings.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    pub(crate) shell: Option<String>,
    #[serde(default)]
    pub(crate) import: Vec<String>,
    #[serde(default)]
    pub(crate) env: toml::Table,
    #[serde(default)]
    pub(crate) projects: toml::Table,
    #[serde(default)]
    pub(crate) specs: toml::Table,
    #[serde(default)]
    pub(crate) targets: toml::Table,
    #[serde(default)]
    pub(crate) themes: toml::Table,
    #[serde(default)]
    pub(crate) tasks: toml::Table,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProjectDefinition {
    #[serde(default)]
    pub(crate) path: Option<String>,
    #[serde(default)]
    pub(crate) desc: String,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
}

/// Full (table) form of a task. The shorthand `name = "cmd"` never reaches this type.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct TaskDefinition {
    #[serde(default)]
    pub(crate) desc: String,
    #[serde(default)]
    pub(crate) shell: String,
    #[serde(default)]
    pub(crate) cmd: String,
    #[serde(default)]
    pub(crate) commands: Vec<CommandDefinition>,
    #[serde(default)]
    pub(crate) env: toml::Table,
    #[serde(default)]
    pub(crate) tty: bool,
    #[serde(default)]
    pub(crate) spec: Option<toml::Value>,
    #[serde(default)]
    pub(crate) target: Option<toml::Value>,
    #[serde(default)]
    pub(crate) theme: Option<toml::Value>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct CommandDefinition {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) desc: String,
    #[serde(default)]
    pub(crate) shell: String,
    #[serde(default)]
    pub(crate) cmd: String,
    #[serde(default)]
    pub(crate) task: String,
    #[serde(default)]
    pub(crate) tty: bool,
    #[serde(default)]
    pub(crate) env: toml::Table,
}

// --- IN-MEMORY MODELS ---

/// The kinds of named resources a configuration can declare.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ResourceKind {
    Project,
    Spec,
    Target,
    Theme,
    Task,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Project => "project",
            Self::Spec => "spec",
            Self::Target => "target",
            Self::Theme => "theme",
            Self::Task => "task",
        };
        f.write_str(label)
    }
}

/// A repository checkout that tasks run against.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Project {
    pub(crate) name: String,
    /// The path as written in the config (relative to the declaring file).
    pub(crate) path: String,
    /// Absolute directory of the checkout.
    pub(crate) dir: PathBuf,
    pub(crate) desc: String,
    pub(crate) tags: Vec<String>,
    /// File that declared the project, for diagnostics.
    #[serde(skip)]
    pub(crate) context: PathBuf,
    #[serde(skip)]
    pub(crate) context_line: Option<usize>,
}

impl Project {
    pub(crate) fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Looks up a displayable field by its column name.
    pub(crate) fn value(&self, key: &str) -> String {
        match key {
            "Name" | "name" | "Project" | "project" => self.name.clone(),
            "Path" | "path" => self.path.clone(),
            "Dir" | "dir" => self.dir.display().to_string(),
            "Desc" | "desc" | "Description" | "description" => self.desc.clone(),
            "Tag" | "tag" | "Tags" | "tags" => self.tags.join(", "),
            _ => String::new(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    #[default]
    Stream,
    Table,
}

/// Output and execution options of a task.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Spec {
    #[serde(skip_deserializing)]
    pub(crate) name: String,
    pub(crate) desc: String,
    pub(crate) output: OutputFormat,
    pub(crate) parallel: bool,
    pub(crate) forks: usize,
    pub(crate) ignore_errors: bool,
    pub(crate) ignore_non_existing: bool,
    pub(crate) omit_empty: bool,
}

impl Default for Spec {
    fn default() -> Self {
        Self {
            name: String::new(),
            desc: String::new(),
            output: OutputFormat::default(),
            parallel: false,
            forks: DEFAULT_FORKS,
            ignore_errors: false,
            ignore_non_existing: false,
            omit_empty: false,
        }
    }
}

impl Spec {
    /// The built-in spec registered under `default`.
    pub(crate) fn builtin() -> Self {
        Self {
            name: DEFAULT_RESOURCE_NAME.to_string(),
            ..Default::default()
        }
    }
}

/// Selects which projects a task runs against.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Target {
    #[serde(skip_deserializing)]
    pub(crate) name: String,
    pub(crate) desc: String,
    pub(crate) all: bool,
    pub(crate) cwd: bool,
    pub(crate) projects: Vec<String>,
    pub(crate) paths: Vec<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) tags_expr: String,
}

impl Target {
    /// The built-in target registered under `default`.
    pub(crate) fn builtin() -> Self {
        Self {
            name: DEFAULT_RESOURCE_NAME.to_string(),
            ..Default::default()
        }
    }
}

/// Display styling of a task's output.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Theme {
    #[serde(skip_deserializing)]
    pub(crate) name: String,
    pub(crate) desc: String,
    pub(crate) color: bool,
    pub(crate) stream: StreamTheme,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StreamTheme {
    /// Prefix every output line with the project name.
    pub(crate) prefix: bool,
    /// Print a header line before each project's output.
    pub(crate) header: bool,
}

impl Default for StreamTheme {
    fn default() -> Self {
        Self {
            prefix: true,
            header: true,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: String::new(),
            desc: String::new(),
            color: true,
            stream: StreamTheme::default(),
        }
    }
}

impl Theme {
    /// The built-in theme registered under `default`.
    pub(crate) fn builtin() -> Self {
        Self {
            name: DEFAULT_RESOURCE_NAME.to_string(),
            ..Default::default()
        }
    }
}

/// A task's spec, target or theme field before resolution.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ResourceRef {
    /// Defined in place; decoded during resolution.
    Inline(toml::Value),
    /// Name of a resource declared elsewhere in the config.
    Reference(String),
    /// Not declared; resolves to the resource named `default`.
    #[default]
    Default,
}

impl From<Option<toml::Value>> for ResourceRef {
    fn from(value: Option<toml::Value>) -> Self {
        match value {
            None => Self::Default,
            Some(toml::Value::String(name)) if name.is_empty() => Self::Default,
            Some(toml::Value::String(name)) => Self::Reference(name),
            Some(inline) => Self::Inline(inline),
        }
    }
}

/// One shell invocation inside a task.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub(crate) struct Command {
    pub(crate) name: String,
    pub(crate) desc: String,
    /// `<program> <command flag>`, e.g. `sh -c` or `node -e`.
    pub(crate) shell: String,
    /// The command string, without the program flag.
    pub(crate) cmd: String,
    /// Name of a task whose command this entry stands for.
    pub(crate) task: String,
    /// Set once `task` has been replaced by the referenced command.
    pub(crate) task_ref: String,
    pub(crate) tty: bool,
    /// Declared `KEY=VALUE` entries, unevaluated.
    pub(crate) env: Vec<String>,

    // Derived during resolution.
    pub(crate) env_list: Vec<String>,
    pub(crate) shell_program: String,
    pub(crate) cmd_args: Vec<String>,
}

/// A named unit of work.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub(crate) struct Task {
    pub(crate) name: String,
    pub(crate) desc: String,
    pub(crate) shell: String,
    pub(crate) cmd: String,
    pub(crate) commands: Vec<Command>,
    /// Declared `KEY=VALUE` entries, unevaluated.
    pub(crate) env: Vec<String>,
    pub(crate) tty: bool,
    pub(crate) spec: ResourceRef,
    pub(crate) target: ResourceRef,
    pub(crate) theme: ResourceRef,

    // Derived during resolution.
    pub(crate) spec_data: Spec,
    pub(crate) target_data: Target,
    pub(crate) theme_data: Theme,
    pub(crate) env_list: Vec<String>,
    pub(crate) shell_program: String,
    pub(crate) cmd_args: Vec<String>,

    /// File that declared the task, for diagnostics.
    pub(crate) context: PathBuf,
    pub(crate) context_line: Option<usize>,
}

impl Task {
    /// Looks up a displayable field by its column name.
    pub(crate) fn value(&self, key: &str) -> String {
        match key {
            "Name" | "name" | "Task" | "task" => self.name.clone(),
            "Desc" | "desc" | "Description" | "description" => self.desc.clone(),
            "Command" | "command" => self.cmd.clone(),
            "Spec" | "spec" => self.spec_data.name.clone(),
            "Target" | "target" => self.target_data.name.clone(),
            "Theme" | "theme" => self.theme_data.name.clone(),
            _ => String::new(),
        }
    }

    /// The task seen as a single command, for embedding into another task.
    pub(crate) fn to_command(&self) -> Command {
        Command {
            name: self.name.clone(),
            desc: self.desc.clone(),
            shell: self.shell.clone(),
            cmd: self.cmd.clone(),
            tty: self.tty,
            env: self.env.clone(),
            env_list: self.env_list.clone(),
            shell_program: self.shell_program.clone(),
            cmd_args: self.cmd_args.clone(),
            ..Default::default()
        }
    }
}

// --- RUNTIME MODELS ---

/// Values of the target/run flags given on the command line.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunFlags {
    pub(crate) projects: Vec<String>,
    pub(crate) paths: Vec<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) tags_expr: String,
    pub(crate) target: String,
    pub(crate) cwd: bool,
    pub(crate) all: bool,
    pub(crate) tty: bool,
    /// `KEY=VALUE` entries from `--env`, highest env precedence.
    pub(crate) env: Vec<String>,
    pub(crate) spec: String,
    pub(crate) theme: String,
    pub(crate) output: Option<OutputFormat>,
    pub(crate) parallel: Option<bool>,
    pub(crate) ignore_errors: Option<bool>,
}

/// Which boolean flags were given explicitly, as opposed to defaulted.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SetRunFlags {
    pub(crate) cwd: bool,
    pub(crate) all: bool,
}

/// A fully resolved task bound to the project it runs in.
///
/// Every run owns its own copy of the task, so runs can be executed in parallel.
#[derive(Serialize, Debug, Clone)]
pub(crate) struct TaskRun {
    pub(crate) task: Task,
    pub(crate) project: Project,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ref_from_value() {
        assert_eq!(ResourceRef::from(None), ResourceRef::Default);
        assert_eq!(
            ResourceRef::from(Some(toml::Value::String(String::new()))),
            ResourceRef::Default
        );
        assert_eq!(
            ResourceRef::from(Some(toml::Value::String("table".to_string()))),
            ResourceRef::Reference("table".to_string())
        );

        let inline = toml::Value::Table(toml::from_str("parallel = true").unwrap());
        assert!(matches!(
            ResourceRef::from(Some(inline)),
            ResourceRef::Inline(_)
        ));
    }

    #[test]
    fn test_spec_decode_defaults_and_unknown_fields() {
        let spec: Spec = toml::from_str("parallel = true").unwrap();
        assert!(spec.parallel);
        assert_eq!(spec.forks, DEFAULT_FORKS);
        assert_eq!(spec.output, OutputFormat::Stream);

        let result: Result<Spec, _> = toml::from_str("paralel = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_task_to_command_copies_execution_fields() {
        let task = Task {
            name: "build".to_string(),
            desc: "Build it".to_string(),
            shell: "bash -c".to_string(),
            cmd: "make".to_string(),
            env: vec!["MODE=release".to_string()],
            shell_program: "bash".to_string(),
            cmd_args: vec!["-c".to_string(), "make".to_string()],
            ..Default::default()
        };

        let cmd = task.to_command();
        assert_eq!(cmd.name, "build");
        assert_eq!(cmd.cmd, "make");
        assert_eq!(cmd.shell_program, "bash");
        assert_eq!(cmd.env, vec!["MODE=release".to_string()]);
        assert!(cmd.task.is_empty());
    }

    #[test]
    fn test_display_values() {
        let project = Project {
            name: "api".to_string(),
            path: "services/api".to_string(),
            dir: PathBuf::from("/work/services/api"),
            desc: String::new(),
            tags: vec!["backend".to_string(), "rust".to_string()],
            ..Default::default()
        };
        assert_eq!(project.value("tags"), "backend, rust");
        assert_eq!(project.value("unknown"), "");

        let task = Task {
            name: "lint".to_string(),
            spec_data: Spec::builtin(),
            ..Default::default()
        };
        assert_eq!(task.value("Task"), "lint");
        assert_eq!(task.value("spec"), DEFAULT_RESOURCE_NAME);
    }
}
