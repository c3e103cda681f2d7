// src/constants.rs

/// File names searched for, in order, when discovering a configuration file.
pub(crate) const CONFIG_FILENAMES: [&str; 2] = ["reposet.toml", ".reposet.toml"];

/// The name of the directory holding the user-level config (in ~/.config/).
pub(crate) const GLOBAL_CONFIG_DIR: &str = "reposet";

/// The name of the user-level fallback config file (inside `GLOBAL_CONFIG_DIR`).
pub(crate) const GLOBAL_CONFIG_FILENAME: &str = "config.toml";

/// Shell used when neither the task, the command, nor the config define one.
pub(crate) const DEFAULT_SHELL: &str = "bash -c";

/// Shell used to evaluate `$(...)` environment values.
pub(crate) const ENV_EVAL_SHELL: &str = "sh";

/// Name of the built-in spec, target and theme used when a task declares none.
pub(crate) const DEFAULT_RESOURCE_NAME: &str = "default";

/// Name given to the synthetic task built for an ad-hoc command.
pub(crate) const AD_HOC_TASK_NAME: &str = "output";

/// Name given to the synthetic task that groups several tasks in one run.
pub(crate) const MANY_TASKS_NAME: &str = "Tasks";

/// Maximum nesting of `import` entries.
pub(crate) const MAX_IMPORT_DEPTH: usize = 16;

/// Default number of parallel workers when a spec enables `parallel`.
pub(crate) const DEFAULT_FORKS: usize = 4;
