//! # Task Resolver
//!
//! Turns a declared task into one that can be executed: the shell is normalized and
//! split into program and arguments, command entries that reference other tasks are
//! replaced by those tasks, and the spec, target and theme fields are resolved to
//! concrete values.
//!
//! Lookup and decode failures are pushed onto a caller-supplied list instead of
//! aborting, so one pass over the configuration reports every broken task.

use crate::{
    constants::{DEFAULT_RESOURCE_NAME, DEFAULT_SHELL},
    core::{
        errors::ResolveError,
        shell::{format_shell, format_shell_string},
        store::{Config, Resource},
    },
    models::{ResourceRef, Task},
};

/// Resolves one `spec`/`target`/`theme` field: inline, then named, then `default`.
pub(crate) fn resolve_resource<T: Resource>(
    reference: &ResourceRef,
    config: &Config,
) -> Result<T, ResolveError> {
    match reference {
        ResourceRef::Inline(value) => value
            .clone()
            .try_into::<T>()
            .map_err(|source| ResolveError::Decode {
                kind: T::KIND,
                source,
            }),
        ResourceRef::Reference(name) => config.get::<T>(name).cloned(),
        ResourceRef::Default => config.get::<T>(DEFAULT_RESOURCE_NAME).cloned(),
    }
}

impl Task {
    /// Resolves the derived fields of the task in place.
    ///
    /// Running it again on a resolved task yields the same result.
    pub(crate) fn parse_task(&mut self, config: &Config, errors: &mut Vec<ResolveError>) {
        log::debug!("Resolving task '{}'.", self.name);

        self.shell = if self.shell.trim().is_empty() {
            config.shell.clone()
        } else {
            format_shell(&self.shell)
        };
        let (program, args) = format_shell_string(&self.shell, &self.cmd);
        self.shell_program = program;
        self.cmd_args = args;

        for cmd in &mut self.commands {
            if !cmd.task.is_empty() {
                match config.get_command(&cmd.task) {
                    Ok(mut referenced) => {
                        referenced.task_ref = cmd.task.clone();
                        *cmd = referenced;
                    }
                    Err(e) => {
                        errors.push(e);
                        continue;
                    }
                }
            }

            cmd.shell = if cmd.shell.trim().is_empty() {
                DEFAULT_SHELL.to_string()
            } else {
                format_shell(&cmd.shell)
            };
            let (program, args) = format_shell_string(&cmd.shell, &cmd.cmd);
            cmd.shell_program = program;
            cmd.cmd_args = args;
        }

        match resolve_resource(&self.spec, config) {
            Ok(spec) => self.spec_data = spec,
            Err(e) => errors.push(e),
        }
        match resolve_resource(&self.target, config) {
            Ok(target) => self.target_data = target,
            Err(e) => errors.push(e),
        }
        match resolve_resource(&self.theme, config) {
            Ok(theme) => self.theme_data = theme,
            Err(e) => errors.push(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::tests::task;
    use crate::models::{Command, OutputFormat, ResourceKind, Spec, Target, Theme};

    fn config() -> Config {
        let mut config = Config::default();
        config.specs.push(Spec {
            name: "table".to_string(),
            output: OutputFormat::Table,
            ..Default::default()
        });
        config.targets.push(Target {
            name: "backend".to_string(),
            tags: vec!["backend".to_string()],
            ..Default::default()
        });
        config.themes.push(Theme {
            name: "plain".to_string(),
            color: false,
            ..Default::default()
        });

        let mut node = task("hello-node", "console.log('hi')");
        node.shell = "node".to_string();
        node.desc = "Say hi from node".to_string();
        node.env = vec!["FROM=node".to_string()];
        config.tasks.push(node);
        config
    }

    fn inline(src: &str) -> ResourceRef {
        ResourceRef::Inline(toml::Value::Table(toml::from_str(src).unwrap()))
    }

    #[test]
    fn test_shell_defaults_and_formatting() {
        let config = Config {
            shell: "zsh -c".to_string(),
            ..config()
        };
        let mut errors = Vec::new();

        let mut inherits = task("a", "ls");
        inherits.parse_task(&config, &mut errors);
        assert_eq!(inherits.shell_program, "zsh");
        assert_eq!(inherits.cmd_args, vec!["-c".to_string(), "ls".to_string()]);

        let mut own = task("b", "print(1)");
        own.shell = "python3".to_string();
        own.parse_task(&config, &mut errors);
        assert_eq!(own.shell, "python3 -c");
        assert_eq!(own.shell_program, "python3");

        assert!(errors.is_empty());
    }

    #[test]
    fn test_command_task_reference_is_replaced() {
        let config = config();
        let mut errors = Vec::new();
        let mut t = task("combo", "");
        t.commands = vec![
            Command {
                task: "hello-node".to_string(),
                name: "ignored".to_string(),
                ..Default::default()
            },
            Command {
                name: "local".to_string(),
                cmd: "echo local".to_string(),
                ..Default::default()
            },
        ];

        t.parse_task(&config, &mut errors);
        assert!(errors.is_empty());

        let referenced = &t.commands[0];
        assert_eq!(referenced.name, "hello-node");
        assert_eq!(referenced.task_ref, "hello-node");
        assert_eq!(referenced.desc, "Say hi from node");
        assert_eq!(referenced.env, vec!["FROM=node".to_string()]);
        assert_eq!(referenced.shell_program, "node");
        assert_eq!(
            referenced.cmd_args,
            vec!["-e".to_string(), "console.log('hi')".to_string()]
        );

        let local = &t.commands[1];
        assert_eq!(local.shell, DEFAULT_SHELL);
        assert_eq!(local.shell_program, "bash");
    }

    #[test]
    fn test_missing_command_reference_is_collected() {
        let config = config();
        let mut errors = Vec::new();
        let mut t = task("combo", "");
        t.commands = vec![Command {
            task: "nope".to_string(),
            ..Default::default()
        }];

        t.parse_task(&config, &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ResolveError::NotFound { kind: ResourceKind::Task, .. }
        ));
        assert_eq!(t.commands[0].task, "nope");
    }

    #[test]
    fn test_resource_precedence() {
        let config = config();
        let mut errors = Vec::new();

        let mut t = task("t", "ls");
        t.spec = ResourceRef::Reference("table".to_string());
        t.target = inline("tags = ['frontend']");
        t.parse_task(&config, &mut errors);

        assert!(errors.is_empty());
        assert_eq!(t.spec_data.output, OutputFormat::Table);
        assert_eq!(t.target_data.tags, vec!["frontend".to_string()]);
        assert_eq!(t.theme_data.name, DEFAULT_RESOURCE_NAME);
    }

    #[test]
    fn test_undefined_spec_does_not_stop_resolution() {
        let config = config();
        let mut errors = Vec::new();

        let mut t = task("t", "ls");
        t.spec = ResourceRef::Reference("fast".to_string());
        t.target = ResourceRef::Reference("backend".to_string());
        t.theme = ResourceRef::Reference("plain".to_string());
        t.commands = vec![Command {
            task: "hello-node".to_string(),
            ..Default::default()
        }];
        t.parse_task(&config, &mut errors);

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ResolveError::NotFound { kind: ResourceKind::Spec, ref names } if names == &["fast"]
        ));
        assert_eq!(t.target_data.name, "backend");
        assert!(!t.theme_data.color);
        assert_eq!(t.commands[0].shell_program, "node");
    }

    #[test]
    fn test_inline_decode_error() {
        let config = config();
        let mut errors = Vec::new();

        let mut t = task("t", "ls");
        t.spec = inline("paralel = true");
        t.theme = ResourceRef::Inline(toml::Value::Integer(3));
        t.parse_task(&config, &mut errors);

        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors[0],
            ResolveError::Decode { kind: ResourceKind::Spec, .. }
        ));
        assert!(matches!(
            errors[1],
            ResolveError::Decode { kind: ResourceKind::Theme, .. }
        ));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let config = config();
        let mut errors = Vec::new();

        let mut t = task("t", "echo hi");
        t.shell = "sh".to_string();
        t.commands = vec![Command {
            task: "hello-node".to_string(),
            ..Default::default()
        }];
        t.parse_task(&config, &mut errors);
        let first = t.clone();

        t.parse_task(&config, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(t, first);
    }
}
