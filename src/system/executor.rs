// src/system/executor.rs

use crate::models::{Task, TaskRun};
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum ExecutionError {
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{0}' exited with a non-zero error code.")]
    NonZeroExitStatus(String),
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("Project directory '{}' does not exist.", .0.display())]
    MissingDirectory(PathBuf),
}

/// How the output of spawned commands is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputMode {
    /// Child processes write straight to the terminal.
    Inherit,
    /// Stdout and stderr are collected and returned.
    Capture,
}

/// One process to spawn for a run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Invocation<'a> {
    pub(crate) label: &'a str,
    pub(crate) program: &'a str,
    pub(crate) args: &'a [String],
    pub(crate) env: &'a [String],
    pub(crate) tty: bool,
}

/// The result of executing every command of a run.
#[derive(Debug, Default)]
pub(crate) struct RunReport {
    /// Captured output; empty in `OutputMode::Inherit`.
    pub(crate) output: String,
    pub(crate) errors: Vec<ExecutionError>,
}

impl RunReport {
    pub(crate) fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Lists the processes a resolved task spawns, in order: its own `cmd` first, then
/// every entry of `commands`. A tty task attaches stdin to all of them.
pub(crate) fn invocations(task: &Task) -> Vec<Invocation<'_>> {
    let mut steps = Vec::with_capacity(task.commands.len() + 1);
    if !task.cmd.trim().is_empty() {
        steps.push(Invocation {
            label: &task.name,
            program: &task.shell_program,
            args: &task.cmd_args,
            env: &task.env_list,
            tty: task.tty,
        });
    }
    for cmd in task.commands.iter().filter(|c| !c.cmd.trim().is_empty()) {
        let label = if cmd.name.is_empty() {
            cmd.task_ref.as_str()
        } else {
            cmd.name.as_str()
        };
        steps.push(Invocation {
            label,
            program: &cmd.shell_program,
            args: &cmd.cmd_args,
            env: &cmd.env_list,
            tty: task.tty || cmd.tty,
        });
    }
    steps
}

fn split_env(entries: &[String]) -> impl Iterator<Item = (&str, &str)> {
    entries.iter().filter_map(|e| e.split_once('='))
}

fn describe(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Executes every command of a run inside the project directory.
///
/// A failing command stops the run unless `ignore_errors` is set, in which case the
/// failure is recorded and the next command still runs.
pub(crate) fn execute_run(run: &TaskRun, mode: OutputMode, ignore_errors: bool) -> RunReport {
    let mut report = RunReport::default();
    let dir = &run.project.dir;
    if !dir.is_dir() {
        report
            .errors
            .push(ExecutionError::MissingDirectory(dir.clone()));
        return report;
    }

    for step in invocations(&run.task) {
        log::debug!(
            "Running '{}' in '{}' for project '{}'.",
            step.label,
            dir.display(),
            run.project.name
        );
        let result = execute_invocation(&step, dir, mode);
        match result {
            Ok(output) => report.output.push_str(&output),
            Err(e) => {
                report.errors.push(e);
                if !ignore_errors {
                    break;
                }
            }
        }
    }
    report
}

fn execute_invocation(
    step: &Invocation<'_>,
    cwd: &Path,
    mode: OutputMode,
) -> Result<String, ExecutionError> {
    let command_line = describe(step.program, step.args);
    let clean_cwd = dunce::simplified(cwd);

    let mut command = StdCommand::new(step.program);
    command
        .args(step.args)
        .current_dir(clean_cwd)
        .envs(split_env(step.env))
        .stdin(if step.tty {
            Stdio::inherit()
        } else {
            Stdio::null()
        });

    match mode {
        OutputMode::Inherit => {
            let status = command
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;
            if !status.success() {
                return Err(ExecutionError::NonZeroExitStatus(command_line));
            }
            Ok(String::new())
        }
        OutputMode::Capture => {
            let output = command
                .output()
                .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;
            if !output.status.success() {
                return Err(ExecutionError::NonZeroExitStatus(command_line));
            }
            // Captured output is only displayed, so undecodable bytes are replaced.
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            Ok(text)
        }
    }
}

/// Runs a program attached to the user's terminal and waits for it to exit.
pub(crate) fn execute_interactive(program: &str, args: &[String]) -> Result<(), ExecutionError> {
    let command_line = describe(program, args);
    log::debug!("Launching '{}'.", command_line);

    let status = StdCommand::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;

    if !status.success() {
        return Err(ExecutionError::NonZeroExitStatus(command_line));
    }
    Ok(())
}

/// Executes a command and captures its standard output.
/// Stderr is passed through to the user's terminal.
/// NOTE: This operation is blocking. It is intended for short-running commands used
/// for value substitution.
pub(crate) fn execute_and_capture_output(
    program: &str,
    args: &[String],
    env_vars: &[(String, String)],
) -> Result<String, ExecutionError> {
    let command_line = describe(program, args);

    let command_output = StdCommand::new(program)
        .args(args)
        .envs(env_vars.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;

    if !command_output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus(command_line));
    }

    String::from_utf8(command_output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: command_line,
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Command, Project};

    fn sh(cmd: &str) -> Vec<String> {
        vec!["-c".to_string(), cmd.to_string()]
    }

    fn run_in(dir: &Path, task: Task) -> TaskRun {
        TaskRun {
            task,
            project: Project {
                name: "demo".to_string(),
                path: "demo".to_string(),
                dir: dir.to_path_buf(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_invocations_order_and_skips_empty_commands() {
        let task = Task {
            name: "t".to_string(),
            cmd: "echo first".to_string(),
            shell_program: "sh".to_string(),
            cmd_args: sh("echo first"),
            commands: vec![
                Command {
                    name: "second".to_string(),
                    cmd: "echo second".to_string(),
                    ..Default::default()
                },
                Command::default(),
                Command {
                    task_ref: "third".to_string(),
                    cmd: "echo third".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let labels: Vec<&str> = invocations(&task).iter().map(|i| i.label).collect();
        assert_eq!(labels, vec!["t", "second", "third"]);
    }

    #[test]
    fn test_tty_task_attaches_stdin_to_every_command() {
        let task = Task {
            name: "shell".to_string(),
            tty: true,
            commands: vec![Command {
                name: "read".to_string(),
                cmd: "cat".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(invocations(&task).iter().all(|i| i.tty));

        let plain = Task {
            tty: false,
            ..task
        };
        assert!(invocations(&plain).iter().all(|i| !i.tty));
    }

    #[test]
    fn test_execute_run_accepts_non_utf8_output() {
        let dir = tempfile::tempdir().unwrap();
        let task = Task {
            name: "binary".to_string(),
            cmd: "printf 'ok\\377'".to_string(),
            shell_program: "sh".to_string(),
            cmd_args: sh("printf 'ok\\377'"),
            ..Default::default()
        };

        let report = execute_run(&run_in(dir.path(), task), OutputMode::Capture, false);
        assert!(report.succeeded());
        assert!(report.output.starts_with("ok"));
    }

    #[test]
    fn test_execute_run_captures_output_with_env() {
        let dir = tempfile::tempdir().unwrap();
        let task = Task {
            name: "greet".to_string(),
            cmd: "echo \"$GREETING\"".to_string(),
            shell_program: "sh".to_string(),
            cmd_args: sh("echo \"$GREETING\""),
            env_list: vec!["GREETING=hello=world".to_string()],
            ..Default::default()
        };

        let report = execute_run(&run_in(dir.path(), task), OutputMode::Capture, false);
        assert!(report.succeeded());
        assert_eq!(report.output.trim(), "hello=world");
    }

    #[test]
    fn test_execute_run_stops_on_failure_unless_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let task = Task {
            name: "fail".to_string(),
            commands: vec![
                Command {
                    name: "boom".to_string(),
                    cmd: "exit 3".to_string(),
                    shell_program: "sh".to_string(),
                    cmd_args: sh("exit 3"),
                    ..Default::default()
                },
                Command {
                    name: "after".to_string(),
                    cmd: "echo after".to_string(),
                    shell_program: "sh".to_string(),
                    cmd_args: sh("echo after"),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let run = run_in(dir.path(), task);

        let strict = execute_run(&run, OutputMode::Capture, false);
        assert_eq!(strict.errors.len(), 1);
        assert!(!strict.output.contains("after"));

        let lenient = execute_run(&run, OutputMode::Capture, true);
        assert_eq!(lenient.errors.len(), 1);
        assert!(lenient.output.contains("after"));
    }

    #[test]
    fn test_execute_run_missing_directory() {
        let run = run_in(Path::new("/definitely/not/here"), Task::default());
        let report = execute_run(&run, OutputMode::Capture, false);
        assert!(matches!(
            report.errors.first(),
            Some(ExecutionError::MissingDirectory(_))
        ));
    }

    #[test]
    fn test_execute_and_capture_output() {
        let out = execute_and_capture_output("sh", &sh("printf '%s' \"$X\""), &[(
            "X".to_string(),
            "42".to_string(),
        )])
        .unwrap();
        assert_eq!(out, "42");

        let err = execute_and_capture_output("sh", &sh("exit 1"), &[]);
        assert!(matches!(err, Err(ExecutionError::NonZeroExitStatus(_))));
    }
}
