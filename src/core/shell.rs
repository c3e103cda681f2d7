// src/core/shell.rs

use crate::constants::DEFAULT_SHELL;
use std::path::Path;

/// Returns the flag a shell program expects before an inline command string.
fn command_flag(program: &str) -> Option<&'static str> {
    let stem = Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(program);

    match stem {
        "bash" | "sh" | "zsh" | "fish" | "dash" | "ksh" | "python" | "python3" => Some("-c"),
        "node" | "ruby" | "perl" => Some("-e"),
        "php" => Some("-r"),
        "pwsh" | "powershell" => Some("-Command"),
        "cmd" => Some("/C"),
        _ => None,
    }
}

/// Normalizes a shell declaration into `<program> <command flag>`.
///
/// A declaration that already carries arguments (`bash -ec`) is kept as written,
/// as is a program whose flag is unknown.
pub(crate) fn format_shell(shell: &str) -> String {
    let trimmed = shell.trim();
    if trimmed.is_empty() {
        return DEFAULT_SHELL.to_string();
    }
    if trimmed.split_whitespace().nth(1).is_some() {
        return trimmed.to_string();
    }
    match command_flag(trimmed) {
        Some(flag) => format!("{} {}", trimmed, flag),
        None => trimmed.to_string(),
    }
}

/// Splits a formatted shell into the program and its argument vector, with the
/// command string appended as the final argument.
pub(crate) fn format_shell_string(shell: &str, cmd: &str) -> (String, Vec<String>) {
    let shell = if shell.trim().is_empty() {
        DEFAULT_SHELL
    } else {
        shell
    };

    let parts = shlex::split(shell)
        .unwrap_or_else(|| shell.split_whitespace().map(str::to_string).collect());
    let mut parts = parts.into_iter();
    let program = parts.next().unwrap_or_default();
    let mut args: Vec<String> = parts.collect();
    args.push(cmd.to_string());

    (program, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_shell_adds_conventional_flag() {
        assert_eq!(format_shell("bash"), "bash -c");
        assert_eq!(format_shell("node"), "node -e");
        assert_eq!(format_shell("/usr/bin/zsh"), "/usr/bin/zsh -c");
        assert_eq!(format_shell("php"), "php -r");
    }

    #[test]
    fn test_format_shell_keeps_explicit_arguments() {
        assert_eq!(format_shell("bash -ec"), "bash -ec");
        assert_eq!(format_shell("  python3 -u -c "), "python3 -u -c");
        assert_eq!(format_shell("mytool"), "mytool");
        assert_eq!(format_shell(""), DEFAULT_SHELL);
    }

    #[test]
    fn test_format_shell_is_idempotent() {
        let once = format_shell("sh");
        assert_eq!(format_shell(&once), once);
    }

    #[test]
    fn test_format_shell_string() {
        let (program, args) = format_shell_string("bash -c", "echo hello world");
        assert_eq!(program, "bash");
        assert_eq!(args, vec!["-c".to_string(), "echo hello world".to_string()]);

        let (program, args) = format_shell_string("", "ls");
        assert_eq!(program, "bash");
        assert_eq!(args, vec!["-c".to_string(), "ls".to_string()]);
    }
}
