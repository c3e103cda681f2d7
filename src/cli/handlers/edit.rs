// src/cli/handlers/edit.rs

use crate::{
    cli::{
        GlobalOptions,
        args::{self, EditArgs, EditCommand},
        handlers::commons,
    },
    core::config_loader,
    system::executor,
};
use anyhow::{Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};

const FALLBACK_EDITOR: &str = "vi";

/// The main handler for the `edit` command.
pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<()> {
    let edit_args: EditArgs = args::parse(&args);
    let (file, line) = edit_target(edit_args.what.as_ref(), options)?;

    let editor = env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| FALLBACK_EDITOR.to_string());
    let (program, editor_args) = editor_command(&editor, &file, line)?;
    executor::execute_interactive(&program, &editor_args)?;
    Ok(())
}

/// Picks the file and line to open.
///
/// Only a missing configuration is fatal. When the configuration cannot be loaded
/// the root file is opened at the top so the user can repair it.
fn edit_target(
    what: Option<&EditCommand>,
    options: &GlobalOptions,
) -> Result<(PathBuf, Option<usize>)> {
    let path = commons::config_path(options)?;
    let Some(what) = what else {
        return Ok((path, None));
    };

    let config = match config_loader::load_config(&path) {
        Ok((config, _)) => config,
        Err(e) => {
            log::warn!("{}", e);
            return Ok((path, None));
        }
    };

    match what {
        EditCommand::Task { name } => {
            let task = config.get_task(name)?;
            Ok((task.context.clone(), task.context_line))
        }
        EditCommand::Project { name } => {
            let project = config.get_project(name)?;
            Ok((project.context.clone(), project.context_line))
        }
    }
}

/// Splits `$EDITOR` and appends `+LINE` and the file.
fn editor_command(editor: &str, file: &Path, line: Option<usize>) -> Result<(String, Vec<String>)> {
    let mut parts = shlex::split(editor)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| anyhow!("Invalid editor command '{}'.", editor))?
        .into_iter();
    let program = parts
        .next()
        .ok_or_else(|| anyhow!("Invalid editor command '{}'.", editor))?;

    let mut args: Vec<String> = parts.collect();
    if let Some(line) = line {
        args.push(format!("+{}", line));
    }
    args.push(file.display().to_string());
    Ok((program, args))
}
