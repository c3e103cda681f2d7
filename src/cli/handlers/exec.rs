// src/cli/handlers/exec.rs

use crate::{
    cli::{
        GlobalOptions,
        args::{self, ExecArgs},
        handlers::commons,
    },
    core::plan,
};
use anyhow::{Result, anyhow};

/// The main handler for the `exec` command.
pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<()> {
    let exec_args: ExecArgs = args::parse(&args);
    if exec_args.cmd.trim().is_empty() {
        return Err(anyhow!("Nothing to execute: the command is empty."));
    }

    let config = commons::load_config(options)?;
    let (flags, set) = args::run_flags(&exec_args.target, &exec_args.options);
    let runs = plan::parse_cmd(&config, &exec_args.cmd, &flags, &set)?;

    if exec_args.options.dry_run {
        return commons::print_plan(&runs);
    }
    commons::execute_plan(&runs)
}
