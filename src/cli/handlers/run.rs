// src/cli/handlers/run.rs

use crate::{
    cli::{
        GlobalOptions,
        args::{self, RunArgs},
        handlers::commons,
    },
    core::plan,
};
use anyhow::Result;

/// The main handler for the `run` command.
pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<()> {
    let run_args: RunArgs = args::parse(&args);
    let config = commons::load_config(options)?;
    let (flags, set) = args::run_flags(&run_args.target, &run_args.options);

    let runs = match run_args.tasks.as_slice() {
        [single] => plan::parse_single_task(&config, single, &flags, &set)?,
        many => plan::parse_many_tasks(&config, many, &flags, &set)?,
    };

    if run_args.options.dry_run {
        return commons::print_plan(&runs);
    }
    commons::execute_plan(&runs)
}
