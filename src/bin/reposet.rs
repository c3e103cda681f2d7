// src/bin/reposet.rs

//! The `reposet` command line tool.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use reposet::cli::{self, Cli, GlobalOptions, handlers};

// --- Command Definition and Registry ---

/// Defines a command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &GlobalOptions) -> Result<()>,
}

/// Every command of the binary. Anything else on the command line is a task name.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "run",
        aliases: &["r"],
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "exec",
        aliases: &["x"],
        handler: handlers::exec::handle,
    },
    CommandDefinition {
        name: "describe",
        aliases: &["desc"],
        handler: handlers::describe::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "edit",
        aliases: &["e"],
        handler: handlers::edit::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Sets up logging, dispatches to the handler and reports errors in one place.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // An empty selection is an outcome, not a failure.
        if cli::is_no_match(&e) {
            println!("{}", "No matching projects found.".yellow());
            return;
        }

        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);
    let options = cli.global_options();

    let mut args = cli.args.into_iter();
    let Some(action) = args.next() else {
        Cli::command().print_help()?;
        return Ok(());
    };
    let rest: Vec<String> = args.collect();

    match find_command(&action) {
        Some(command) => (command.handler)(rest, &options),
        None => {
            // `reposet <task> [flags]` is a shortcut for `reposet run <task> [flags]`.
            let mut run_args = vec![action];
            run_args.extend(rest);
            handlers::run::handle(run_args, &options)
        }
    }
}
