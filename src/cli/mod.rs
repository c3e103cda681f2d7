//! Command line surface: the top-level parser and one handler per command.

use crate::core::errors::ResolveError;
use clap::Parser;
use std::path::PathBuf;

pub(crate) mod args;
pub mod handlers;

/// Options that apply to every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Explicit configuration file; discovered from the current directory when unset.
    pub config: Option<PathBuf>,
}

/// reposet: runs shell tasks across many repositories.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    after_help = "Commands:\n  \
        run (r)          Run tasks across projects\n  \
        exec (x)         Run an ad-hoc command across projects\n  \
        describe (desc)  Show projects or tasks in detail\n  \
        list (ls)        List projects, tasks or tags\n  \
        edit (e)         Open the configuration in $EDITOR\n\n\
        Anything else is run as a task: `reposet build` is `reposet run build`.",
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The command followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// The options shared by every handler.
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            config: self.config.clone(),
        }
    }
}

/// Whether `error` only means that no project matched the selection.
pub fn is_no_match(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<ResolveError>(),
        Some(ResolveError::NoTargets)
    )
}
