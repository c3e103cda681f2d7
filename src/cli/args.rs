// src/cli/args.rs

use crate::models::{OutputFormat, RunFlags, SetRunFlags};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Parses a handler's arguments, letting clap print help or usage errors and exit.
pub(crate) fn parse<T: Parser>(args: &[String]) -> T {
    T::try_parse_from(args).unwrap_or_else(|e| e.exit())
}

/// Flags that select the projects a task runs against.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct TargetArgs {
    /// Select projects by name (comma separated or repeated).
    #[arg(long, short = 'p', value_delimiter = ',')]
    pub(crate) projects: Vec<String>,

    /// Select projects located under these paths.
    #[arg(long, short = 'd', value_delimiter = ',')]
    pub(crate) paths: Vec<String>,

    /// Select projects that carry any of these tags.
    #[arg(long, short = 't', value_delimiter = ',')]
    pub(crate) tags: Vec<String>,

    /// Select projects matching a tag expression, e.g. "backend && !legacy".
    #[arg(long, short = 'E')]
    pub(crate) tags_expr: Option<String>,

    /// Use a named target as the base for the other flags.
    #[arg(long, short = 'T')]
    pub(crate) target: Option<String>,

    /// Select the project containing the current directory.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub(crate) cwd: Option<bool>,

    /// Select every project.
    #[arg(
        long,
        short = 'a',
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub(crate) all: Option<bool>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub(crate) enum OutputArg {
    Stream,
    Table,
}

impl From<OutputArg> for OutputFormat {
    fn from(value: OutputArg) -> Self {
        match value {
            OutputArg::Stream => Self::Stream,
            OutputArg::Table => Self::Table,
        }
    }
}

/// Flags that change how a resolved task is executed and displayed.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ExecOptions {
    /// Set an environment variable for every command (KEY=VALUE, repeatable).
    #[arg(long, value_name = "KEY=VALUE")]
    pub(crate) env: Vec<String>,

    /// Use a named spec.
    #[arg(long, short = 's')]
    pub(crate) spec: Option<String>,

    /// Use a named theme.
    #[arg(long)]
    pub(crate) theme: Option<String>,

    /// Output format.
    #[arg(long, short = 'o', value_enum)]
    pub(crate) output: Option<OutputArg>,

    /// Run projects in parallel.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub(crate) parallel: Option<bool>,

    /// Keep going when a command fails.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub(crate) ignore_errors: Option<bool>,

    /// Attach stdin to the commands.
    #[arg(long)]
    pub(crate) tty: bool,

    /// Print the resolved plan as JSON instead of running it.
    #[arg(long)]
    pub(crate) dry_run: bool,
}

/// Builds the resolver's flag set from the parsed command line.
pub(crate) fn run_flags(target: &TargetArgs, options: &ExecOptions) -> (RunFlags, SetRunFlags) {
    let flags = RunFlags {
        projects: target.projects.clone(),
        paths: target.paths.clone(),
        tags: target.tags.clone(),
        tags_expr: target.tags_expr.clone().unwrap_or_default(),
        target: target.target.clone().unwrap_or_default(),
        cwd: target.cwd.unwrap_or_default(),
        all: target.all.unwrap_or_default(),
        tty: options.tty,
        env: options.env.clone(),
        spec: options.spec.clone().unwrap_or_default(),
        theme: options.theme.clone().unwrap_or_default(),
        output: options.output.map(OutputFormat::from),
        parallel: options.parallel,
        ignore_errors: options.ignore_errors,
    };
    let set = SetRunFlags {
        cwd: target.cwd.is_some(),
        all: target.all.is_some(),
    };
    (flags, set)
}

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Runs one or more tasks across the selected projects."
)]
pub(crate) struct RunArgs {
    /// Tasks to run, in order.
    #[arg(required = true)]
    pub(crate) tasks: Vec<String>,

    #[command(flatten)]
    pub(crate) target: TargetArgs,

    #[command(flatten)]
    pub(crate) options: ExecOptions,
}

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Runs an ad-hoc shell command across the selected projects."
)]
pub(crate) struct ExecArgs {
    /// The command line to run (quote it).
    pub(crate) cmd: String,

    #[command(flatten)]
    pub(crate) target: TargetArgs,

    #[command(flatten)]
    pub(crate) options: ExecOptions,
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Shows projects or tasks in detail.")]
pub(crate) struct DescribeArgs {
    #[command(subcommand)]
    pub(crate) what: DescribeCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum DescribeCommand {
    /// Describe projects, optionally filtered.
    #[command(visible_aliases = ["project", "proj"])]
    Projects {
        /// Project names. Defaults to every project.
        names: Vec<String>,

        #[arg(long, short = 't', value_delimiter = ',')]
        tags: Vec<String>,

        #[arg(long, short = 'd', value_delimiter = ',')]
        paths: Vec<String>,

        #[arg(long, short = 'E')]
        tags_expr: Option<String>,
    },
    /// Describe tasks.
    #[command(visible_aliases = ["task"])]
    Tasks {
        /// Task names. Defaults to every task.
        names: Vec<String>,
    },
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Lists projects, tasks, tags or paths.")]
pub(crate) struct ListArgs {
    #[command(subcommand)]
    pub(crate) what: ListCommand,

    /// Print bare names, one per line.
    #[arg(long, short = 'n', global = true)]
    pub(crate) names_only: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub(crate) enum ListCommand {
    #[command(visible_aliases = ["project", "proj"])]
    Projects,
    #[command(visible_aliases = ["task"])]
    Tasks,
    #[command(visible_aliases = ["tag"])]
    Tags,
    #[command(visible_aliases = ["path"])]
    Paths,
}

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    about = "Opens the configuration in $EDITOR, optionally at a task or project."
)]
pub(crate) struct EditArgs {
    #[command(subcommand)]
    pub(crate) what: Option<EditCommand>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum EditCommand {
    /// Jump to a task definition.
    Task { name: String },
    /// Jump to a project definition.
    Project { name: String },
}
