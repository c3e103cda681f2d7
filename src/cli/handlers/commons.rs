// src/cli/handlers/commons.rs

// Shared helpers used by several handlers.

use crate::{
    cli::GlobalOptions,
    core::{config_loader, errors, store::Config},
    models::{OutputFormat, Spec, TaskRun, Theme},
    system::executor::{self, ExecutionError, OutputMode, RunReport},
};
use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use rayon::prelude::*;
use std::env;
use std::path::PathBuf;

/// The configuration file named by `--config`, or the one discovered from the
/// current directory.
pub(crate) fn config_path(options: &GlobalOptions) -> Result<PathBuf> {
    match &options.config {
        Some(path) => Ok(path.clone()),
        None => {
            let cwd = env::current_dir().context("Could not read the current directory")?;
            Ok(config_loader::find_config(&cwd)?)
        }
    }
}

/// Loads the configuration and fails with the full report if any resource is broken.
pub(crate) fn load_config(options: &GlobalOptions) -> Result<Config> {
    let path = config_path(options)?;
    let (config, problems) = config_loader::load_config(&path)
        .with_context(|| format!("Failed to load configuration '{}'", path.display()))?;
    errors::check_errors(&problems)?;
    Ok(config)
}

/// Decides how the commands of a run are attached to the terminal.
fn output_mode(run: &TaskRun, spec: &Spec, theme: &Theme) -> OutputMode {
    let streams_directly = !spec.parallel
        && spec.output == OutputFormat::Stream
        && !theme.stream.prefix
        && !spec.omit_empty;
    if run.task.tty || streams_directly {
        OutputMode::Inherit
    } else {
        OutputMode::Capture
    }
}

fn execute_one(run: &TaskRun, spec: &Spec, theme: &Theme) -> Option<RunReport> {
    if spec.ignore_non_existing && !run.project.dir.is_dir() {
        log::warn!(
            "Skipping project '{}': '{}' does not exist.",
            run.project.name,
            run.project.dir.display()
        );
        return None;
    }

    let mode = output_mode(run, spec, theme);
    if mode == OutputMode::Inherit && theme.stream.header {
        println!("{}", header(&run.project.name));
    }
    Some(executor::execute_run(run, mode, spec.ignore_errors))
}

fn header(name: &str) -> String {
    format!("\n{} {}", "==>".cyan().bold(), name.bold())
}

fn print_stream(name: &str, report: &RunReport, theme: &Theme) {
    if theme.stream.header {
        println!("{}", header(name));
    }
    for line in report.output.lines() {
        if theme.stream.prefix {
            println!("{} {} {}", name.cyan(), "|".dimmed(), line);
        } else {
            println!("{}", line);
        }
    }
}

fn print_table(rows: &[(&str, &RunReport)]) {
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or_default();
    println!("{:<width$}  {}", "Project".bold(), "Output".bold(), width = width);
    for (name, report) in rows {
        let mut lines = report.output.lines();
        println!(
            "{:<width$}  {}",
            name.cyan(),
            lines.next().unwrap_or_default(),
            width = width
        );
        for line in lines {
            println!("{:<width$}  {}", "", line, width = width);
        }
    }
}

fn report_errors(name: &str, errors: &[ExecutionError]) {
    for error in errors {
        eprintln!("{} [{}] {}", "error".red().bold(), name.yellow(), error);
    }
}

/// Prints the plan as JSON instead of running it.
pub(crate) fn print_plan(runs: &[TaskRun]) -> Result<()> {
    let json = serde_json::to_string_pretty(runs).context("Failed to serialize the plan")?;
    println!("{}", json);
    Ok(())
}

/// Executes a plan according to the spec and theme of its task.
///
/// Projects run sequentially, or on a pool of `spec.forks` workers when
/// `spec.parallel` is set. Output of each project is printed in plan order.
pub(crate) fn execute_plan(runs: &[TaskRun]) -> Result<()> {
    let Some(first) = runs.first() else {
        return Ok(());
    };
    let spec = &first.task.spec_data;
    let theme = &first.task.theme_data;
    if !theme.color {
        colored::control::set_override(false);
    }

    let reports: Vec<Option<RunReport>> = if spec.parallel {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(spec.forks.max(1))
            .build()
            .context("Failed to start the worker pool")?;
        pool.install(|| {
            runs.par_iter()
                .map(|run| execute_one(run, spec, theme))
                .collect()
        })
    } else {
        runs.iter().map(|run| execute_one(run, spec, theme)).collect()
    };

    let mut failed = 0;
    let mut table_rows = Vec::new();
    for (run, report) in runs.iter().zip(&reports) {
        let Some(report) = report else {
            continue;
        };
        if !report.succeeded() {
            failed += 1;
        }
        if spec.omit_empty && report.output.trim().is_empty() {
            report_errors(&run.project.name, &report.errors);
            continue;
        }
        match spec.output {
            OutputFormat::Table => table_rows.push((run.project.name.as_str(), report)),
            OutputFormat::Stream => {
                if !report.output.is_empty() {
                    print_stream(&run.project.name, report, theme);
                }
            }
        }
        report_errors(&run.project.name, &report.errors);
    }
    if !table_rows.is_empty() {
        print_table(&table_rows);
    }

    if failed > 0 && !spec.ignore_errors {
        return Err(anyhow!(
            "{} of {} project(s) failed.",
            failed,
            reports.iter().flatten().count()
        ));
    }
    Ok(())
}
