// src/cli/handlers/describe.rs

use crate::{
    cli::{
        GlobalOptions,
        args::{self, DescribeArgs, DescribeCommand},
        handlers::commons,
    },
    core::filter::intersect_projects,
    models::{Project, Task},
};
use anyhow::Result;
use colored::*;

/// The main handler for the `describe` command.
pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<()> {
    let describe_args: DescribeArgs = args::parse(&args);
    let config = commons::load_config(options)?;

    match describe_args.what {
        DescribeCommand::Projects {
            names,
            tags,
            paths,
            tags_expr,
        } => {
            let mut projects = config.projects_by_names(&names)?;
            projects = intersect_projects(&projects, &config.projects_by_tags(&tags));
            projects = intersect_projects(&projects, &config.projects_by_paths(&paths));
            let expr = tags_expr.unwrap_or_default();
            projects = intersect_projects(&projects, &config.projects_by_tags_expr(&expr)?);

            for project in &projects {
                print_project(project);
            }
        }
        DescribeCommand::Tasks { names } => {
            for task in config.get_tasks_by_names(&names)? {
                print_task(&task);
            }
        }
    }
    Ok(())
}

fn field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("  {:<10} {}", label.blue(), value);
    }
}

fn print_project(project: &Project) {
    println!("\n--- {} ---", project.name.yellow());
    field("path:", &project.path);
    field("dir:", &project.dir.display().to_string());
    field("desc:", &project.desc);
    field("tags:", &project.value("tags"));
}

fn location(task: &Task) -> String {
    match task.context_line {
        Some(line) => format!("{}:{}", task.context.display(), line),
        None => task.context.display().to_string(),
    }
}

fn print_task(task: &Task) {
    println!("\n--- {} ---", task.name.yellow());
    field("desc:", &task.desc);
    field("file:", &location(task));
    field("shell:", &task.shell);
    field("spec:", &task.value("spec"));
    field("target:", &task.value("target"));
    field("theme:", &task.value("theme"));

    if !task.env.is_empty() {
        println!("  {}", "env:".blue());
        for entry in &task.env {
            println!("    {}", entry);
        }
    }

    if !task.cmd.is_empty() {
        println!("  {}", "cmd:".blue());
        for line in task.cmd.lines() {
            println!("    {}", line.green());
        }
    }

    if !task.commands.is_empty() {
        println!("  {}", "commands:".blue());
        for cmd in &task.commands {
            let label = if cmd.task_ref.is_empty() {
                cmd.name.clone()
            } else {
                format!("{} (task: {})", cmd.name, cmd.task_ref)
            };
            println!("    - {}", label.cyan());
            for line in cmd.cmd.lines() {
                println!("      {}", line.green());
            }
        }
    }
}
