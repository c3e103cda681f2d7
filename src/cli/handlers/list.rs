// src/cli/handlers/list.rs

use crate::{
    cli::{
        GlobalOptions,
        args::{self, ListArgs, ListCommand},
        handlers::commons,
    },
    core::store::Config,
};
use anyhow::Result;
use colored::*;

/// The main handler for the `list` command.
pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<()> {
    let list_args: ListArgs = args::parse(&args);
    let config = commons::load_config(options)?;

    for line in list_lines(&config, list_args.what, list_args.names_only) {
        println!("{}", line);
    }
    Ok(())
}

fn list_lines(config: &Config, what: ListCommand, names_only: bool) -> Vec<String> {
    match what {
        ListCommand::Projects if names_only => config.project_names(),
        ListCommand::Tasks if names_only => config.task_names(),
        ListCommand::Projects => config
            .projects
            .iter()
            .map(|p| format!("{}  {}", p.name.cyan(), p.path.dimmed()))
            .collect(),
        ListCommand::Tasks => config
            .task_names_and_desc()
            .into_iter()
            .map(|line| match line.split_once('\t') {
                Some((name, desc)) if !desc.is_empty() => {
                    format!("{}  {}", name.cyan(), desc.dimmed())
                }
                Some((name, _)) => name.cyan().to_string(),
                None => line,
            })
            .collect(),
        ListCommand::Tags => config.tags(),
        ListCommand::Paths => config.paths(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::tests::{project, task};

    #[test]
    fn test_list_lines() {
        colored::control::set_override(false);
        let mut build = task("build", "make");
        build.desc = "Build it".to_string();
        let config = Config {
            projects: vec![project("api", "services/api", &["backend", "rust"])],
            tasks: vec![build, task("fmt", "cargo fmt")],
            ..Default::default()
        };

        assert_eq!(
            list_lines(&config, ListCommand::Projects, false),
            vec!["api  services/api"]
        );
        assert_eq!(
            list_lines(&config, ListCommand::Tasks, false),
            vec!["build  Build it", "fmt"]
        );
        assert_eq!(
            list_lines(&config, ListCommand::Tasks, true),
            vec!["build", "fmt"]
        );
        assert_eq!(list_lines(&config, ListCommand::Projects, true), vec!["api"]);
        assert_eq!(
            list_lines(&config, ListCommand::Tags, false),
            vec!["backend", "rust"]
        );
        assert_eq!(
            list_lines(&config, ListCommand::Paths, false),
            vec!["services/api"]
        );
    }
}
