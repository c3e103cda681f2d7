//! # Project Filter
//!
//! Selects projects from the configuration. Filtering modes are mutually
//! exclusive and checked in order:
//!
//! 1. `all`: every project.
//! 2. `cwd`: the project containing the current directory (longest match).
//! 3. Otherwise names ∩ paths ∩ tags ∩ tag expression, where an empty criterion
//!    selects every project.
//!
//! Results always keep the load order of the projects.

use crate::{
    core::{errors::ResolveError, store::Config, tag_expr::TagExpr},
    models::{Project, ResourceKind, Target},
};
use std::collections::HashSet;
use std::env;
use std::path::{Component, Path, PathBuf};

/// Keeps the members of `a` that are also in `b`, compared by name.
///
/// The order of `a` is preserved and duplicate names are dropped.
pub(crate) fn intersect_projects(a: &[Project], b: &[Project]) -> Vec<Project> {
    let in_b: HashSet<&str> = b.iter().map(|p| p.name.as_str()).collect();
    let mut seen = HashSet::new();
    a.iter()
        .filter(|p| in_b.contains(p.name.as_str()) && seen.insert(p.name.as_str()))
        .cloned()
        .collect()
}

/// Removes `.` components and trailing separators so `./api/` matches `api`.
fn normalize(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

impl Config {
    /// Filters projects with the criteria of a target, relative to the process's
    /// current directory.
    pub(crate) fn filter_projects(&self, target: &Target) -> Result<Vec<Project>, ResolveError> {
        let cwd = if target.cwd && !target.all {
            env::current_dir().ok()
        } else {
            None
        };
        self.filter_projects_at(target, cwd.as_deref())
    }

    /// Same as [`Config::filter_projects`], with an explicit working directory.
    pub(crate) fn filter_projects_at(
        &self,
        target: &Target,
        cwd: Option<&Path>,
    ) -> Result<Vec<Project>, ResolveError> {
        if target.all {
            return Ok(self.projects.clone());
        }

        if target.cwd {
            return Ok(match cwd {
                Some(dir) => self.projects_by_cwd(dir),
                None => Vec::new(),
            });
        }

        let mut projects = self.projects_by_names(&target.projects)?;
        projects = intersect_projects(&projects, &self.projects_by_paths(&target.paths));
        projects = intersect_projects(&projects, &self.projects_by_tags(&target.tags));
        projects = intersect_projects(&projects, &self.projects_by_tags_expr(&target.tags_expr)?);

        log::debug!(
            "Filter selected {} of {} projects.",
            projects.len(),
            self.projects.len()
        );
        Ok(projects)
    }

    /// Projects with the given names; every project when `names` is empty.
    pub(crate) fn projects_by_names(&self, names: &[String]) -> Result<Vec<Project>, ResolveError> {
        if names.is_empty() {
            return Ok(self.projects.clone());
        }

        let mut missing: Vec<String> = Vec::new();
        for name in names {
            if !self.projects.iter().any(|p| &p.name == name) && !missing.contains(name) {
                missing.push(name.clone());
            }
        }
        if !missing.is_empty() {
            return Err(ResolveError::NotFound {
                kind: ResourceKind::Project,
                names: missing,
            });
        }

        Ok(self
            .projects
            .iter()
            .filter(|p| names.contains(&p.name))
            .cloned()
            .collect())
    }

    /// Projects whose relative path or absolute directory lies under one of `paths`.
    /// Every project when `paths` is empty.
    pub(crate) fn projects_by_paths(&self, paths: &[String]) -> Vec<Project> {
        if paths.is_empty() {
            return self.projects.clone();
        }

        let prefixes: Vec<PathBuf> = paths.iter().map(|p| normalize(p)).collect();

        self.projects
            .iter()
            .filter(|p| {
                let rel = normalize(&p.path);
                prefixes
                    .iter()
                    .any(|prefix| rel.starts_with(prefix) || p.dir.starts_with(prefix))
            })
            .cloned()
            .collect()
    }

    /// Projects carrying at least one of `tags`; every project when `tags` is empty.
    pub(crate) fn projects_by_tags(&self, tags: &[String]) -> Vec<Project> {
        if tags.is_empty() {
            return self.projects.clone();
        }
        self.projects
            .iter()
            .filter(|p| tags.iter().any(|t| p.has_tag(t)))
            .cloned()
            .collect()
    }

    /// Projects matching a tag expression; every project when `expr` is blank.
    pub(crate) fn projects_by_tags_expr(&self, expr: &str) -> Result<Vec<Project>, ResolveError> {
        if expr.trim().is_empty() {
            return Ok(self.projects.clone());
        }
        let parsed = TagExpr::parse(expr)?;
        Ok(self
            .projects
            .iter()
            .filter(|p| parsed.matches(&p.tags))
            .cloned()
            .collect())
    }

    /// The project(s) whose directory is the closest ancestor of (or equal to) `cwd`.
    pub(crate) fn projects_by_cwd(&self, cwd: &Path) -> Vec<Project> {
        let cwd = dunce::canonicalize(cwd).unwrap_or_else(|_| cwd.to_path_buf());

        let candidates: Vec<&Project> = self
            .projects
            .iter()
            .filter(|p| cwd.starts_with(&p.dir))
            .collect();

        let Some(longest) = candidates.iter().map(|p| p.dir.components().count()).max() else {
            return Vec::new();
        };

        candidates
            .into_iter()
            .filter(|p| p.dir.components().count() == longest)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::tests::project;

    fn names(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.name.as_str()).collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn config() -> Config {
        Config {
            projects: vec![
                project("api", "services/api", &["backend", "rust"]),
                project("web", "frontend/web", &["frontend"]),
                project("worker", "services/worker", &["backend"]),
                project("docs", "docs", &[]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_target_selects_everything_in_load_order() {
        let config = config();
        let projects = config.filter_projects_at(&Target::default(), None).unwrap();
        assert_eq!(names(&projects), vec!["api", "web", "worker", "docs"]);
    }

    #[test]
    fn test_all_wins_over_other_criteria() {
        let config = config();
        let target = Target {
            all: true,
            cwd: true,
            tags: strings(&["frontend"]),
            ..Default::default()
        };
        let projects = config.filter_projects_at(&target, None).unwrap();
        assert_eq!(projects.len(), 4);
    }

    #[test]
    fn test_tags_are_or_semantics() {
        let config = config();
        let selected = config.projects_by_tags(&strings(&["frontend", "rust"]));
        assert_eq!(names(&selected), vec!["api", "web"]);

        // Membership holds exactly for projects that share a tag.
        for p in &config.projects {
            let shares = p.tags.iter().any(|t| t == "frontend" || t == "rust");
            assert_eq!(selected.iter().any(|s| s.name == p.name), shares);
        }
    }

    #[test]
    fn test_criteria_are_intersected() {
        let config = config();
        let target = Target {
            paths: strings(&["services"]),
            tags_expr: "!rust".to_string(),
            ..Default::default()
        };
        let projects = config.filter_projects_at(&target, None).unwrap();
        assert_eq!(names(&projects), vec!["worker"]);
    }

    #[test]
    fn test_names_keep_load_order() {
        let config = config();
        let target = Target {
            projects: strings(&["docs", "api"]),
            ..Default::default()
        };
        let projects = config.filter_projects_at(&target, None).unwrap();
        assert_eq!(names(&projects), vec!["api", "docs"]);
    }

    #[test]
    fn test_unknown_names_are_reported_together() {
        let config = config();
        let target = Target {
            projects: strings(&["web", "nonexistent", "ghost", "nonexistent"]),
            ..Default::default()
        };
        let result = config.filter_projects_at(&target, None);
        assert!(matches!(
            result,
            Err(ResolveError::NotFound { kind: ResourceKind::Project, ref names })
                if names == &["nonexistent", "ghost"]
        ));
    }

    #[test]
    fn test_unknown_paths_and_tags_match_nothing() {
        let config = config();
        assert!(config.projects_by_paths(&strings(&["nowhere"])).is_empty());
        assert!(config.projects_by_tags(&strings(&["nope"])).is_empty());
        assert!(config.projects_by_tags_expr("nope").unwrap().is_empty());
    }

    #[test]
    fn test_paths_are_component_prefixes() {
        let config = config();
        assert_eq!(
            names(&config.projects_by_paths(&strings(&["./services/"]))),
            vec!["api", "worker"]
        );
        // "front" is not a path component of "frontend/web".
        assert!(config.projects_by_paths(&strings(&["front"])).is_empty());
        assert_eq!(
            names(&config.projects_by_paths(&strings(&["/work/frontend"]))),
            vec!["web"]
        );
        assert_eq!(
            config.projects_by_paths(&strings(&["."])).len(),
            config.projects.len()
        );
    }

    #[test]
    fn test_invalid_tag_expression_fails() {
        let config = config();
        let target = Target {
            tags_expr: "backend &&".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.filter_projects_at(&target, None),
            Err(ResolveError::TagExpr { .. })
        ));
    }

    #[test]
    fn test_cwd_picks_longest_prefix() {
        let mut config = config();
        config.projects.push(project("services", "services", &[]));

        let target = Target {
            cwd: true,
            ..Default::default()
        };
        let nested = Path::new("/work/services/api/src");
        let projects = config.filter_projects_at(&target, Some(nested)).unwrap();
        assert_eq!(names(&projects), vec!["api"]);

        let parent = Path::new("/work/services/other");
        let projects = config.filter_projects_at(&target, Some(parent)).unwrap();
        assert_eq!(names(&projects), vec!["services"]);

        let outside = Path::new("/elsewhere");
        assert!(config.filter_projects_at(&target, Some(outside)).unwrap().is_empty());
    }

    #[test]
    fn test_intersection_properties() {
        let config = config();
        let a = config.projects.clone();
        let b = config.projects_by_tags(&strings(&["backend"]));

        assert_eq!(intersect_projects(&a, &a), a);

        let ab: HashSet<String> = intersect_projects(&a, &b).into_iter().map(|p| p.name).collect();
        let ba: HashSet<String> = intersect_projects(&b, &a).into_iter().map(|p| p.name).collect();
        assert_eq!(ab, ba);

        let reversed: Vec<Project> = a.iter().rev().cloned().collect();
        assert_eq!(
            names(&intersect_projects(&reversed, &b)),
            vec!["worker", "api"]
        );

        let mut doubled = b.clone();
        doubled.extend(b.clone());
        assert_eq!(intersect_projects(&doubled, &a).len(), b.len());
    }
}
