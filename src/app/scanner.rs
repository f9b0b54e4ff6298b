use crate::app::classifier::is_project_root;
use crate::app::dedup::deduplicate_names;
use crate::app::error::ScanError;
use crate::app::models::{Project, ScanConfiguration};
use crate::app::sink::ErrorSink;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The one dot-directory that is still descended into.
const VSCODE_DIR: &str = ".vscode";

/// Walks the base directories of one [`ScanConfiguration`] and collects the
/// project roots of its kind.
pub struct Scanner {
    config: ScanConfiguration,
    max_depth: usize,
    ignore: IgnoreMatcher,
}

impl Scanner {
    /// Validates the configuration. A negative depth is the only fatal error.
    pub fn new(config: ScanConfiguration) -> Result<Self, ScanError> {
        let max_depth =
            usize::try_from(config.max_depth).map_err(|_| ScanError::InvalidConfiguration {
                message: format!(
                    "max depth must be a non-negative integer, got {}",
                    config.max_depth
                ),
            })?;
        let ignore = IgnoreMatcher::new(&config.ignore_names);

        Ok(Self {
            config,
            max_depth,
            ignore,
        })
    }

    pub fn config(&self) -> &ScanConfiguration {
        &self.config
    }

    /// Runs the job to completion. Filesystem problems go to `sink` and only
    /// prune the affected branch.
    ///
    /// The result is de-duplicated by root path (first base directory wins)
    /// and then by name. Sibling order follows the platform's directory
    /// listing order, which is not guaranteed to be stable.
    pub fn scan(&self, sink: &dyn ErrorSink) -> Vec<Project> {
        let mut projects = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        for base in &self.config.base_directories {
            if let Err(err) = fs::metadata(base) {
                if err.kind() == io::ErrorKind::NotFound {
                    sink.report(ScanError::NotFound { path: base.clone() });
                    continue;
                }
            }

            let mut found = Vec::new();
            self.scan_dir(base, 0, false, sink, &mut found);
            log::debug!(
                "{}: {} candidate(s) under {}",
                self.config.kind,
                found.len(),
                base.display()
            );

            for project in found {
                if seen.insert(project.root_path.clone()) {
                    projects.push(project);
                }
            }
        }

        deduplicate_names(&mut projects);
        projects
    }

    fn scan_dir(
        &self,
        dir: &Path,
        depth: usize,
        inside_project: bool,
        sink: &dyn ErrorSink,
        out: &mut Vec<Project>,
    ) {
        if depth > self.max_depth {
            return;
        }
        log::trace!("visiting {} at depth {}", dir.display(), depth);

        let mut inside_project = inside_project;
        if is_project_root(dir, self.config.kind) {
            if !self.config.suppress_nested || !inside_project {
                log::debug!("found {} project at {}", self.config.kind, dir.display());
                out.push(Project::from_dir(dir, self.config.kind));
            }
            // Descendants are inside a project even when this match was suppressed.
            inside_project = true;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                sink.report(ScanError::unreadable(dir, err));
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    sink.report(ScanError::unreadable(dir, err));
                    continue;
                }
            };
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(err) => {
                    sink.report(ScanError::unreadable(entry.path(), err));
                    continue;
                }
            };
            if !file_type.is_dir() && !file_type.is_symlink() {
                continue;
            }

            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') && name != VSCODE_DIR {
                continue;
            }
            if self.ignore.is_ignored(&name) {
                log::trace!("ignoring {}", entry.path().display());
                continue;
            }

            let mut child = entry.path();
            if file_type.is_symlink() {
                if !self.config.follow_symlinks {
                    continue;
                }
                child = match fs::canonicalize(&child) {
                    Ok(target) => target,
                    Err(err) => {
                        sink.report(ScanError::symlink_resolution(&child, err));
                        continue;
                    }
                };
                if !child.is_dir() {
                    continue;
                }
            }

            self.scan_dir(&child, depth + 1, inside_project, sink, out);
        }
    }
}

/// Directory-name filter: exact names plus single-segment globs.
struct IgnoreMatcher {
    exact: HashSet<String>,
    globs: GlobSet,
}

impl IgnoreMatcher {
    fn new(names: &[String]) -> Self {
        let mut exact = HashSet::new();
        let mut patterns = Vec::new();

        for name in names {
            if is_glob(name) {
                patterns.push(name.as_str());
            } else {
                exact.insert(name.clone());
            }
        }

        let globs = build_globset(&patterns, &mut exact);
        Self { exact, globs }
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.exact.contains(name) || self.globs.is_match(name)
    }
}

fn is_glob(name: &str) -> bool {
    name.contains(['*', '?', '['])
}

/// Patterns that fail to compile fall back to exact-name comparison.
fn build_globset(patterns: &[&str], exact: &mut HashSet<String>) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        match GlobBuilder::new(pat).literal_separator(true).build() {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => {
                log::warn!("invalid ignore pattern {:?}: {}", pat, err);
                exact.insert(pat.to_string());
            }
        }
    }
    builder.build().unwrap_or_else(|err| {
        log::warn!("failed to compile ignore patterns: {}", err);
        GlobSet::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::error::ScanErrorKind;
    use crate::app::models::ProjectKind;
    use crate::app::sink::CollectingSink;
    use tempfile::TempDir;

    fn mkdirs(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    fn git_config(bases: &[&Path], max_depth: i64) -> ScanConfiguration {
        let mut config = ScanConfiguration::new(ProjectKind::Git);
        config.base_directories = bases.iter().map(|p| p.to_path_buf()).collect();
        config.max_depth = max_depth;
        config
    }

    fn scan(config: ScanConfiguration) -> (Vec<Project>, Vec<ScanError>) {
        let sink = CollectingSink::new();
        let projects = Scanner::new(config).unwrap().scan(&sink);
        (projects, sink.into_reports())
    }

    fn roots(projects: &[Project]) -> Vec<PathBuf> {
        projects.iter().map(|p| p.root_path.clone()).collect()
    }

    #[test]
    fn test_finds_git_repositories() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "one/.git");
        mkdirs(t, "group/two/.git");
        mkdirs(t, "plain/src");

        let (projects, errors) = scan(git_config(&[t], 4));
        let mut found = roots(&projects);
        found.sort();
        assert_eq!(found, vec![t.join("group/two"), t.join("one")]);
        assert!(errors.is_empty());

        let one = projects.iter().find(|p| p.name == "one").unwrap();
        assert_eq!(one.kind, ProjectKind::Git);
        assert!(one.enabled);
        assert!(one.tags.is_empty());
    }

    #[test]
    fn test_other_vcs_kinds() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "svnrepo/.svn");
        mkdirs(t, "hgrepo/.hg");

        let mut config = git_config(&[t], 2);
        config.kind = ProjectKind::Svn;
        let (projects, _) = scan(config.clone());
        assert_eq!(roots(&projects), vec![t.join("svnrepo")]);

        config.kind = ProjectKind::Mercurial;
        let (projects, _) = scan(config);
        assert_eq!(roots(&projects), vec![t.join("hgrepo")]);
    }

    #[test]
    fn test_vscode_workspaces_inside_dot_vscode() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let ws = mkdirs(t, "app");
        fs::write(ws.join("app.code-workspace"), "{}").unwrap();
        let inner = mkdirs(t, "other/.vscode");
        fs::write(inner.join("x.code-workspace"), "{}").unwrap();
        let hidden = mkdirs(t, "other/.idea");
        fs::write(hidden.join("y.code-workspace"), "{}").unwrap();

        let mut config = git_config(&[t], 4);
        config.kind = ProjectKind::VsCode;
        let (projects, _) = scan(config);
        let mut found = roots(&projects);
        found.sort();
        assert_eq!(found, vec![t.join("app"), t.join("other/.vscode")]);
    }

    #[test]
    fn test_depth_bound() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "a/b/c/.git");

        let (projects, _) = scan(git_config(&[t], 4));
        assert_eq!(roots(&projects), vec![t.join("a/b/c")]);

        let (projects, _) = scan(git_config(&[t], 3));
        assert_eq!(roots(&projects), vec![t.join("a/b/c")]);

        let (projects, _) = scan(git_config(&[t], 2));
        assert!(projects.is_empty());
    }

    #[test]
    fn test_depth_zero_scans_only_base() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, ".git");
        mkdirs(t, "child/.git");

        let (projects, _) = scan(git_config(&[t], 0));
        assert_eq!(roots(&projects), vec![t.to_path_buf()]);
    }

    #[test]
    fn test_negative_depth_is_rejected() {
        let temp = TempDir::new().unwrap();
        let result = Scanner::new(git_config(&[temp.path()], -1));
        match result {
            Err(err) => assert_eq!(err.kind(), ScanErrorKind::InvalidConfiguration),
            Ok(_) => panic!("negative depth accepted"),
        }
    }

    #[test]
    fn test_nested_projects() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "p/.git");
        mkdirs(t, "p/sub/.git");

        let (projects, _) = scan(git_config(&[t], 4));
        let mut found = roots(&projects);
        found.sort();
        assert_eq!(found, vec![t.join("p"), t.join("p/sub")]);

        let mut config = git_config(&[t], 4);
        config.suppress_nested = true;
        let (projects, _) = scan(config);
        assert_eq!(roots(&projects), vec![t.join("p")]);
    }

    #[test]
    fn test_suppression_state_propagates_past_suppressed_match() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "p/.git");
        mkdirs(t, "p/mid/.git");
        mkdirs(t, "p/mid/leaf/.git");

        let mut config = git_config(&[t], 4);
        config.suppress_nested = true;
        let (projects, _) = scan(config);
        assert_eq!(roots(&projects), vec![t.join("p")]);
    }

    #[test]
    fn test_ignored_names_and_globs() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "node_modules/dep/.git");
        mkdirs(t, "build-cache/x/.git");
        mkdirs(t, "keep/.git");
        mkdirs(t, "keep/node_modules/inner/.git");

        let mut config = git_config(&[t], 4);
        config.ignore_names = vec!["node_modules".into(), "build-*".into()];
        let (projects, _) = scan(config);
        assert_eq!(roots(&projects), vec![t.join("keep")]);
    }

    #[test]
    fn test_ignore_matches_base_name_only() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "work/tests/.git");

        let mut config = git_config(&[t], 4);
        config.ignore_names = vec!["work/*".into(), "test".into()];
        let (projects, _) = scan(config);
        assert_eq!(roots(&projects), vec![t.join("work/tests")]);
    }

    #[test]
    fn test_skips_hidden_directories() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, ".hidden/repo/.git");
        mkdirs(t, "visible/.git");

        let (projects, _) = scan(git_config(&[t], 4));
        assert_eq!(roots(&projects), vec![t.join("visible")]);
    }

    #[test]
    fn test_missing_base_is_reported_and_skipped() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "repo/.git");
        let missing = t.join("missing");

        let (projects, errors) = scan(git_config(&[missing.as_path(), t], 4));
        assert_eq!(roots(&projects), vec![t.join("repo")]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ScanErrorKind::NotFound);
        assert_eq!(errors[0].path(), Some(missing.as_path()));
    }

    #[test]
    fn test_only_missing_base_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let (projects, errors) = scan(git_config(&[missing.as_path()], 4));
        assert!(projects.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_overlapping_bases_deduplicate_by_path() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "outer/repo/.git");
        let outer = t.join("outer");

        let (projects, _) = scan(git_config(&[outer.as_path(), t], 4));
        assert_eq!(roots(&projects), vec![t.join("outer/repo")]);
        assert_eq!(projects[0].name, "repo");
    }

    #[test]
    fn test_duplicate_names_get_suffixes_in_base_order() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "x/api/.git");
        mkdirs(t, "y/api/.git");
        let x = t.join("x");
        let y = t.join("y");

        let (projects, _) = scan(git_config(&[x.as_path(), y.as_path()], 2));
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "api");
        assert_eq!(projects[0].root_path, x.join("api"));
        assert_eq!(projects[1].name, "api-2");
        assert_eq!(projects[1].root_path, y.join("api"));
    }

    #[test]
    fn test_any_kind_emits_every_directory() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "a/b");

        let mut config = git_config(&[t], 1);
        config.kind = ProjectKind::Any;
        let (projects, _) = scan(config);
        let mut found = roots(&projects);
        found.sort();
        assert_eq!(found, vec![t.to_path_buf(), t.join("a")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_skipped_unless_followed() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let target = mkdirs(t, "elsewhere/linked");
        mkdirs(t, "elsewhere/linked/.git");
        let base = mkdirs(t, "base");
        std::os::unix::fs::symlink(&target, base.join("link")).unwrap();

        let (projects, _) = scan(git_config(&[base.as_path()], 3));
        assert!(projects.is_empty());

        let mut config = git_config(&[base.as_path()], 3);
        config.follow_symlinks = true;
        let (projects, errors) = scan(config);
        assert!(errors.is_empty());
        assert_eq!(roots(&projects), vec![fs::canonicalize(&target).unwrap()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_reported() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let base = mkdirs(t, "base");
        mkdirs(t, "base/repo/.git");
        std::os::unix::fs::symlink(t.join("gone"), base.join("dangling")).unwrap();

        let mut config = git_config(&[base.as_path()], 3);
        config.follow_symlinks = true;
        let (projects, errors) = scan(config);
        assert_eq!(roots(&projects), vec![base.join("repo")]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ScanErrorKind::SymlinkResolution);
        assert_eq!(errors[0].path(), Some(base.join("dangling").as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_bounded_by_depth() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let base = mkdirs(t, "base");
        mkdirs(t, "base/repo/.git");
        std::os::unix::fs::symlink(&base, base.join("repo/loop")).unwrap();

        let mut config = git_config(&[base.as_path()], 6);
        config.follow_symlinks = true;
        let (projects, _) = scan(config);
        let canonical = fs::canonicalize(&base).unwrap().join("repo");
        assert!(projects.len() <= 2);
        assert!(projects
            .iter()
            .any(|p| p.root_path == base.join("repo") || p.root_path == canonical));
    }

    #[test]
    fn test_base_that_is_a_file_is_unreadable() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "not a folder").unwrap();

        let (projects, errors) = scan(git_config(&[file.as_path()], 4));
        assert!(projects.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ScanErrorKind::Unreadable);
        assert_eq!(errors[0].path(), Some(file.as_path()));
    }

    #[test]
    fn test_ignored_dot_vscode_is_skipped() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let inner = mkdirs(t, "app/.vscode");
        fs::write(inner.join("app.code-workspace"), "{}").unwrap();

        let mut config = git_config(&[t], 4);
        config.kind = ProjectKind::VsCode;
        config.ignore_names = vec![".vscode".into()];
        let (projects, errors) = scan(config);
        assert!(projects.is_empty());
        assert!(errors.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_at_depth_limit_is_still_listed() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let a = mkdirs(t, "a");
        std::os::unix::fs::symlink(t.join("gone"), a.join("dangling")).unwrap();

        let mut config = git_config(&[t], 1);
        config.follow_symlinks = true;
        let (projects, errors) = scan(config);
        assert!(projects.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ScanErrorKind::SymlinkResolution);
        assert_eq!(errors[0].path(), Some(a.join("dangling").as_path()));
    }

    #[test]
    fn test_scans_are_repeatable() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        mkdirs(t, "r1/.git");
        mkdirs(t, "r2/.git");

        let scanner = Scanner::new(git_config(&[t], 2)).unwrap();
        let sink = CollectingSink::new();
        assert_eq!(scanner.scan(&sink), scanner.scan(&sink));
        assert!(sink.is_empty());
    }
}
