//! Marker-based project root detection.

use crate::app::models::ProjectKind;
use std::fs;
use std::path::Path;

const VSCODE_WORKSPACE_SUFFIX: &str = ".code-workspace";

/// Returns true when `dir` is a project root of the given kind.
///
/// Only direct children are inspected and links are not followed. A
/// directory that cannot be listed does not qualify.
pub fn is_project_root(dir: &Path, kind: ProjectKind) -> bool {
    match kind {
        ProjectKind::Git => has_marker_dir(dir, ".git"),
        ProjectKind::Svn => has_marker_dir(dir, ".svn"),
        ProjectKind::Mercurial => has_marker_dir(dir, ".hg"),
        ProjectKind::VsCode => has_workspace_file(dir),
        ProjectKind::Any => true,
        ProjectKind::Favorite => false,
    }
}

fn has_marker_dir(dir: &Path, marker: &str) -> bool {
    fs::symlink_metadata(dir.join(marker))
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

fn has_workspace_file(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };

    entries.flatten().any(|entry| {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        !is_dir
            && entry
                .file_name()
                .to_string_lossy()
                .ends_with(VSCODE_WORKSPACE_SUFFIX)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_vcs_markers() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join(".git")).unwrap();
        fs::create_dir(root.join(".hg")).unwrap();

        assert!(is_project_root(root, ProjectKind::Git));
        assert!(is_project_root(root, ProjectKind::Mercurial));
        assert!(!is_project_root(root, ProjectKind::Svn));
    }

    #[test]
    fn test_marker_must_be_a_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".git"), "gitdir: ../x").unwrap();
        assert!(!is_project_root(temp.path(), ProjectKind::Git));
    }

    #[test]
    fn test_vscode_workspace_file() {
        let temp = TempDir::new().unwrap();
        assert!(!is_project_root(temp.path(), ProjectKind::VsCode));

        fs::create_dir(temp.path().join("dir.code-workspace")).unwrap();
        assert!(!is_project_root(temp.path(), ProjectKind::VsCode));

        fs::write(temp.path().join("app.code-workspace"), "{}").unwrap();
        assert!(is_project_root(temp.path(), ProjectKind::VsCode));
    }

    #[test]
    fn test_any_and_favorite() {
        let temp = TempDir::new().unwrap();
        assert!(is_project_root(temp.path(), ProjectKind::Any));
        assert!(!is_project_root(temp.path(), ProjectKind::Favorite));
    }

    #[test]
    fn test_missing_directory_does_not_qualify() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        assert!(!is_project_root(&missing, ProjectKind::Git));
        assert!(!is_project_root(&missing, ProjectKind::VsCode));
    }
}
