use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    #[default]
    Favorite,
    Git,
    Svn,
    Mercurial,
    VsCode,
    Any,
}

impl ProjectKind {
    /// Canonical catalog order, also used for grouped headers.
    pub const ALL: [ProjectKind; 6] = [
        ProjectKind::Favorite,
        ProjectKind::Git,
        ProjectKind::Svn,
        ProjectKind::Mercurial,
        ProjectKind::VsCode,
        ProjectKind::Any,
    ];

    /// Kinds that are discovered by scanning rather than saved by hand.
    pub const SCANNED: [ProjectKind; 5] = [
        ProjectKind::Git,
        ProjectKind::Svn,
        ProjectKind::Mercurial,
        ProjectKind::VsCode,
        ProjectKind::Any,
    ];

    pub fn header(self) -> &'static str {
        match self {
            ProjectKind::Favorite => "Favorites",
            ProjectKind::Git => "Git Repositories",
            ProjectKind::Svn => "SVN Repositories",
            ProjectKind::Mercurial => "Mercurial Repositories",
            ProjectKind::VsCode => "VS Code Workspaces",
            ProjectKind::Any => "Other Projects",
        }
    }

    /// Position in [`ProjectKind::ALL`].
    pub fn rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectKind::Favorite => "favorites",
            ProjectKind::Git => "git",
            ProjectKind::Svn => "svn",
            ProjectKind::Mercurial => "mercurial",
            ProjectKind::VsCode => "vscode",
            ProjectKind::Any => "any",
        };
        f.write_str(s)
    }
}

/// A saved or discovered project.
///
/// The persisted shape is `{name, rootPath, tags, enabled}`; `kind` is
/// re-derived from whichever record set the entry was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub root_path: PathBuf,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(skip)]
    pub kind: ProjectKind,
}

fn enabled_by_default() -> bool {
    true
}

impl Project {
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>, kind: ProjectKind) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
            tags: Vec::new(),
            enabled: true,
            kind,
        }
    }

    /// Builds a project named after the last component of `dir`.
    pub fn from_dir(dir: &Path, kind: ProjectKind) -> Self {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.to_string_lossy().into_owned());
        Self::new(name, dir, kind)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns false if the tag was already present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }
}

/// One traversal job for a single project kind.
#[derive(Debug, Clone)]
pub struct ScanConfiguration {
    /// Base directories in scan order, already home-expanded.
    pub base_directories: Vec<PathBuf>,
    /// Exact directory names or single-segment glob patterns.
    pub ignore_names: Vec<String>,
    /// 0 evaluates only the base directories themselves. Negative is rejected.
    pub max_depth: i64,
    pub kind: ProjectKind,
    pub suppress_nested: bool,
    pub follow_symlinks: bool,
}

impl ScanConfiguration {
    pub fn new(kind: ProjectKind) -> Self {
        Self {
            base_directories: Vec::new(),
            ignore_names: Vec::new(),
            max_depth: 4,
            kind,
            suppress_nested: false,
            follow_symlinks: false,
        }
    }
}

/// Scan results per kind, as persisted between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCache {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub git: Vec<Project>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub svn: Vec<Project>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mercurial: Vec<Project>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vscode: Vec<Project>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any: Vec<Project>,
}

impl ProjectCache {
    /// The bucket for a scanned kind. Favorites have no bucket.
    pub fn bucket(&self, kind: ProjectKind) -> &[Project] {
        match kind {
            ProjectKind::Git => &self.git,
            ProjectKind::Svn => &self.svn,
            ProjectKind::Mercurial => &self.mercurial,
            ProjectKind::VsCode => &self.vscode,
            ProjectKind::Any => &self.any,
            ProjectKind::Favorite => &[],
        }
    }

    fn bucket_mut(&mut self, kind: ProjectKind) -> Option<&mut Vec<Project>> {
        match kind {
            ProjectKind::Git => Some(&mut self.git),
            ProjectKind::Svn => Some(&mut self.svn),
            ProjectKind::Mercurial => Some(&mut self.mercurial),
            ProjectKind::VsCode => Some(&mut self.vscode),
            ProjectKind::Any => Some(&mut self.any),
            ProjectKind::Favorite => None,
        }
    }

    pub fn set_bucket(&mut self, kind: ProjectKind, projects: Vec<Project>) {
        match self.bucket_mut(kind) {
            Some(bucket) => *bucket = projects,
            None => log::warn!("favorites are not cached; dropping {} entries", projects.len()),
        }
    }

    /// Re-derives each entry's kind from the bucket holding it.
    pub fn assign_kinds(&mut self) {
        for kind in ProjectKind::SCANNED {
            if let Some(bucket) = self.bucket_mut(kind) {
                bucket.iter_mut().for_each(|p| p.kind = kind);
            }
        }
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Project)) {
        for kind in ProjectKind::SCANNED {
            if let Some(bucket) = self.bucket_mut(kind) {
                bucket.iter_mut().for_each(&mut f);
            }
        }
    }

    pub fn len(&self) -> usize {
        ProjectKind::SCANNED
            .iter()
            .map(|k| self.bucket(*k).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How listings are ordered within each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Keep stored/discovered order.
    Saved,
    #[default]
    Name,
    Path,
}
