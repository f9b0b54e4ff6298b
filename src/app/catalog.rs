//! Merging favorites with cached scan results into one indexed listing.

use crate::app::error::SelectionError;
use crate::app::models::{Project, ProjectCache, ProjectKind, SortOrder};
use std::collections::HashSet;
use std::path::PathBuf;

/// What a caller wants to see in a catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Kinds to include. Empty means all of them.
    pub kinds: Vec<ProjectKind>,
    /// Keep disabled entries too.
    pub include_disabled: bool,
    /// Required tag. `None` or an empty string disables the check.
    pub tag: Option<String>,
}

impl CatalogFilter {
    pub fn wants_kind(&self, kind: ProjectKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }

    fn accepts(&self, project: &Project) -> bool {
        if !self.include_disabled && !project.enabled {
            return false;
        }
        match self.tag.as_deref() {
            Some(tag) if !tag.is_empty() => project.has_tag(tag),
            _ => true,
        }
    }
}

/// Builds a catalog: favorites first, then each scanned kind in canonical
/// order, keeping the input order within a kind.
///
/// Inputs are only read; entries are copied with their kind set from the
/// list they came from. A root path appears at most once per kind; the
/// first occurrence wins.
pub fn merge(
    favorites: &[Project],
    cache: &ProjectCache,
    filter: &CatalogFilter,
) -> CatalogSnapshot {
    let mut entries = Vec::new();
    let mut seen: HashSet<(ProjectKind, PathBuf)> = HashSet::new();

    for kind in ProjectKind::ALL {
        if !filter.wants_kind(kind) {
            continue;
        }
        let source = match kind {
            ProjectKind::Favorite => favorites,
            other => cache.bucket(other),
        };
        for p in source.iter().filter(|p| filter.accepts(p)) {
            if !seen.insert((kind, p.root_path.clone())) {
                log::debug!("skipping repeated {} entry {}", kind, p.root_path.display());
                continue;
            }
            entries.push(Project {
                kind,
                ..p.clone()
            });
        }
    }

    CatalogSnapshot { entries }
}

/// An ordered catalog with 1-based positions for selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    entries: Vec<Project>,
}

impl CatalogSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Project> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by its 1-based position.
    pub fn get(&self, index: usize) -> Option<&Project> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Reorders entries inside each kind group. Groups keep their canonical order.
    pub fn sort(&mut self, order: SortOrder) {
        match order {
            SortOrder::Saved => {}
            SortOrder::Name => self.entries.sort_by(|a, b| {
                a.kind
                    .rank()
                    .cmp(&b.kind.rank())
                    .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            }),
            SortOrder::Path => self.entries.sort_by(|a, b| {
                let a_path = a.root_path.to_string_lossy().to_lowercase();
                let b_path = b.root_path.to_string_lossy().to_lowercase();
                a.kind.rank().cmp(&b.kind.rank()).then_with(|| a_path.cmp(&b_path))
            }),
        }
    }

    /// Consecutive runs of entries sharing a kind, in catalog order.
    pub fn groups(&self) -> Vec<(ProjectKind, &[Project])> {
        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..=self.entries.len() {
            if i == self.entries.len() || self.entries[i].kind != self.entries[start].kind {
                groups.push((self.entries[start].kind, &self.entries[start..i]));
                start = i;
            }
        }
        groups
    }

    /// Resolves a user selection: a 1-based number, an exact name
    /// (case-insensitive), or a unique case-insensitive substring.
    pub fn resolve(&self, selector: &str) -> Result<&Project, SelectionError> {
        if self.entries.is_empty() {
            return Err(SelectionError::Empty);
        }
        let selector = selector.trim();

        if let Ok(index) = selector.parse::<usize>() {
            return self.get(index).ok_or(SelectionError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }

        let needle = selector.to_lowercase();
        if let Some(exact) = self.entries.iter().find(|p| p.name.to_lowercase() == needle) {
            return Ok(exact);
        }

        let matches: Vec<&Project> = self
            .entries
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();
        match matches.as_slice() {
            [] => Err(SelectionError::NotFound(selector.to_string())),
            [only] => Ok(*only),
            many => Err(SelectionError::Ambiguous {
                selector: selector.to_string(),
                candidates: many.iter().map(|p| p.name.clone()).collect(),
            }),
        }
    }
}
