use crate::app::models::{ProjectKind, ScanConfiguration, SortOrder};
use crate::app::paths::{absolute, expand};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const COMMON_IGNORED: [&str; 4] = ["node_modules", "out", "typings", "test"];

/// Scan settings for one project kind.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct KindSettings {
    pub base_folders: Vec<String>,
    pub ignored_folders: Vec<String>,
    pub max_depth: i64,
}

impl KindSettings {
    fn with_ignored(extra: &[&str]) -> Self {
        Self {
            base_folders: Vec::new(),
            ignored_folders: COMMON_IGNORED
                .iter()
                .chain(extra)
                .map(|s| s.to_string())
                .collect(),
            max_depth: 4,
        }
    }
}

impl Default for KindSettings {
    fn default() -> Self {
        Self::with_ignored(&[])
    }
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Settings {
    pub sort_list: SortOrder,
    pub group_list: bool,
    pub check_invalid_paths: bool,
    pub cache_projects_between_sessions: bool,
    pub ignore_projects_within_projects: bool,
    pub support_symlinks: bool,
    pub show_colors: bool,
    pub editor: String,
    pub open_in_new_window: bool,
    pub projects_location: Option<String>,
    pub tags: Vec<String>,
    pub git: KindSettings,
    pub svn: KindSettings,
    pub mercurial: KindSettings,
    pub vscode: KindSettings,
    pub any: KindSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sort_list: SortOrder::Name,
            group_list: true,
            check_invalid_paths: true,
            cache_projects_between_sessions: true,
            ignore_projects_within_projects: false,
            support_symlinks: false,
            show_colors: true,
            editor: default_editor(),
            open_in_new_window: false,
            projects_location: None,
            tags: vec!["Personal".to_string(), "Work".to_string()],
            git: KindSettings::with_ignored(&[".haxelib", "vendor"]),
            svn: KindSettings::default(),
            mercurial: KindSettings::with_ignored(&[".haxelib"]),
            vscode: KindSettings::default(),
            any: KindSettings::default(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ScanOverrides {
    pub paths: Vec<String>,
    pub depth: Option<i64>,
    pub ignore: Vec<String>,
}

impl Settings {
    pub fn kind(&self, kind: ProjectKind) -> Option<&KindSettings> {
        match kind {
            ProjectKind::Git => Some(&self.git),
            ProjectKind::Svn => Some(&self.svn),
            ProjectKind::Mercurial => Some(&self.mercurial),
            ProjectKind::VsCode => Some(&self.vscode),
            ProjectKind::Any => Some(&self.any),
            ProjectKind::Favorite => None,
        }
    }

    /// Builds the traversal job for `kind`. Returns `None` for favorites.
    ///
    /// Base folders are home-expanded and made absolute against the working
    /// directory, so scanned roots are always absolute.
    ///
    /// Depth is passed through unchecked; the scanner rejects negatives.
    pub fn scan_configuration(
        &self,
        kind: ProjectKind,
        overrides: &ScanOverrides,
    ) -> Option<ScanConfiguration> {
        let settings = self.kind(kind)?;
        let folders = if overrides.paths.is_empty() {
            &settings.base_folders
        } else {
            &overrides.paths
        };

        Some(ScanConfiguration {
            base_directories: folders.iter().map(|f| absolute(f)).collect(),
            ignore_names: merge_vecs(
                Some(settings.ignored_folders.clone()),
                Some(overrides.ignore.clone()),
            ),
            max_depth: overrides.depth.unwrap_or(settings.max_depth),
            kind,
            suppress_nested: self.ignore_projects_within_projects,
            follow_symlinks: self.support_symlinks,
        })
    }

    pub fn projects_location(&self) -> Result<PathBuf> {
        match &self.projects_location {
            Some(location) if !location.is_empty() => Ok(PathBuf::from(expand(location))),
            _ => {
                let home = dirs::home_dir().context("Could not determine home directory")?;
                Ok(home.join(".projector"))
            }
        }
    }
}

fn default_editor() -> String {
    std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "code".to_string())
}

pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("projector").join("config.toml"))
}

/// Reads settings from `path`, or from the default location. A missing file
/// gives the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !config_path.exists() {
        log::debug!("no config at {:?}, using defaults", config_path);
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    let settings: Settings = toml::from_str(&content)
        .context(format!("Failed to parse {:?}", config_path))?;

    Ok(settings)
}

/// Concatenates two optional lists, dropping repeats while keeping order.
fn merge_vecs(first: Option<Vec<String>>, second: Option<Vec<String>>) -> Vec<String> {
    let mut combined = first.unwrap_or_default();
    if let Some(mut items) = second {
        combined.append(&mut items);
    }
    let mut seen = HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}
