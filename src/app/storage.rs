use crate::app::models::{Project, ProjectCache, ProjectKind};
use crate::app::paths::{collapse, expand};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const PROJECTS_FILE: &str = "projects.json";
const CACHE_FILE: &str = "cache.json";

/// JSON files holding the saved favorites and the per-kind scan cache.
///
/// Root paths are stored with the home directory collapsed to `~` and are
/// expanded again on load.
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create storage directory {:?}", root))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn projects_path(&self) -> PathBuf {
        self.root.join(PROJECTS_FILE)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.root.join(CACHE_FILE)
    }

    pub fn load_favorites(&self) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = read_json(&self.projects_path())?.unwrap_or_default();
        for p in &mut projects {
            p.kind = ProjectKind::Favorite;
            p.root_path = expand_path(&p.root_path);
        }
        Ok(projects)
    }

    pub fn save_favorites(&self, projects: &[Project]) -> Result<()> {
        let stored: Vec<Project> = projects.iter().map(for_disk).collect();
        write_json(&self.projects_path(), &stored)
    }

    pub fn load_cache(&self) -> Result<ProjectCache> {
        let mut cache: ProjectCache = read_json(&self.cache_path())?.unwrap_or_default();
        cache.assign_kinds();
        cache.for_each_mut(|p| p.root_path = expand_path(&p.root_path));
        Ok(cache)
    }

    pub fn save_cache(&self, cache: &ProjectCache) -> Result<()> {
        let mut stored = cache.clone();
        stored.for_each_mut(|p| *p = for_disk(p));
        write_json(&self.cache_path(), &stored)
    }

    pub fn clear_cache(&self) -> Result<()> {
        let path = self.cache_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("Failed to remove cache at {:?}", path)),
        }
    }
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(expand(&path.to_string_lossy()))
}

fn for_disk(p: &Project) -> Project {
    Project {
        root_path: PathBuf::from(collapse(&p.root_path.to_string_lossy())),
        ..p.clone()
    }
}

/// Missing files read as `None`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("Failed to read {:?}", path)),
    };
    let parsed =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?;
    Ok(Some(parsed))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_string_pretty(value).context("Failed to serialize projects")?;
    fs::write(path, data).with_context(|| format!("Failed to write {:?}", path))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
