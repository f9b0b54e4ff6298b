// Declare modules
pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod formatter;
pub mod launcher;
pub mod models;
pub mod paths;
pub mod scanner;
pub mod sink;
pub mod storage;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;

use self::catalog::{merge, CatalogFilter, CatalogSnapshot};
use self::cli::{
    AddArgs, Cli, Command, EditArgs, KindFlags, ListArgs, OpenArgs, ScanArgs, SelectArgs,
    TagCommand,
};
use self::config::{load_settings, ScanOverrides, Settings};
use self::error::SelectionError;
use self::formatter::{ListOptions, OutputGenerator};
use self::models::{Project, ProjectCache, ProjectKind};
use self::scanner::Scanner;
use self::sink::{CollectingSink, ErrorSink};
use self::storage::Store;

/// Parses arguments, loads settings and storage, and dispatches the command.
pub fn run() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);
    if args.no_color {
        colored::control::set_override(false);
    }

    let settings = load_settings(args.config.as_deref())?;
    let store = Store::new(settings.projects_location()?)?;
    log::debug!("using storage at {}", store.root().display());

    if !settings.show_colors {
        colored::control::set_override(false);
    }
    let out = OutputGenerator::new(settings.show_colors && !args.no_color);

    match args.command {
        Command::Scan(scan_args) => scan(&settings, &store, &out, scan_args),
        Command::List(list_args) => list(&settings, &store, &out, list_args),
        Command::Select(select_args) => select(&settings, &store, &out, select_args),
        Command::Open(open_args) => open(&settings, &store, &out, open_args),
        Command::Add(add_args) => add(&store, &out, add_args),
        Command::Edit(edit_args) => edit_favorites(&store, &out, |favorites| {
            apply_edit(favorites, edit_args)
        }),
        Command::Remove { name } => edit_favorites(&store, &out, |favorites| {
            let index = position_of(favorites, &name)?;
            let removed = favorites.remove(index);
            Ok(format!("Removed project '{}'", removed.name))
        }),
        Command::Enable { name } => set_enabled(&store, &out, &name, true),
        Command::Disable { name } => set_enabled(&store, &out, &name, false),
        Command::Tag(tag_command) => tag(&settings, &store, &out, tag_command),
        Command::ClearCache => {
            store.clear_cache()?;
            println!("{}", out.success("Cache cleared successfully"));
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn scan(settings: &Settings, store: &Store, out: &OutputGenerator, args: ScanArgs) -> Result<()> {
    let kinds = scan_kinds(&args.kinds, args.all)?;
    let overrides = ScanOverrides {
        paths: args.paths,
        depth: args.depth,
        ignore: args.ignore,
    };
    let scanners = build_scanners(settings, &kinds, &overrides)?;
    if scanners.is_empty() {
        println!(
            "{}",
            out.info("No base folders configured; pass paths or set base_folders")
        );
        return Ok(());
    }

    let sink = CollectingSink::new();
    let results = run_scans(&scanners, &sink)?;

    for report in sink.into_reports() {
        eprintln!("{}", out.warning(&report.to_string()));
    }
    for (kind, projects) in &results {
        println!(
            "{}",
            out.info(&format!("Found {} {}", projects.len(), kind.header()))
        );
    }

    if settings.cache_projects_between_sessions {
        let mut cache = store.load_cache().unwrap_or_else(|err| {
            log::warn!("discarding unreadable cache: {:#}", err);
            ProjectCache::default()
        });
        for (kind, projects) in results {
            cache.set_bucket(kind, projects);
        }
        store.save_cache(&cache)?;
        println!("{}", out.success("Cache updated"));
    }

    Ok(())
}

/// Kinds a scan should cover. No flag means all of them; favorites are never
/// scanned.
fn scan_kinds(flags: &KindFlags, all: bool) -> Result<Vec<ProjectKind>> {
    if flags.favorites {
        bail!("favorites are saved with `add`, not scanned");
    }
    let kinds = flags.kinds();
    if all || kinds.is_empty() {
        return Ok(ProjectKind::SCANNED.to_vec());
    }
    Ok(kinds)
}

/// Validates every requested job before any of them starts walking.
fn build_scanners(
    settings: &Settings,
    kinds: &[ProjectKind],
    overrides: &ScanOverrides,
) -> Result<Vec<Scanner>> {
    let mut scanners = Vec::new();
    for kind in kinds {
        let Some(config) = settings.scan_configuration(*kind, overrides) else {
            continue;
        };
        if config.base_directories.is_empty() {
            log::info!("no base folders for {}, skipping", kind);
            continue;
        }
        let scanner = Scanner::new(config).with_context(|| format!("Cannot scan {}", kind))?;
        scanners.push(scanner);
    }
    Ok(scanners)
}

/// Runs each job on its own thread; all of them report into `sink`.
fn run_scans(
    scanners: &[Scanner],
    sink: &dyn ErrorSink,
) -> Result<Vec<(ProjectKind, Vec<Project>)>> {
    thread::scope(|s| {
        let handles: Vec<_> = scanners
            .iter()
            .map(|scanner| s.spawn(move || (scanner.config().kind, scanner.scan(sink))))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| anyhow!("scan thread panicked")))
            .collect()
    })
}

/// Loads only the record sets the filter can use, then merges and sorts.
fn load_catalog(
    settings: &Settings,
    store: &Store,
    filter: &CatalogFilter,
) -> Result<CatalogSnapshot> {
    let favorites = if filter.wants_kind(ProjectKind::Favorite) {
        store.load_favorites()?
    } else {
        Vec::new()
    };

    let cache = if ProjectKind::SCANNED.iter().any(|k| filter.wants_kind(*k)) {
        store.load_cache().unwrap_or_else(|err| {
            log::warn!("ignoring unreadable cache: {:#}", err);
            ProjectCache::default()
        })
    } else {
        ProjectCache::default()
    };

    let mut snapshot = merge(&favorites, &cache, filter);
    snapshot.sort(settings.sort_list);
    Ok(snapshot)
}

/// Shows entries whose directory has gone missing as disabled.
fn mark_missing_paths(snapshot: &mut CatalogSnapshot) {
    for p in snapshot.iter_mut() {
        if !p.root_path.exists() {
            log::debug!("{} no longer exists", p.root_path.display());
            p.enabled = false;
        }
    }
}

fn list(settings: &Settings, store: &Store, out: &OutputGenerator, args: ListArgs) -> Result<()> {
    let filter = CatalogFilter {
        kinds: args.kinds.kinds(),
        include_disabled: args.all,
        tag: args.tag,
    };
    let mut snapshot = load_catalog(settings, store, &filter)?;
    if settings.check_invalid_paths {
        mark_missing_paths(&mut snapshot);
    }

    let opts = ListOptions {
        show_path: args.path,
        show_index: true,
        grouped: args.grouped || settings.group_list,
    };
    println!("{}", out.generate_list(&snapshot, opts));
    Ok(())
}

fn select(
    settings: &Settings,
    store: &Store,
    out: &OutputGenerator,
    args: SelectArgs,
) -> Result<()> {
    let filter = CatalogFilter {
        kinds: args.kinds.kinds(),
        include_disabled: false,
        tag: args.tag,
    };
    let snapshot = load_catalog(settings, store, &filter)?;
    let project = choose(out, &snapshot, args.selector.as_deref(), settings.group_list)?;
    println!("{}", project.root_path.display());
    Ok(())
}

fn open(settings: &Settings, store: &Store, out: &OutputGenerator, args: OpenArgs) -> Result<()> {
    let snapshot = load_catalog(settings, store, &CatalogFilter::default())?;
    let project = choose(out, &snapshot, args.selector.as_deref(), settings.group_list)?;

    if !project.root_path.is_dir() {
        bail!("project path does not exist: {}", project.root_path.display());
    }

    let editor = args.editor.as_deref().unwrap_or(&settings.editor);
    println!(
        "{}",
        out.info(&format!("Opening '{}' in {}...", project.name, editor))
    );
    launcher::open_in_editor(
        &project.root_path,
        editor,
        args.new_window || settings.open_in_new_window,
    )
}

/// Resolves `selector`, or asks for one on stdin after listing the catalog
/// on stderr so stdout stays clean for scripts.
fn choose<'a>(
    out: &OutputGenerator,
    snapshot: &'a CatalogSnapshot,
    selector: Option<&str>,
    grouped: bool,
) -> Result<&'a Project> {
    let selector = match selector {
        Some(s) => s.to_string(),
        None => prompt(out, snapshot, grouped)?,
    };
    Ok(snapshot.resolve(&selector)?)
}

fn prompt(out: &OutputGenerator, snapshot: &CatalogSnapshot, grouped: bool) -> Result<String> {
    if snapshot.is_empty() {
        return Err(SelectionError::Empty.into());
    }

    let opts = ListOptions {
        show_path: false,
        show_index: true,
        grouped,
    };
    let mut stderr = io::stderr();
    writeln!(stderr, "{}\n", out.generate_list(snapshot, opts))?;
    write!(stderr, "Enter project number: ")?;
    stderr.flush()?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read selection")?;
    Ok(input.trim().to_string())
}

fn add(store: &Store, out: &OutputGenerator, args: AddArgs) -> Result<()> {
    let path = match args.path {
        Some(p) => p,
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let path = existing_dir(&path)?;

    let mut project = Project::from_dir(&path, ProjectKind::Favorite);
    if let Some(name) = args.name {
        project.name = name;
    }
    for t in &args.tags {
        project.add_tag(t);
    }
    project.enabled = !args.disabled;

    edit_favorites(store, out, |favorites| {
        let message = format!(
            "Added project '{}' at {}",
            project.name,
            project.root_path.display()
        );
        add_favorite(favorites, project)?;
        Ok(message)
    })
}

/// Resolves `path` to an absolute, existing directory.
fn existing_dir(path: &Path) -> Result<PathBuf> {
    let resolved = fs::canonicalize(path)
        .with_context(|| format!("path does not exist: {}", path.display()))?;
    if !resolved.is_dir() {
        bail!("path is not a directory: {}", resolved.display());
    }
    Ok(resolved)
}

/// Rejects a favorite whose path or name is already saved.
fn add_favorite(favorites: &mut Vec<Project>, project: Project) -> Result<()> {
    if let Some(existing) = favorites.iter().find(|p| p.root_path == project.root_path) {
        bail!("project already exists: {}", existing.name);
    }
    if favorites.iter().any(|p| p.name == project.name) {
        bail!("project with name '{}' already exists", project.name);
    }
    favorites.push(project);
    Ok(())
}

/// Applies the requested changes to one favorite. A new name must not belong
/// to another favorite; a new path must be an existing directory.
fn apply_edit(favorites: &mut [Project], args: EditArgs) -> Result<String> {
    if args.name.is_none() && args.path.is_none() && args.enabled.is_none() {
        bail!("no changes specified (use --name, --path, or --enabled)");
    }
    let index = position_of(favorites, &args.project)?;

    if let Some(name) = &args.name {
        if let Some(other) = position_of(favorites, name).ok().filter(|i| *i != index) {
            bail!("project with name '{}' already exists", favorites[other].name);
        }
    }
    let path = args.path.as_deref().map(existing_dir).transpose()?;

    let project = &mut favorites[index];
    if let Some(name) = args.name {
        project.name = name;
    }
    if let Some(path) = path {
        project.root_path = path;
    }
    if let Some(enabled) = args.enabled {
        project.enabled = enabled;
    }
    Ok(format!("Updated project '{}'", project.name))
}

fn set_enabled(store: &Store, out: &OutputGenerator, name: &str, enabled: bool) -> Result<()> {
    edit_favorites(store, out, |favorites| {
        let index = position_of(favorites, name)?;
        let project = &mut favorites[index];
        project.enabled = enabled;
        let state = if enabled { "Enabled" } else { "Disabled" };
        Ok(format!("{} project '{}'", state, project.name))
    })
}

fn tag(
    settings: &Settings,
    store: &Store,
    out: &OutputGenerator,
    command: TagCommand,
) -> Result<()> {
    match command {
        TagCommand::Add { name, tag } => edit_favorites(store, out, |favorites| {
            let index = position_of(favorites, &name)?;
            let project = &mut favorites[index];
            if !project.add_tag(&tag) {
                bail!("project '{}' already has tag '{}'", project.name, tag);
            }
            Ok(format!("Added tag '{}' to '{}'", tag, project.name))
        }),
        TagCommand::Remove { name, tag } => edit_favorites(store, out, |favorites| {
            let index = position_of(favorites, &name)?;
            let project = &mut favorites[index];
            if !project.remove_tag(&tag) {
                bail!("project '{}' does not have tag '{}'", project.name, tag);
            }
            Ok(format!("Removed tag '{}' from '{}'", tag, project.name))
        }),
        TagCommand::List => {
            let favorites = store.load_favorites()?;
            let tags = known_tags(&settings.tags, &favorites);
            if tags.is_empty() {
                println!("{}", out.info("No tags defined."));
            }
            for t in tags {
                println!("{}", t);
            }
            Ok(())
        }
    }
}

/// Configured tags first, then any others found on favorites.
fn known_tags(configured: &[String], favorites: &[Project]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for t in configured.iter().chain(favorites.iter().flat_map(|p| p.tags.iter())) {
        if !tags.contains(t) {
            tags.push(t.clone());
        }
    }
    tags
}

/// Loads favorites, applies `f`, saves, and prints its message.
fn edit_favorites<F>(store: &Store, out: &OutputGenerator, f: F) -> Result<()>
where
    F: FnOnce(&mut Vec<Project>) -> Result<String>,
{
    let mut favorites = store.load_favorites()?;
    let message = f(&mut favorites)?;
    store.save_favorites(&favorites)?;
    println!("{}", out.success(&message));
    Ok(())
}

/// Case-insensitive lookup of a favorite by name.
fn position_of(favorites: &[Project], name: &str) -> Result<usize> {
    let needle = name.to_lowercase();
    favorites
        .iter()
        .position(|p| p.name.to_lowercase() == needle)
        .ok_or_else(|| anyhow!("project '{}' not found", name))
}
