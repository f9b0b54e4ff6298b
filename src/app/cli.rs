use crate::app::models::ProjectKind;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Keep a catalog of favorite projects and auto-detected repositories"
)]
pub struct Cli {
    /// Read settings from this file instead of ~/.config/projector/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan base folders for repositories and workspaces
    Scan(ScanArgs),

    /// List saved and detected projects
    #[command(alias = "ls")]
    List(ListArgs),

    /// Print the root path of a project chosen by number or name
    Select(SelectArgs),

    /// Open a project in an editor
    Open(OpenArgs),

    /// Save a directory as a favorite
    Add(AddArgs),

    /// Remove a favorite
    #[command(alias = "rm")]
    Remove { name: String },

    /// Rename a favorite, move it, or toggle it
    Edit(EditArgs),

    /// Enable a favorite
    Enable { name: String },

    /// Disable a favorite without removing it
    Disable { name: String },

    /// Manage favorite tags
    #[command(subcommand)]
    Tag(TagCommand),

    /// Forget all auto-detected projects
    #[command(alias = "cc")]
    ClearCache,
}

/// Project kind selection shared by several commands. None set means all.
#[derive(Args, Debug, Default, Clone)]
pub struct KindFlags {
    /// Saved favorites
    #[arg(long)]
    pub favorites: bool,

    /// Git repositories
    #[arg(long)]
    pub git: bool,

    /// SVN repositories
    #[arg(long)]
    pub svn: bool,

    /// Mercurial repositories
    #[arg(long)]
    pub mercurial: bool,

    /// VS Code workspaces
    #[arg(long)]
    pub vscode: bool,

    /// Any folder
    #[arg(long)]
    pub any: bool,
}

impl KindFlags {
    /// The selected kinds in canonical order; empty when no flag is set.
    pub fn kinds(&self) -> Vec<ProjectKind> {
        [
            (self.favorites, ProjectKind::Favorite),
            (self.git, ProjectKind::Git),
            (self.svn, ProjectKind::Svn),
            (self.mercurial, ProjectKind::Mercurial),
            (self.vscode, ProjectKind::VsCode),
            (self.any, ProjectKind::Any),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect()
    }
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Base folders to scan instead of the configured ones
    pub paths: Vec<String>,

    #[command(flatten)]
    pub kinds: KindFlags,

    /// Scan for every kind
    #[arg(long, short)]
    pub all: bool,

    /// Maximum recursion depth (0 scans only the base folders)
    #[arg(long, short, allow_negative_numbers = true)]
    pub depth: Option<i64>,

    /// Extra folder names or patterns to skip
    #[arg(long)]
    pub ignore: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only projects with this tag
    #[arg(long, short)]
    pub tag: Option<String>,

    /// Show full paths on their own line
    #[arg(long, short)]
    pub path: bool,

    /// Group projects by kind
    #[arg(long, short)]
    pub grouped: bool,

    /// Include disabled projects
    #[arg(long, short)]
    pub all: bool,

    #[command(flatten)]
    pub kinds: KindFlags,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Number or name of the project; prompts when omitted
    pub selector: Option<String>,

    /// Only projects with this tag
    #[arg(long, short)]
    pub tag: Option<String>,

    #[command(flatten)]
    pub kinds: KindFlags,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Number or name of the project; prompts when omitted
    pub selector: Option<String>,

    /// Editor command to use instead of the configured one
    #[arg(long, short)]
    pub editor: Option<String>,

    /// Ask the editor for a new window
    #[arg(long, short)]
    pub new_window: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Directory to save (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Display name (defaults to the folder name)
    #[arg(long, short)]
    pub name: Option<String>,

    /// Tag to attach; may be repeated
    #[arg(long = "tag", short)]
    pub tags: Vec<String>,

    /// Save the project as disabled
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Favorite to change
    pub project: String,

    /// New display name
    #[arg(long, short)]
    pub name: Option<String>,

    /// New root directory
    #[arg(long, short)]
    pub path: Option<PathBuf>,

    /// Enable or disable the favorite
    #[arg(long, action = ArgAction::Set)]
    pub enabled: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// Attach a tag to a favorite
    Add { name: String, tag: String },

    /// Detach a tag from a favorite
    #[command(alias = "rm")]
    Remove { name: String, tag: String },

    /// Show configured tags and tags in use
    #[command(alias = "ls")]
    List,
}
