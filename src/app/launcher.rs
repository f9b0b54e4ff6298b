//! Handing a project directory to an editor process.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

/// Editors that understand `--new-window`.
const WINDOWED_EDITORS: [&str; 4] = ["code", "cursor", "subl", "atom"];

/// Editors that take over the terminal and must be waited on.
const TERMINAL_EDITORS: [&str; 5] = ["vim", "nvim", "emacs", "nano", "hx"];

/// Splits an editor string such as `"code -w"` into program and arguments,
/// then appends the flags for `path`.
fn build_command(editor: &str, path: &Path, new_window: bool) -> Result<(Command, bool)> {
    let parts: Vec<&str> = editor.split_whitespace().collect();
    let Some((program, args)) = parts.split_first() else {
        bail!("No editor configured. Set `editor` in config.toml or pass --editor");
    };

    let program_name = Path::new(*program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(*program);

    let mut command = Command::new(*program);
    command.args(args);
    if new_window && WINDOWED_EDITORS.contains(&program_name) {
        command.arg("--new-window");
    }
    command.arg(path);

    Ok((command, TERMINAL_EDITORS.contains(&program_name)))
}

/// Starts `editor` on `path`. Terminal editors are waited on; others are
/// left running in the background.
pub fn open_in_editor(path: &Path, editor: &str, new_window: bool) -> Result<()> {
    let (mut command, wait) = build_command(editor, path, new_window)?;
    log::debug!("launching {:?}", command);

    if !wait {
        command
            .spawn()
            .with_context(|| format!("Failed to launch editor '{}'", editor))?;
        return Ok(());
    }

    let status = command
        .status()
        .with_context(|| format!("Failed to launch editor '{}'", editor))?;
    if !status.success() {
        bail!(
            "Editor '{}' exited with status {}",
            editor,
            status.code().unwrap_or(-1)
        );
    }
    Ok(())
}
