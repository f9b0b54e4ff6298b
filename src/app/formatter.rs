use crate::app::catalog::CatalogSnapshot;
use crate::app::models::Project;
use colored::{ColoredString, Colorize};

/// Paths longer than this are shortened to their tail.
const MAX_PATH_DISPLAY: usize = 50;

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Full path on its own line instead of a shortened one.
    pub show_path: bool,
    /// Prefix entries with their 1-based position.
    pub show_index: bool,
    /// Print kind headers.
    pub grouped: bool,
}

/// Renders listings and status lines, coloured unless turned off.
///
/// With colours on, `colored` still drops escape codes when its own
/// detection says the terminal cannot show them (`NO_COLOR`, no tty).
#[derive(Debug, Clone, Copy)]
pub struct OutputGenerator {
    colors: bool,
}

impl OutputGenerator {
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }

    /// Renders a catalog. Positions match [`CatalogSnapshot::get`].
    pub fn generate_list(&self, snapshot: &CatalogSnapshot, opts: ListOptions) -> String {
        if snapshot.is_empty() {
            return self.info("No projects found.");
        }

        let mut output = String::new();
        let mut index = 1;

        if opts.grouped {
            for (kind, projects) in snapshot.groups() {
                output.push_str(&self.paint(kind.header(), |s| s.yellow().bold()));
                output.push('\n');
                for p in projects {
                    output.push_str(&self.generate_item(p, index, opts, "  "));
                    output.push('\n');
                    index += 1;
                }
                output.push('\n');
            }
        } else {
            for p in snapshot.iter() {
                output.push_str(&self.generate_item(p, index, opts, ""));
                output.push('\n');
                index += 1;
            }
        }

        output.trim_end().to_string()
    }

    fn generate_item(&self, p: &Project, index: usize, opts: ListOptions, indent: &str) -> String {
        let mut line = String::from(indent);

        if opts.show_index {
            line.push_str(&self.paint(&format!("[{}]", index), |s| s.blue()));
            line.push(' ');
        }
        line.push_str(&self.paint(&p.name, |s| s.white().bold()));
        if !p.tags.is_empty() {
            line.push(' ');
            let tags = format!("[{}]", p.tags.join(", "));
            line.push_str(&self.paint(&tags, |s| s.magenta()));
        }
        if !p.enabled {
            line.push(' ');
            line.push_str(&self.paint("(disabled)", |s| s.dimmed()));
        }

        let path = p.root_path.to_string_lossy();
        if opts.show_path {
            line.push('\n');
            line.push_str(indent);
            if opts.show_index {
                line.push_str("    ");
            }
            line.push_str(&self.paint(&path, |s| s.cyan()));
        } else {
            line.push_str(" - ");
            line.push_str(&self.paint(&shorten(&path), |s| s.cyan()));
        }

        line
    }

    pub fn success(&self, msg: &str) -> String {
        self.paint(&format!("✓ {}", msg), |s| s.green())
    }

    pub fn error(&self, msg: &str) -> String {
        self.paint(&format!("✗ {}", msg), |s| s.red())
    }

    pub fn warning(&self, msg: &str) -> String {
        self.paint(&format!("⚠ {}", msg), |s| s.yellow())
    }

    pub fn info(&self, msg: &str) -> String {
        self.paint(&format!("ℹ {}", msg), |s| s.blue())
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.colors {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

fn shorten(path: &str) -> String {
    let count = path.chars().count();
    if count <= MAX_PATH_DISPLAY {
        return path.to_string();
    }
    let tail: String = path.chars().skip(count - (MAX_PATH_DISPLAY - 3)).collect();
    format!("...{}", tail)
}
