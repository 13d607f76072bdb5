use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// The two foreground programs a session hands control to.
pub trait Launcher {
    /// Opens `path` in the editor and blocks until it exits.
    fn edit(&mut self, path: &Path) -> Result<()>;

    /// Shows `path` in the pager and blocks until it exits.
    fn page(&mut self, path: &Path) -> Result<()>;
}

impl<L: Launcher + ?Sized> Launcher for &mut L {
    fn edit(&mut self, path: &Path) -> Result<()> {
        (**self).edit(path)
    }

    fn page(&mut self, path: &Path) -> Result<()> {
        (**self).page(path)
    }
}

/// Launches the configured editor and pager as child processes.
///
/// Each command line is split on whitespace, so `EDITOR="code --wait"` works;
/// the file path is appended as the last argument.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    editor: String,
    pager: String,
}

impl ProcessLauncher {
    pub fn new(editor: impl Into<String>, pager: impl Into<String>) -> Self {
        Self {
            editor: editor.into(),
            pager: pager.into(),
        }
    }
}

impl Launcher for ProcessLauncher {
    fn edit(&mut self, path: &Path) -> Result<()> {
        run_foreground("editor", &self.editor, path)
    }

    fn page(&mut self, path: &Path) -> Result<()> {
        run_foreground("pager", &self.pager, path)
    }
}

/// A non-zero exit (`:cq`, Ctrl-C) is not an error; only failing to start
/// the program is.
fn run_foreground(role: &str, command_line: &str, path: &Path) -> Result<()> {
    let mut parts = command_line.split_whitespace();
    let program = parts
        .next()
        .with_context(|| format!("The {role} command is empty"))?;

    debug!(role, program, path = %path.display(), "launching");
    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to launch {role} `{program}`"))?;

    if !status.success() {
        warn!(role, program, %status, "exited unsuccessfully");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_an_error() {
        let err = run_foreground("editor", "   ", Path::new("/tmp/x.md")).unwrap_err();
        assert_eq!(err.to_string(), "The editor command is empty");
    }

    #[test]
    fn missing_program_is_an_error() {
        let mut launcher = ProcessLauncher::new("no-such-editor-binary-here", "less");
        assert!(launcher.edit(Path::new("/tmp/x.md")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_tolerated() {
        let mut launcher = ProcessLauncher::new("true", "false");
        assert!(launcher.edit(Path::new("/tmp/x.md")).is_ok());
        assert!(launcher.page(Path::new("/tmp/x.md")).is_ok());
    }
}
