//! Resolution of the speedtest executable
//!
//! Lookup order:
//! 1. an explicit path from `--tool` / `SPEEDTEST_BIN`
//! 2. a project-local copy (active virtualenv, then next to this binary)
//! 3. the first match on `PATH`

use crate::error::{AppError, Result};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the executable was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSource {
    Explicit,
    ProjectLocal,
    SearchPath,
}

impl fmt::Display for ToolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToolSource::Explicit => "explicit path",
            ToolSource::ProjectLocal => "project-local install",
            ToolSource::SearchPath => "PATH",
        })
    }
}

/// Resolved executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLocation {
    pub path: PathBuf,
    pub source: ToolSource,
}

/// Finds the speedtest executable in a fixed order
#[derive(Debug, Clone)]
pub struct ToolLocator {
    tool_name: String,
    explicit: Option<PathBuf>,
    project_dirs: Vec<PathBuf>,
    search_path: Option<OsString>,
}

impl ToolLocator {
    pub fn new(
        tool_name: impl Into<String>,
        explicit: Option<PathBuf>,
        project_dirs: Vec<PathBuf>,
        search_path: Option<OsString>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            explicit,
            project_dirs,
            search_path,
        }
    }

    /// Locator for the current process environment
    pub fn from_env(explicit: Option<PathBuf>) -> Self {
        let bin_dir = if cfg!(windows) { "Scripts" } else { "bin" };
        let mut project_dirs = Vec::new();

        if let Some(venv) = std::env::var_os("VIRTUAL_ENV") {
            project_dirs.push(PathBuf::from(venv).join(bin_dir));
        }
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                project_dirs.push(dir.to_path_buf());
            }
        }

        Self::new(
            crate::defaults::TOOL_NAME,
            explicit,
            project_dirs,
            std::env::var_os("PATH"),
        )
    }

    /// Resolve the executable, failing with `ExternalTool` when none is found
    pub fn locate(&self) -> Result<ToolLocation> {
        if let Some(path) = &self.explicit {
            if path.is_file() {
                return Ok(ToolLocation { path: path.clone(), source: ToolSource::Explicit });
            }
            return Err(AppError::external_tool(format!(
                "Configured speedtest executable does not exist: {}",
                path.display()
            )));
        }

        for dir in &self.project_dirs {
            if let Some(path) = self.find_in(dir) {
                return Ok(ToolLocation { path, source: ToolSource::ProjectLocal });
            }
        }

        if let Some(search_path) = &self.search_path {
            for dir in std::env::split_paths(search_path) {
                if let Some(path) = self.find_in(&dir) {
                    return Ok(ToolLocation { path, source: ToolSource::SearchPath });
                }
            }
        }

        Err(AppError::external_tool(format!(
            "Could not find '{}' in a project-local environment or on PATH",
            self.tool_name
        )))
    }

    fn find_in(&self, dir: &Path) -> Option<PathBuf> {
        self.file_names()
            .into_iter()
            .map(|name| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }

    fn file_names(&self) -> Vec<String> {
        if cfg!(windows) {
            vec![format!("{}.exe", self.tool_name), self.tool_name.clone()]
        } else {
            vec![self.tool_name.clone()]
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
