//! # External Tool Resolution
//!
//! Finds the external encoders (`gifsicle`, `cwebp`) a run shells out to.
//!
//! Lookup order:
//! 1. `TOOLS_DIR` environment variable (direct override, e.g. bundled binaries)
//! 2. System `PATH`

use crate::error::BatchError;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tool path resolver
#[derive(Debug, Clone, Default)]
pub struct ToolResolver {
    /// Directory checked before PATH
    tools_dir: Option<PathBuf>,
}

impl ToolResolver {
    /// Resolver honouring the `TOOLS_DIR` environment variable
    pub fn new() -> Self {
        let tools_dir = env::var_os("TOOLS_DIR").map(PathBuf::from);
        if let Some(ref dir) = tools_dir {
            debug!("Using TOOLS_DIR override: {}", dir.display());
        }
        Self { tools_dir }
    }

    /// Resolver with an explicit tools directory
    pub fn with_tools_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            tools_dir: Some(dir.into()),
        }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let executable = executable_name(tool_name);

        if let Some(ref tools_dir) = self.tools_dir {
            let candidate = tools_dir.join(&executable);
            if candidate.is_file() {
                debug!("Using bundled tool: {} -> {}", tool_name, candidate.display());
                return Some(candidate);
            }
        }

        let found = Self::find_in_system_path(&executable);
        match found {
            Some(ref path) => debug!("Using system tool: {} -> {}", tool_name, path.display()),
            None => debug!("Tool not found: {}", tool_name),
        }
        found
    }

    /// Resolve a tool or fail with installation instructions
    pub fn require(&self, tool_name: &str) -> Result<PathBuf, BatchError> {
        self.resolve_tool(tool_name).ok_or_else(|| {
            BatchError::MissingDependency(format!(
                "'{}' not found in PATH. To install on Linux, run: {}",
                tool_name,
                install_instructions(tool_name)
            ))
        })
    }

    fn find_in_system_path(executable: &str) -> Option<PathBuf> {
        let path_var = env::var_os("PATH")?;
        env::split_paths(&path_var)
            .map(|dir| dir.join(executable))
            .find(|path| path.is_file())
    }
}

fn executable_name(tool_name: &str) -> String {
    if cfg!(windows) && Path::new(tool_name).extension().is_none() {
        format!("{}.exe", tool_name)
    } else {
        tool_name.to_string()
    }
}

/// Installation hint for a tool on Linux
pub fn install_instructions(tool_name: &str) -> String {
    match tool_name {
        "gifsicle" => "sudo apt-get install gifsicle".to_string(),
        "cwebp" | "dwebp" => "sudo apt-get install webp".to_string(),
        _ => format!("sudo apt-get install {}", tool_name),
    }
}
