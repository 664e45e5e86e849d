//! Path settings for the pipelines, validated before any processing starts.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_OUTPUT_NAME: &str = "model";
pub const OUTPUT_EXTENSION: &str = "glb";

const PROJECT_PREFIX: &str = "//";

/// Resolves `//`-prefixed paths against the project directory. Other paths are
/// returned as given.
pub fn resolve_project_path(path: &str, project_dir: &Path) -> PathBuf {
    match path.strip_prefix(PROJECT_PREFIX) {
        Some(relative) => project_dir.join(relative),
        None => PathBuf::from(path),
    }
}

fn required<'a>(value: Option<&'a str>, what: &'static str) -> Result<&'a str, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingPath(what)),
    }
}

fn existing(path: PathBuf, what: &'static str) -> Result<PathBuf, ConfigError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(ConfigError::NotFound { what, path })
    }
}

/// `model` when empty, otherwise the name with `.glb` appended if missing.
pub fn output_file_name(name: Option<&str>) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let name = name.unwrap_or(DEFAULT_OUTPUT_NAME);
    let has_extension = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION));
    if has_extension {
        name.to_string()
    } else {
        format!("{}.{}", name, OUTPUT_EXTENSION)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    pub dae_path: Option<String>,
    pub input_path: Option<String>,
    /// Defaults to the input file's directory.
    pub output_directory: Option<String>,
    pub output_filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExport {
    pub dae_path: PathBuf,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl ExportConfig {
    pub fn resolve(&self, project_dir: &Path) -> Result<ResolvedExport, ConfigError> {
        let dae = required(self.dae_path.as_deref(), "DAE file path")?;
        let dae_path = existing(resolve_project_path(dae, project_dir), "DAE file")?;

        let input = required(self.input_path.as_deref(), "input GLB path")?;
        let input_path = existing(resolve_project_path(input, project_dir), "input GLB")?;

        let output_directory = match self.output_directory.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => resolve_project_path(dir, project_dir),
            _ => match input_path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        };
        if !output_directory.is_dir() {
            return Err(ConfigError::NotADirectory(output_directory));
        }

        let output_path =
            output_directory.join(output_file_name(self.output_filename.as_deref()));
        log::debug!(
            "export {} with wraps from {} to {}",
            input_path.display(),
            dae_path.display(),
            output_path.display()
        );
        Ok(ResolvedExport {
            dae_path,
            input_path,
            output_path,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CondenseConfig {
    pub dae_path: Option<String>,
}

impl CondenseConfig {
    /// Returns the DAE path to read wrap modes from.
    pub fn resolve(&self, project_dir: &Path) -> Result<PathBuf, ConfigError> {
        let dae = required(self.dae_path.as_deref(), "DAE file path")?;
        existing(resolve_project_path(dae, project_dir), "DAE file")
    }
}
