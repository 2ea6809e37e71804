//! Shared file handling for the commands.

use std::fs;
use std::path::{Path, PathBuf};

use routegen_core::{CompileOptions, RawDocument};
use thiserror::Error;
use tracing::debug;

/// Failures of the shell itself, plus everything the compiler reports.
#[derive(Error, Debug)]
pub enum CliError {
    /// The compiler rejected the document or the options.
    #[error(transparent)]
    Compile(#[from] routegen_core::Error),

    /// The input document or config file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The output file could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl CliError {
    /// Error for a required CLI argument that was not supplied.
    pub fn missing(what: &str) -> Self {
        Self::Compile(routegen_core::Error::InvalidCliArgument(format!("missing {what}")))
    }
}

/// Read and deserialize the input document; `.yaml`/`.yml` is YAML, anything else JSON.
pub fn load_document(path: &Path) -> Result<RawDocument, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    debug!(path = %path.display(), yaml = is_yaml, "loading document");
    let doc = if is_yaml {
        RawDocument::from_yaml(&text)?
    } else {
        RawDocument::from_json(&text)?
    };
    Ok(doc)
}

/// Options from the optional TOML file, defaults otherwise.
pub fn load_options(config: Option<&Path>) -> Result<CompileOptions, CliError> {
    let Some(path) = config else {
        return Ok(CompileOptions::default());
    };
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let options = toml::from_str(&text).map_err(|err: toml::de::Error| {
        routegen_core::Error::InvalidCliArgument(format!(
            "invalid config {}: {}",
            path.display(),
            err.message()
        ))
    })?;
    debug!(path = %path.display(), ?options, "loaded config");
    Ok(options)
}

/// Write `source` to `path`, creating missing parent directories.
pub fn write_output(path: &Path, source: &str) -> Result<(), CliError> {
    let write_err = |source| CliError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, source).map_err(write_err)
}
