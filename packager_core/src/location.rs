//! Package sources and destinations
//!
//! A package argument is either a path or `-` for standard input/output. A
//! directory given as a source stands for every package directly inside it.

use crate::error::{IoError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Literal argument designating standard input or output
pub const STDIO_ARGUMENT: &str = "-";

/// Where a package is read from or written to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackageLocation {
    /// Standard input for ingest, standard output for dissemination
    Stdio,
    File(PathBuf),
}

impl PackageLocation {
    /// Interpret a command-line argument
    pub fn from_argument(argument: &str) -> Self {
        if argument == STDIO_ARGUMENT {
            Self::Stdio
        } else {
            Self::File(PathBuf::from(argument))
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdio => None,
            Self::File(path) => Some(path),
        }
    }

    pub fn is_stdio(&self) -> bool {
        matches!(self, Self::Stdio)
    }

    /// Whether the package can be read; standard input always counts as present
    pub fn exists(&self) -> bool {
        match self {
            Self::Stdio => true,
            Self::File(path) => path.exists(),
        }
    }

    /// Whether a written package now holds data
    pub fn has_data(&self) -> bool {
        match self {
            Self::Stdio => false,
            Self::File(path) => path.metadata().map(|m| m.len() > 0).unwrap_or(false),
        }
    }

    /// Directory that relative package references are resolved against
    pub fn base_dir(&self) -> PathBuf {
        match self {
            Self::Stdio => PathBuf::from("."),
            Self::File(path) => path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Canonical path for reports, falling back to the path as given
    pub fn display_path(&self) -> String {
        match self {
            Self::Stdio => "<standard stream>".to_string(),
            Self::File(path) => canonical_display(path),
        }
    }
}

impl fmt::Display for PackageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str(STDIO_ARGUMENT),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Canonical form of `path` when it exists, otherwise the path as given
pub fn canonical_display(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// Expand positional arguments into the ordered list of packages to process
///
/// Directories expand to their direct entries sorted by file name; everything
/// else is kept in argument order. Existence is checked later, per package.
pub fn expand_sources(arguments: &[String]) -> Result<Vec<PackageLocation>> {
    let mut sources = Vec::new();

    for argument in arguments {
        let location = PackageLocation::from_argument(argument);
        match &location {
            PackageLocation::File(path) if path.is_dir() => {
                log::debug!("Expanding package directory {}", path.display());
                for entry in WalkDir::new(path)
                    .min_depth(1)
                    .max_depth(1)
                    .sort_by_file_name()
                {
                    let entry = entry.map_err(|e| {
                        let io_error = e
                            .into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                        IoError::at(path, io_error)
                    })?;
                    sources.push(PackageLocation::File(entry.into_path()));
                }
            }
            _ => sources.push(location),
        }
    }

    Ok(sources)
}
