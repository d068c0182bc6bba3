//! Command line errors and exit codes
//!
//! Every failure leaving the orchestrator becomes a [`CliError`]. The category
//! picks the exit code; the optional cause chain is only shown with `--debug`.

use colored::*;
use packager_core::error::{IoErrorKind, PackagingError, UsageError};
use std::error::Error as StdError;
use std::fmt;

/// Process exit codes of the `packager` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    Misuse = 2,
    FilesystemError = 4,
}

/// What went wrong, as far as the exit code is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCategory {
    /// The operation itself failed
    General,
    /// The invocation was wrong or referred to unknown things
    Misuse,
    /// A package or store file could not be read or written
    Filesystem,
}

impl ErrorCategory {
    fn label(self) -> &'static str {
        match self {
            Self::General => "Error",
            Self::Misuse => "Usage Error",
            Self::Filesystem => "File Error",
        }
    }

    fn colored_label(self) -> ColoredString {
        match self {
            Self::General | Self::Filesystem => self.label().red(),
            Self::Misuse => self.label().yellow(),
        }
    }
}

/// Error reported to the operator before the process exits
#[derive(Debug)]
pub struct CliError {
    message: String,
    category: ErrorCategory,
    /// Path or other detail the message refers to
    context: Vec<(String, String)>,
    pub suggestions: Vec<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    fn new(category: ErrorCategory, message: &str) -> Self {
        Self {
            message: message.to_string(),
            category,
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn general(message: &str) -> Self {
        Self::new(ErrorCategory::General, message)
    }

    pub fn misuse(message: &str) -> Self {
        let mut error = Self::new(ErrorCategory::Misuse, message);
        error
            .suggestions
            .push("Run 'packager -h' for usage information".to_string());
        error
    }

    pub fn filesystem(message: &str) -> Self {
        let mut error = Self::new(ErrorCategory::Filesystem, message);
        if message.contains("does not exist") || message.contains("not found") {
            error
                .suggestions
                .push("Check the package path; directories expand to the packages inside them".to_string());
        } else if message.to_ascii_lowercase().contains("permission") {
            error
                .suggestions
                .push("Check that the repository store and package files are writable".to_string());
        }
        error
    }

    /// Translate a core error, suggesting close matches among `known_types`
    /// when the package type was not recognised
    pub fn from_core_error(error: packager_core::Error, known_types: &[&str]) -> Self {
        use packager_core::Error;

        let message = error.to_string();
        let mut cli_error = match &error {
            Error::Usage(UsageError::UnknownPackageType { package_type, .. }) => {
                let mut misuse = Self::misuse(&message);
                if let Some(known) = closest_type(package_type, known_types) {
                    misuse.suggestions.insert(0, format!("Did you mean '{known}'?"));
                }
                if !known_types.is_empty() {
                    misuse
                        .suggestions
                        .push(format!("Known package types: {}", known_types.join(", ")));
                }
                misuse
            }
            Error::Usage(_) => Self::misuse(&message),
            Error::Io(io_error) => {
                let mut io = match io_error.kind {
                    IoErrorKind::FileNotFound | IoErrorKind::PermissionDenied => {
                        Self::filesystem(&message)
                    }
                    IoErrorKind::Other => Self::general(&message),
                };
                if let Some(path) = &io_error.path {
                    io.context
                        .push(("path".to_string(), path.display().to_string()));
                }
                io
            }
            Error::Packaging(PackagingError::PackageNotFound { .. }) => {
                Self::filesystem(&message)
            }
            Error::Packaging(_) | Error::Store(_) => Self::general(&message),
        };

        cli_error.source = Some(Box::new(error));
        cli_error
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.category {
            ErrorCategory::General => ExitCode::GeneralError,
            ErrorCategory::Misuse => ExitCode::Misuse,
            ErrorCategory::Filesystem => ExitCode::FilesystemError,
        }
    }

    /// Render the error for stderr; `debug` adds the cause chain
    pub fn format_for_user(&self, debug: bool) -> String {
        let mut output = format!("{}: {}\n", self.category.colored_label(), self.message);

        if !self.context.is_empty() {
            output.push_str("\nContext:\n");
            for (key, value) in &self.context {
                output.push_str(&format!("  {}: {value}\n", key.bold()));
            }
        }

        if debug && let Some(source) = &self.source {
            output.push_str("\nCaused by:\n");
            let mut cause: Option<&dyn StdError> = Some(source.as_ref());
            let mut depth = 1;
            while let Some(err) = cause {
                output.push_str(&format!("  {depth}: {err}\n"));
                cause = err.source();
                depth += 1;
            }
        }

        if !self.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category.label(), self.message)?;
        for (key, value) in &self.context {
            write!(f, " ({key}: {value})")?;
        }
        Ok(())
    }
}

impl StdError for CliError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<packager_core::Error> for CliError {
    fn from(error: packager_core::Error) -> Self {
        Self::from_core_error(error, &[])
    }
}

/// Configuration failures surface through `anyhow`
impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        Self::general(&format!("{error:#}"))
    }
}

/// Registered package type within two edits of `package_type`, ignoring case
fn closest_type<'a>(package_type: &str, known_types: &[&'a str]) -> Option<&'a str> {
    let wanted = package_type.to_ascii_uppercase();
    known_types
        .iter()
        .map(|known| (edit_distance(&wanted, &known.to_ascii_uppercase()), *known))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, known)| known)
}

/// Levenshtein distance over chars, one row at a time
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use packager_core::error::IoError;
    use std::io;
    use std::path::Path;

    #[test]
    fn test_usage_errors_are_misuse() {
        let error: CliError = packager_core::Error::from(UsageError::missing_argument("-e")).into();
        assert_eq!(error.exit_code(), ExitCode::Misuse);
        assert_eq!(error.exit_code() as i32, 2);
        assert!(error.to_string().starts_with("Usage Error:"));
    }

    #[test]
    fn test_packaging_errors_are_general() {
        let error: CliError =
            packager_core::Error::from(PackagingError::collision("123456789/4")).into();
        assert_eq!(error.exit_code(), ExitCode::GeneralError);
        assert!(error.to_string().contains("123456789/4"));
    }

    #[test]
    fn test_missing_files_are_filesystem_errors() {
        let error: CliError =
            packager_core::Error::from(IoError::file_not_found(Path::new("/tmp/a.json"))).into();
        assert_eq!(error.exit_code(), ExitCode::FilesystemError);
        assert!(error.to_string().contains("/tmp/a.json"));

        let missing_package: CliError =
            packager_core::Error::from(PackagingError::package_not_found(Path::new("b.json")))
                .into();
        assert_eq!(missing_package.exit_code(), ExitCode::FilesystemError);
    }

    #[test]
    fn test_unknown_package_type_suggests_alias() {
        let error = CliError::from_core_error(
            UsageError::unknown_package_type("AIPP", "ingester").into(),
            &["AIP", "JSON-AIP"],
        );

        assert_eq!(error.suggestions[0], "Did you mean 'AIP'?");
        assert!(error.suggestions.iter().any(|s| s.contains("JSON-AIP")));
    }

    #[test]
    fn test_distant_package_type_gets_no_guess() {
        let error = CliError::from_core_error(
            UsageError::unknown_package_type("METS", "ingester").into(),
            &["AIP"],
        );

        assert!(!error.suggestions.iter().any(|s| s.starts_with("Did you mean")));
    }

    #[test]
    fn test_debug_output_includes_cause_chain() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let error: CliError =
            packager_core::Error::from(IoError::at(Path::new("/srv/store.json"), io_error)).into();

        let debug = error.format_for_user(true);
        assert!(debug.contains("Caused by"));
        assert!(debug.contains("denied"));

        let plain = error.format_for_user(false);
        assert!(!plain.contains("Caused by"));
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("AIP", "AIP"), 0);
        assert_eq!(edit_distance("AIPP", "AIP"), 1);
        assert_eq!(edit_distance("METS", "AIP"), 4);
        assert_eq!(edit_distance("", "AIP"), 3);
    }
}
