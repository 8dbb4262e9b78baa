//! Error types for fstash_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using fstash_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during stash operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during traversal, copy or removal.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Stash name fails validation after normalization.
    #[error("Invalid stash name: {name:?} (allowed: letters, digits, '-' and '_')")]
    InvalidName { name: String },

    /// Source tree does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// No stash is stored under the given name.
    #[error("Stash does not exist: {name}")]
    StashNotExist { name: String },

    /// Template data for a file is not a JSON object.
    #[error("Invalid template data for {file}: {reason}")]
    TemplateData { file: PathBuf, reason: String },

    /// File content could not be parsed as a template.
    #[error("Template syntax error in {file}: {reason}")]
    TemplateSyntax { file: PathBuf, reason: String },

    /// Template failed while rendering.
    #[error("Template render error in {file}: {reason}")]
    TemplateRender { file: PathBuf, reason: String },

    /// Directory traversal failed for a reason other than I/O.
    #[error("Walk error: {reason}")]
    Walk { reason: String },
}

/// Fieldless discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    InvalidName,
    NotFound,
    StashNotExist,
    TemplateData,
    TemplateSyntax,
    TemplateRender,
    Walk,
}

impl ErrorKind {
    /// Process exit code for this kind of failure.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Io | ErrorKind::Walk => 1,
            ErrorKind::InvalidName => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::StashNotExist => 4,
            ErrorKind::TemplateData | ErrorKind::TemplateSyntax | ErrorKind::TemplateRender => 5,
        }
    }
}

impl Error {
    /// Return the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::InvalidName { .. } => ErrorKind::InvalidName,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::StashNotExist { .. } => ErrorKind::StashNotExist,
            Error::TemplateData { .. } => ErrorKind::TemplateData,
            Error::TemplateSyntax { .. } => ErrorKind::TemplateSyntax,
            Error::TemplateRender { .. } => ErrorKind::TemplateRender,
            Error::Walk { .. } => ErrorKind::Walk,
        }
    }

    /// Create an InvalidName error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Error::InvalidName { name: name.into() }
    }

    /// Create a NotFound error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Error::NotFound { path: path.into() }
    }

    /// Create a StashNotExist error.
    pub fn stash_not_exist(name: impl Into<String>) -> Self {
        Error::StashNotExist { name: name.into() }
    }

    /// Create a TemplateData error.
    pub fn template_data(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::TemplateData {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a TemplateSyntax error.
    pub fn template_syntax(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::TemplateSyntax {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a TemplateRender error.
    pub fn template_render(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::TemplateRender {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a Walk error.
    pub fn walk(reason: impl Into<String>) -> Self {
        Error::Walk {
            reason: reason.into(),
        }
    }
}

impl From<ignore::Error> for Error {
    fn from(err: ignore::Error) -> Self {
        // ignore::Error wraps an io::Error, or reports a loop/path problem
        match err.io_error() {
            Some(io_err) => Error::Io {
                source: std::io::Error::new(io_err.kind(), io_err.to_string()),
            },
            None => Error::walk(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Error::invalid_name("a b").kind(), ErrorKind::InvalidName);
        assert_eq!(Error::stash_not_exist("ghost").kind(), ErrorKind::StashNotExist);
        assert_eq!(Error::not_found("/nope").kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::template_render("a.txt", "boom").kind(),
            ErrorKind::TemplateRender
        );
        let io: Error = std::io::Error::other("disk full").into();
        assert_eq!(io.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_exit_codes_are_distinct_for_user_errors() {
        assert_eq!(ErrorKind::Io.exit_code(), 1);
        assert_eq!(ErrorKind::InvalidName.exit_code(), 2);
        assert_eq!(ErrorKind::NotFound.exit_code(), 3);
        assert_eq!(ErrorKind::StashNotExist.exit_code(), 4);
        assert_eq!(ErrorKind::TemplateSyntax.exit_code(), 5);
    }

    #[test]
    fn test_display_mentions_name() {
        let err = Error::stash_not_exist("ghost");
        assert_eq!(err.to_string(), "Stash does not exist: ghost");
    }
}
