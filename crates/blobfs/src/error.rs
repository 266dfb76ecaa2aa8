// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the file-system bridge and its remote collaborators
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed path: {0}")]
    MalformedPath(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("No permissions: {0}")]
    NoPermissions(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("{store} error: {source}")]
    Backend {
        store: String,
        #[source]
        source: BoxError,
    },
}

/// Standard file-system provider signals that generic callers know how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSystemErrorKind {
    FileNotFound,
    FileExists,
    FileNotADirectory,
    FileIsADirectory,
    NoPermissions,
    Unavailable,
    Unknown,
}

impl Error {
    pub fn malformed_path<S: AsRef<str>>(path: S) -> Self {
        Error::MalformedPath(path.as_ref().to_string())
    }

    pub fn not_found<S: AsRef<str>>(path: S) -> Self {
        Error::NotFound(path.as_ref().to_string())
    }

    pub fn already_exists<S: AsRef<str>>(path: S) -> Self {
        Error::AlreadyExists(path.as_ref().to_string())
    }

    pub fn not_a_directory<S: AsRef<str>>(path: S) -> Self {
        Error::NotADirectory(path.as_ref().to_string())
    }

    pub fn not_a_file<S: AsRef<str>>(path: S) -> Self {
        Error::NotAFile(path.as_ref().to_string())
    }

    pub fn no_permissions<S: AsRef<str>>(message: S) -> Self {
        Error::NoPermissions(message.as_ref().to_string())
    }

    pub fn unsupported<S: AsRef<str>>(message: S) -> Self {
        Error::Unsupported(message.as_ref().to_string())
    }

    pub fn config<S: AsRef<str>>(message: S) -> Self {
        Error::Config(message.as_ref().to_string())
    }

    pub fn backend<S: Into<String>, E: Into<BoxError>>(store: S, source: E) -> Self {
        Error::Backend {
            store: store.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Map onto the provider signal a file explorer or editor understands.
    #[must_use]
    pub fn kind(&self) -> FileSystemErrorKind {
        match self {
            Error::NotFound(_) => FileSystemErrorKind::FileNotFound,
            Error::AlreadyExists(_) => FileSystemErrorKind::FileExists,
            Error::NotADirectory(_) => FileSystemErrorKind::FileNotADirectory,
            Error::NotAFile(_) => FileSystemErrorKind::FileIsADirectory,
            Error::NoPermissions(_) | Error::Unsupported(_) => FileSystemErrorKind::NoPermissions,
            Error::Cancelled | Error::Io(_) | Error::Backend { .. } => {
                FileSystemErrorKind::Unavailable
            }
            Error::MalformedPath(_) | Error::Config(_) => FileSystemErrorKind::Unknown,
        }
    }
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Error {
        match err {
            object_store::Error::NotFound { path, .. } => Error::NotFound(path),
            object_store::Error::AlreadyExists { path, .. } => Error::AlreadyExists(path),
            other => Error::backend("object store", other),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(err.to_string()),
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(err.to_string()),
            _ => Error::Io(err),
        }
    }
}
