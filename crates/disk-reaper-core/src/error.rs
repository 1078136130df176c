use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Volume unavailable for {path}: {source}")]
    VolumeUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File vanished before it could be processed: {0}")]
    FileVanished(PathBuf),

    #[error("Access denied to {path}: {source}")]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(PathBuf),

    #[error("Invalid target configuration: {0}")]
    ConfigInvalid(String),

    #[error("No target matches {0}")]
    TargetNotFound(String),

    #[error("Scheduler is already running")]
    AlreadyRunning,

    #[error("Could not start sweep thread: {0}")]
    Thread(#[source] io::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Target list error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Classify a raw io error raised while touching `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::FileVanished(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Error::AccessDenied {
                path: path.to_path_buf(),
                source: err,
            },
            io::ErrorKind::DirectoryNotEmpty => Error::DirectoryNotEmpty(path.to_path_buf()),
            _ => Error::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Errors caused by another process racing us on the same entry.
    pub fn is_vanished(&self) -> bool {
        matches!(self, Error::FileVanished(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classifies_by_kind() {
        let path = Path::new("/tmp/x");
        let err = Error::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_vanished());

        let err = Error::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, Error::AccessDenied { .. }));

        let err = Error::from_io(path, io::Error::from(io::ErrorKind::DirectoryNotEmpty));
        assert!(matches!(err, Error::DirectoryNotEmpty(_)));

        let err = Error::from_io(path, io::Error::from(io::ErrorKind::Other));
        assert!(matches!(err, Error::Io { .. }));
    }
}
