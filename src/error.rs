use std::path::PathBuf;
use thiserror::Error;

use crate::codec::Codec;
use crate::mode::Mode;

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("source path '{}' does not exist", .0.display())]
    SourceNotFound(PathBuf),

    #[error("{}", unsupported_message(.path, .mode))]
    UnsupportedCodec { path: PathBuf, mode: Mode },

    #[error("level {level} is out of range for {codec} (expected {range:?})", range = .codec.level_range())]
    InvalidLevel { codec: Codec, level: i32 },

    #[error("'{}' is not a valid tar container", .path.display())]
    Container {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{codec} failed on '{}'", .path.display())]
    Codec {
        codec: Codec,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error at '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create staging file")]
    Staging(#[source] std::io::Error),

    #[error("error archiving directory '{}'", .path.display())]
    ArchiveDirectory {
        path: PathBuf,
        #[source]
        source: Box<ArchiveError>,
    },

    #[error("error unpacking directory '{}'", .path.display())]
    UnpackDirectory {
        path: PathBuf,
        #[source]
        source: Box<ArchiveError>,
    },
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }
}

fn unsupported_message(path: &std::path::Path, mode: &Mode) -> String {
    match mode {
        Mode::Compress => format!(
            "a .zst or .bz2 extension is required to archive into '{}'",
            path.display()
        ),
        Mode::Decompress => format!("unknown archive format '{}'", path.display()),
    }
}
