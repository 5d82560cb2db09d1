use std::fmt;
use std::path::Path;

use crate::codec::Codec;

/// Whether a run archives its source or restores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
}

impl Mode {
    /// A source ending in a recognized codec suffix is an archive to restore;
    /// anything else is a new thing to compress.
    pub fn resolve(source: &Path) -> Mode {
        if Codec::from_path(source).is_some() {
            Mode::Decompress
        } else {
            Mode::Compress
        }
    }

    /// The path whose suffix decides the codec for this mode.
    pub fn codec_path<'a>(self, source: &'a Path, destination: &'a Path) -> &'a Path {
        match self {
            Mode::Compress => destination,
            Mode::Decompress => source,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Compress => f.write_str("compress"),
            Mode::Decompress => f.write_str("decompress"),
        }
    }
}
