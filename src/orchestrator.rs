use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::codec::{self, Codec, CodecOptions, Stats};
use crate::container;
use crate::error::{ArchiveError, Result};
use crate::mode::Mode;
use crate::staging::StagingFile;

const STAGING_SUFFIX: &str = ".tar";

/// One invocation's worth of input, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub benchmark: bool,
    /// Compression level; `None` picks the codec default.
    pub level: Option<i32>,
    /// Where staging files go; `None` means the system temp directory.
    pub staging_dir: Option<PathBuf>,
}

impl ArchiveRequest {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        ArchiveRequest {
            source: source.into(),
            destination: destination.into(),
            benchmark: false,
            level: None,
            staging_dir: None,
        }
    }

    fn acquire_staging(&self) -> Result<StagingFile> {
        let staging = match &self.staging_dir {
            Some(dir) => StagingFile::acquire_in(dir, STAGING_SUFFIX),
            None => StagingFile::acquire(STAGING_SUFFIX),
        };
        staging.map_err(ArchiveError::Staging)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    File,
    Directory,
}

#[derive(Debug, Clone, Copy)]
pub struct Summary {
    pub mode: Mode,
    pub codec: Codec,
    pub kind: Kind,
    pub stats: Stats,
}

/// Archives or restores `request.source` into `request.destination`.
///
/// Mode and codec are resolved here once from the path suffixes; everything
/// below works with the typed values.
pub fn run(request: &ArchiveRequest) -> Result<Summary> {
    let source = request.source.as_path();
    let destination = request.destination.as_path();

    if !source.exists() {
        return Err(ArchiveError::SourceNotFound(source.to_path_buf()));
    }

    let mode = Mode::resolve(source);
    let codec = Codec::select(mode.codec_path(source, destination), mode)?;
    debug!("mode {mode}, codec {codec}");

    let summary = match mode {
        Mode::Compress => {
            let options = CodecOptions::new(codec, request.level, request.benchmark)?;
            if source.is_dir() {
                compress_directory(request, codec, &options).map_err(|e| {
                    ArchiveError::ArchiveDirectory {
                        path: source.to_path_buf(),
                        source: Box::new(e),
                    }
                })?
            } else {
                let stats = codec::compress_file(source, destination, codec, &options)?;
                Summary {
                    mode,
                    codec,
                    kind: Kind::File,
                    stats,
                }
            }
        }
        Mode::Decompress => {
            if request.level.is_some() {
                warn!("--level has no effect when decompressing");
            }
            let options = CodecOptions {
                level: codec.default_level(),
                benchmark: request.benchmark,
            };
            decompress(request, codec, &options)?
        }
    };

    info!(
        "{} {} {} -> {}",
        match summary.mode {
            Mode::Compress => "archived",
            Mode::Decompress => "restored",
        },
        match summary.kind {
            Kind::File => "file",
            Kind::Directory => "directory",
        },
        source.display(),
        destination.display()
    );
    if request.benchmark {
        summary.stats.print(summary.mode);
    }
    Ok(summary)
}

fn compress_directory(
    request: &ArchiveRequest,
    codec: Codec,
    options: &CodecOptions,
) -> Result<Summary> {
    let staging = request.acquire_staging()?;
    let outcome = pack_and_compress(
        &request.source,
        &request.destination,
        &staging,
        codec,
        options,
    );
    let released = staging.release().map_err(ArchiveError::Staging);
    let stats = outcome?;
    released?;
    Ok(Summary {
        mode: Mode::Compress,
        codec,
        kind: Kind::Directory,
        stats,
    })
}

fn pack_and_compress(
    source: &Path,
    destination: &Path,
    staging: &StagingFile,
    codec: Codec,
    options: &CodecOptions,
) -> Result<Stats> {
    let entries =
        container::pack(source, staging.path()).map_err(|e| ArchiveError::io(source, e))?;
    debug!("packed {entries} entries into {}", staging.path().display());
    codec::compress_file(staging.path(), destination, codec, options)
}

fn decompress(request: &ArchiveRequest, codec: Codec, options: &CodecOptions) -> Result<Summary> {
    let staging = request.acquire_staging()?;
    let outcome = decompress_staged(
        &request.source,
        &request.destination,
        &staging,
        codec,
        options,
    );
    let released = staging.release().map_err(ArchiveError::Staging);
    let (kind, stats) = outcome?;
    released?;
    Ok(Summary {
        mode: Mode::Decompress,
        codec,
        kind,
        stats,
    })
}

fn decompress_staged(
    source: &Path,
    destination: &Path,
    staging: &StagingFile,
    codec: Codec,
    options: &CodecOptions,
) -> Result<(Kind, Stats)> {
    let stats = codec::decompress_file(source, staging.path(), codec, options)?;

    let is_container = container::is_container(staging.path())
        .map_err(|e| ArchiveError::io(staging.path(), e))?;
    if !is_container {
        debug!("decompressed stream is a plain file");
        fs::copy(staging.path(), destination).map_err(|e| ArchiveError::io(destination, e))?;
        return Ok((Kind::File, stats));
    }

    unpack_into(staging.path(), destination).map_err(|e| ArchiveError::UnpackDirectory {
        path: source.to_path_buf(),
        source: Box::new(e),
    })?;
    Ok((Kind::Directory, stats))
}

fn unpack_into(staged: &Path, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination).map_err(|e| ArchiveError::io(destination, e))?;
    let entries =
        container::unpack(staged, destination).map_err(|source| ArchiveError::Container {
            path: staged.to_path_buf(),
            source,
        })?;
    debug!("unpacked {entries} entries into {}", destination.display());
    Ok(())
}
