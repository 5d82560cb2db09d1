//! Whole-buffer codecs behind the `.zst` and `.bz2` suffixes.
//!
//! Every call reads its entire input into memory and produces the entire
//! output in one go, so memory use grows linearly with the input. There is
//! no chunked or streaming variant.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::{Duration, Instant};

use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{ArchiveError, Result};
use crate::mode::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Zstandard frames, `.zst`.
    Zstd,
    /// bzip2 block-sort streams, `.bz2`.
    Bzip2,
}

impl Codec {
    pub const ALL: [Codec; 2] = [Codec::Zstd, Codec::Bzip2];

    /// Canonical filename suffix, without the dot.
    pub const fn suffix(self) -> &'static str {
        match self {
            Codec::Zstd => "zst",
            Codec::Bzip2 => "bz2",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Codec::Zstd => "zstd",
            Codec::Bzip2 => "bzip2",
        }
    }

    /// Matches the end of the file name against `.zst`/`.bz2`,
    /// case-sensitively. A bare `.zst` name counts as well.
    pub fn from_path(path: &Path) -> Option<Codec> {
        let name = path.file_name()?.to_str()?;
        Codec::ALL.into_iter().find(|codec| {
            name.strip_suffix(codec.suffix())
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }

    pub fn select(path: &Path, mode: Mode) -> Result<Codec> {
        Codec::from_path(path).ok_or_else(|| ArchiveError::UnsupportedCodec {
            path: path.to_path_buf(),
            mode,
        })
    }

    pub fn level_range(self) -> RangeInclusive<i32> {
        match self {
            Codec::Zstd => 1..=22,
            Codec::Bzip2 => 1..=9,
        }
    }

    pub fn default_level(self) -> i32 {
        match self {
            Codec::Zstd => zstd::DEFAULT_COMPRESSION_LEVEL,
            Codec::Bzip2 => 9,
        }
    }

    /// Resolves the optional user level against this codec's range.
    pub fn check_level(self, level: Option<i32>) -> Result<i32> {
        let level = level.unwrap_or(self.default_level());
        if self.level_range().contains(&level) {
            Ok(level)
        } else {
            Err(ArchiveError::InvalidLevel { codec: self, level })
        }
    }

    pub fn compress(self, data: &[u8], level: i32) -> io::Result<Vec<u8>> {
        match self {
            Codec::Zstd => zstd::stream::encode_all(data, level),
            Codec::Bzip2 => {
                let compression = bzip2::Compression::new(level.unsigned_abs());
                let mut encoder = BzEncoder::new(Vec::new(), compression);
                encoder.write_all(data)?;
                encoder.finish()
            }
        }
    }

    pub fn decompress(self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Codec::Zstd => zstd::stream::decode_all(data),
            Codec::Bzip2 => {
                let mut out = Vec::new();
                MultiBzDecoder::new(data).read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CodecOptions {
    pub level: i32,
    pub benchmark: bool,
}

impl CodecOptions {
    pub fn new(codec: Codec, level: Option<i32>, benchmark: bool) -> Result<Self> {
        Ok(CodecOptions {
            level: codec.check_level(level)?,
            benchmark,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Stats {
    pub input_size: u64,
    pub output_size: u64,
    pub duration: Duration,
}

impl Stats {
    pub fn print(&self, mode: Mode) {
        let (title, in_label, out_label, time_label) = match mode {
            Mode::Compress => (
                "📊 Compression complete!",
                "Original size:    ",
                "Compressed size:  ",
                "Compression time:",
            ),
            Mode::Decompress => (
                "📊 Decompression complete!",
                "Compressed size:  ",
                "Decompressed size:",
                "Decompression time:",
            ),
        };
        let secs = self.duration.as_secs_f64();
        println!("\n{}", title.bold().green());
        println!("{} {:.2} MB", in_label.blue(), mebibytes(self.input_size));
        println!("{} {:.2} MB", out_label.blue(), mebibytes(self.output_size));
        if self.input_size > 0 {
            let ratio = self.output_size as f64 / self.input_size as f64;
            println!("{} {:.2}%", "Ratio:            ".yellow(), ratio * 100.0);
        }
        println!("{} {:.2}s", time_label.magenta(), secs);
        let speed = mebibytes(self.input_size) / secs.max(1e-9);
        println!("{} {:.2} MB/s", "Throughput:       ".cyan(), speed);
    }
}

fn mebibytes(bytes: u64) -> f64 {
    bytes as f64 / 1_048_576.0
}

pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    codec: Codec,
    options: &CodecOptions,
) -> Result<Stats> {
    transform_file(input_path, output_path, codec, options, |data| {
        codec.compress(data, options.level)
    })
}

pub fn decompress_file(
    input_path: &Path,
    output_path: &Path,
    codec: Codec,
    options: &CodecOptions,
) -> Result<Stats> {
    transform_file(input_path, output_path, codec, options, |data| {
        codec.decompress(data)
    })
}

// The output is only written once the whole transform has succeeded, so a
// rejected input never leaves a partial destination behind.
fn transform_file<F>(
    input_path: &Path,
    output_path: &Path,
    codec: Codec,
    options: &CodecOptions,
    transform: F,
) -> Result<Stats>
where
    F: FnOnce(&[u8]) -> io::Result<Vec<u8>>,
{
    let start = Instant::now();
    let data = fs::read(input_path).map_err(|e| ArchiveError::io(input_path, e))?;

    let bar = progress_bar(input_path, data.len() as u64, options.benchmark);
    let result = transform(&data).map_err(|source| ArchiveError::Codec {
        codec,
        path: input_path.to_path_buf(),
        source,
    })?;
    bar.set_position(data.len() as u64);
    bar.finish();

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
    }
    fs::write(output_path, &result).map_err(|e| ArchiveError::io(output_path, e))?;

    Ok(Stats {
        input_size: data.len() as u64,
        output_size: result.len() as u64,
        duration: start.elapsed(),
    })
}

fn progress_bar(input_path: &Path, len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    bar.set_prefix(
        input_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned(),
    );
    let style = ProgressStyle::with_template(
        "{prefix:.dim}  [{elapsed_precise}] [{bar:30.cyan/blue}] {percent:>3}%",
    )
    .map(|style| style.progress_chars("=> "))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}
