use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "archiver-unpacker",
    version,
    about = "Console archiver/unpacker for .zst and .bz2"
)]
pub struct CliArgs {
    /// Source file or directory, or an archive to unpack
    pub src: PathBuf,
    /// Target file or directory
    pub dst: PathBuf,
    /// Show elapsed time
    #[arg(short, long)]
    pub benchmark: bool,
    /// Compression level: zstd 1..=22 (default 3), bzip2 1..=9 (default 9)
    #[arg(short, long)]
    pub level: Option<i32>,
    /// Directory for the intermediate tar file
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,
    /// Log debug details
    #[arg(short, long)]
    pub verbose: bool,
}
