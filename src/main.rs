mod cli;

use std::process::ExitCode;

use archiver_unpacker::{ArchiveRequest, run};
use clap::Parser;
use cli::CliArgs;
use colored::*;
use log::LevelFilter;

fn main() -> ExitCode {
    match execute(CliArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: CliArgs) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        builder.filter(None, LevelFilter::Info);
    }
    if args.verbose {
        builder.filter(None, LevelFilter::Debug);
    }
    builder.try_init()?;

    let request = ArchiveRequest {
        source: args.src,
        destination: args.dst,
        benchmark: args.benchmark,
        level: args.level,
        staging_dir: args.temp_dir,
    };

    run(&request)?;
    Ok(())
}
