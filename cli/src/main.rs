use std::io;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use probe_cli::Args;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    let stdout = io::stdout();
    match probe_cli::run(&args, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("failed to write output: {e}");
            ExitCode::FAILURE
        }
    }
}
