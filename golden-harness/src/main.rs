//! Golden harness binary.
//!
//! Entry point for the `golden-run` command.

use std::io;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::CommandFactory;
use golden_fs::RealFilesystem;
use golden_harness::exit::{codes, exit_code};
use golden_harness::{
    Cli, Harness, InterruptFlag, Logger, ProcessSubject, RealSleeper, StderrLogger, SubjectCommand,
    TapReporter, Verbosity,
};

fn main() -> ExitCode {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code as u8),
    };

    if let Err(e) = cli.validate() {
        eprintln!("error: {}", e);
        print_usage();
        return ExitCode::from(codes::INVALID_ARGS as u8);
    }

    let config = cli.to_config();
    let logger = StderrLogger::new(Verbosity::from(cli.verbose));

    // Interrupts kill the subject instead of orphaning it
    let interrupt = InterruptFlag::install();

    let subject = ProcessSubject::new(
        SubjectCommand::new(&config.binary),
        RealSleeper::new(),
        interrupt,
    )
    .with_timeout(config.timeout);
    logger.detail(&format!("subject: {}", subject.command()));

    let fs = RealFilesystem;
    let harness = Harness::new(&config, &fs, &subject, &logger);
    let mut reporter = TapReporter::new(io::stdout().lock(), config.color);

    match harness.run(&cli.fixture, &mut reporter) {
        Ok(outcome) => ExitCode::from(exit_code(&outcome) as u8),
        Err(e) => {
            eprintln!("error: cannot write TAP output: {}", e);
            ExitCode::from(codes::IO_ERROR as u8)
        }
    }
}

/// Parse `std::env::args`, printing help, version or usage as clap would
/// but exiting with `INVALID_ARGS` on any usage error.
fn parse_args() -> Result<Cli, i32> {
    match golden_harness::parse_from(std::env::args_os()) {
        Ok(cli) => Ok(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            Err(codes::SUCCESS)
        }
        Err(e) => {
            let _ = e.print();
            print_usage();
            Err(codes::INVALID_ARGS)
        }
    }
}

fn print_usage() {
    eprintln!();
    eprintln!("{}", Cli::command().render_long_help());
}
