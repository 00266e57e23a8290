//! Command line front-end for checking a single log.

use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use playcheck::{CheckError, Checker, Compression, ErrorCode};

/// Check a gameplay log against a configured task.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Path to the top-level checker configuration
    config: PathBuf,

    /// Name of the task to check the log against
    task: String,

    /// Salt mixed into the signature code
    #[arg(allow_negative_numbers = true)]
    salt: i32,

    /// Path to the gameplay log; `.zip` files are unwrapped
    log: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            process::exit(0);
        }
        Err(err) => {
            let _ = err.print();
            // Wrong invocation, distinct from every checking outcome.
            process::exit(99);
        }
    };

    process::exit(run(&args) as i32);
}

fn run(args: &Args) -> ErrorCode {
    let checker = match Checker::load(&args.config) {
        Ok(checker) => checker,
        Err(err) => return report(&err),
    };

    let compression = if args.log.extension().map_or(false, |ext| ext == "zip") {
        Compression::Zip
    } else {
        Compression::None
    };

    match checker.check_file(&args.task, args.salt, &args.log, compression) {
        Ok(verdict) => {
            println!("Checking completed!");
            println!("Result code: {}", verdict.result());
            println!("Code string: {}", verdict.signature());
            ErrorCode::NoError
        }
        Err(err) => report(&err),
    }
}

fn report(error: &CheckError) -> ErrorCode {
    let code = error.code();
    eprintln!("{}", error);
    println!("Program checking error: {}", code);
    println!("Result code: 0");
    code
}
