//! fileserver CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. Configuration,
//! logging and the storage backend are all set up by the command itself.

use fileserver::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
