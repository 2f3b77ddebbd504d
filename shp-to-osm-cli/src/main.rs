//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::error::Error;

use env_logger::Env;
use shp_to_osm_cli::CliError;

#[expect(
    clippy::print_stderr,
    reason = "The binary reports fatal errors on stderr before exiting"
)]
fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = shp_to_osm_cli::run() {
        if let CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        eprintln!("shp-to-osm: {err}");
        let mut cause = err.source();
        while let Some(inner) = cause {
            eprintln!("  caused by: {inner}");
            cause = inner.source();
        }
        std::process::exit(1);
    }
}
