// Entrypoint for the CLI.
// - Keeps `main` small: match the one flag or positional argument,
//   build a `Config`, hand off to the library.
// - Exit codes: 0 for help/version and successful uploads, 1 for any
//   failure, reported as a single `error: ...` line on stderr.

use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::process;

use anyhow::Result;
use tempsh_cli::api::{UploadClient, UploadSource};
use tempsh_cli::config::Config;
use tempsh_cli::error::UploadError;
use tempsh_cli::ui;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::default();
    match env::args().nth(1).as_deref() {
        Some("-h") | Some("--help") | Some("help") => {
            ui::print_help();
            Ok(())
        }
        Some("-v") | Some("--version") | Some("version") => {
            ui::print_version();
            Ok(())
        }
        Some(path) => upload_file(config, Path::new(path)),
        None => {
            // No argument: piped stdin is an upload, an interactive
            // terminal gets the usage text.
            if io::stdin().is_terminal() {
                ui::print_help();
                Ok(())
            } else {
                upload_stdin(config)
            }
        }
    }
}

fn upload_file(config: Config, path: &Path) -> Result<()> {
    let source = UploadSource::from_path(path, config.max_file_size)?;
    ui::announce_file(source.name(), source.len());
    let client = UploadClient::new(config)?;
    let outcome = client.upload(source)?;
    ui::print_success(&outcome);
    Ok(())
}

fn upload_stdin(config: Config) -> Result<()> {
    println!("reading from stdin (ctrl+d to end)...");
    let mut data = Vec::new();
    io::stdin().lock().read_to_end(&mut data)?;
    if data.is_empty() {
        return Err(UploadError::EmptyInput.into());
    }
    ui::announce_stdin(data.len());
    let client = UploadClient::new(config)?;
    let outcome = client.upload(UploadSource::from_bytes(data, "stdin.txt"))?;
    ui::print_success(&outcome);
    Ok(())
}
