// UI layer: everything printed for a human, apart from the progress
// line itself (which `progress` owns because it has to interleave with
// byte-read callbacks). Keeping the strings in one place makes the CLI
// output easy to review at a glance.

use crate::api::UploadOutcome;
use crate::progress::format_size;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_help() {
    println!(
        "\
tempsh-cli v{VERSION} - temporary file upload tool

usage:
  tempsh <file>              upload a file
  cat file | tempsh          upload from stdin
  tempsh -h                  show this help
  tempsh -v                  show version

examples:
  tempsh document.pdf
  echo \"hello world\" | tempsh
  cat image.png | tempsh

powered by temp.sh
files expire after 3 days | max size 4gb"
    );
}

pub fn print_version() {
    println!("tempsh-cli v{VERSION}");
}

pub fn announce_file(name: &str, size: u64) {
    println!("uploading {name} ({})...", format_size(size as f64));
}

pub fn announce_stdin(len: usize) {
    println!("uploading {len} bytes...");
}

pub fn print_success(outcome: &UploadOutcome) {
    println!("success!");
    println!("url: {}", outcome.url);
    println!("expires: {}", outcome.expires);
}
