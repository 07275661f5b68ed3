// Configuration: the handful of fixed values the tool runs with. They
// live in one struct built once in `main` and passed down explicitly,
// so nothing in the upload path reaches for module-level globals.

use std::time::Duration;

/// Fixed settings for one run of the tool. The endpoint and limits are
/// temp.sh's documented contract, not something the user configures.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the multipart POST goes.
    pub upload_url: String,
    /// Hard ceiling on file size, checked before the stream is opened.
    /// temp.sh rejects anything over 4 GiB.
    pub max_file_size: u64,
    /// Overall request timeout enforced by the HTTP client.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            upload_url: "https://temp.sh/upload".to_string(),
            max_file_size: 4 * 1024 * 1024 * 1024,
            request_timeout: Duration::from_secs(300),
        }
    }
}
