// Upload client: the one module that talks HTTP. It is intentionally
// small and synchronous; a single blocking POST with the encoded stream
// as the body. The actual wire call sits behind the `Transport` trait
// so tests can substitute a stub and never touch the network.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use reqwest::blocking::{Body, Client};
use reqwest::header::CONTENT_TYPE;

use crate::config::Config;
use crate::error::UploadError;
use crate::multipart::MultipartStream;
use crate::progress::ProgressTracker;

/// temp.sh's documented retention policy.
const EXPIRY_NOTE: &str = "3 days";

/// What gets uploaded: an open file with a known length, or bytes
/// already in memory (the stdin path). Exactly one per upload.
#[derive(Debug)]
pub enum UploadSource {
    File { file: File, len: u64, name: String },
    Bytes { data: Vec<u8>, name: String },
}

impl UploadSource {
    /// Open a file for upload. The checks run in order before the
    /// stream is opened: missing path, then the size ceiling.
    pub fn from_path(path: &Path, max_size: u64) -> Result<Self, UploadError> {
        let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => UploadError::NotFound(path.to_path_buf()),
            _ => UploadError::Io(e),
        })?;
        let len = meta.len();
        if len > max_size {
            return Err(UploadError::TooLarge);
        }
        let file = File::open(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("file")
            .to_string();
        Ok(UploadSource::File { file, len, name })
    }

    /// In-memory source with a synthetic name. No size ceiling here;
    /// stdin uploads are bounded by what fits in memory anyway.
    pub fn from_bytes(data: Vec<u8>, name: &str) -> Self {
        UploadSource::Bytes {
            data,
            name: name.to_string(),
        }
    }

    pub fn len(&self) -> u64 {
        match self {
            UploadSource::File { len, .. } => *len,
            UploadSource::Bytes { data, .. } => data.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self) -> &str {
        match self {
            UploadSource::File { name, .. } => name,
            UploadSource::Bytes { name, .. } => name,
        }
    }

    fn into_parts(self) -> (Box<dyn Read + Send>, u64, String) {
        match self {
            UploadSource::File { file, len, name } => (Box::new(file), len, name),
            UploadSource::Bytes { data, name } => {
                let len = data.len() as u64;
                (Box::new(io::Cursor::new(data)), len, name)
            }
        }
    }
}

/// Successful upload: the access URL plus the fixed retention note.
#[derive(Debug)]
pub struct UploadOutcome {
    pub url: String,
    pub expires: &'static str,
}

/// Status code and body text of a completed HTTP exchange.
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// The wire boundary: send a POST with a given body stream and headers,
/// come back with a status and body text, or fail with a network error.
pub trait Transport {
    fn post(
        &self,
        url: &str,
        content_type: &str,
        content_length: u64,
        body: Box<dyn Read + Send>,
    ) -> Result<HttpResponse, UploadError>;
}

/// Production transport over a blocking reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, UploadError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn post(
        &self,
        url: &str,
        content_type: &str,
        content_length: u64,
        body: Box<dyn Read + Send>,
    ) -> Result<HttpResponse, UploadError> {
        // Body::sized streams the reader and sets Content-Length; the
        // encoded body is never buffered whole.
        let res = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(Body::sized(body, content_length))
            .send()?;
        let status = res.status().as_u16();
        let body = res.text().unwrap_or_else(|_| "".into());
        Ok(HttpResponse { status, body })
    }
}

/// Drives one upload: encode the source, stream it through the
/// transport, track progress, interpret the response.
pub struct UploadClient<T: Transport> {
    transport: T,
    config: Config,
}

impl UploadClient<HttpTransport> {
    pub fn new(config: Config) -> Result<Self, UploadError> {
        let transport = HttpTransport::new(&config)?;
        Ok(UploadClient { transport, config })
    }
}

impl<T: Transport> UploadClient<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        UploadClient { transport, config }
    }

    /// Upload with the progress line on stdout. Blocks until the
    /// transport completes or fails.
    pub fn upload(&self, source: UploadSource) -> Result<UploadOutcome, UploadError> {
        self.upload_with_progress(source, io::stdout())
    }

    /// Same as `upload`, but the progress line goes to `progress_out`.
    /// Tests pass a `Vec<u8>` and stay silent.
    pub fn upload_with_progress<W>(
        &self,
        source: UploadSource,
        progress_out: W,
    ) -> Result<UploadOutcome, UploadError>
    where
        W: Write + Send + 'static,
    {
        let (reader, payload_len, name) = source.into_parts();
        let stream = MultipartStream::new(reader, payload_len, &name);
        let content_type = stream.content_type();
        let total = stream.total_len();

        // The body stream must be 'static, so the tracker it reports to
        // is shared through an Arc. Everything still runs on this one
        // thread; the lock is never contended.
        let tracker = Arc::new(Mutex::new(ProgressTracker::with_writer(total, progress_out)));
        let hook_tracker = Arc::clone(&tracker);
        let stream = stream.on_read(move |cumulative| {
            hook_tracker.lock().unwrap().on_bytes_read(cumulative);
        });

        let result = self
            .transport
            .post(&self.config.upload_url, &content_type, total, Box::new(stream));

        let mut tracker = tracker.lock().unwrap();
        match result {
            Ok(res) if res.status == 200 => {
                tracker.finish();
                Ok(UploadOutcome {
                    url: res.body.trim().to_string(),
                    expires: EXPIRY_NOTE,
                })
            }
            Ok(res) => {
                tracker.fail();
                Err(UploadError::Server(res.status))
            }
            Err(e) => {
                tracker.fail();
                Err(e)
            }
        }
    }
}
