// Streaming multipart/form-data encoder. The transport pulls bytes out
// of this with `Read`; the payload is never collected into one buffer,
// so a multi-gigabyte file costs a chunk-sized window of memory. Each
// read reports the running total of body bytes to an optional hook,
// which is how upload progress is observed without the HTTP client's
// cooperation.

use std::io::{self, Cursor, Read};

use uuid::Uuid;

/// Called after every successful read with the cumulative number of
/// encoded body bytes handed to the transport so far.
pub type ProgressHook = Box<dyn FnMut(u64) + Send>;

/// A `multipart/form-data` body with a single field named `file`,
/// produced lazily as the transport reads it.
///
/// The boundary token is a fresh v4 UUID. We take the usual shortcut of
/// trusting its uniqueness instead of scanning the payload for
/// collisions.
pub struct MultipartStream<R> {
    head: Cursor<Vec<u8>>,
    payload: R,
    tail: Cursor<Vec<u8>>,
    boundary: String,
    payload_len: u64,
    bytes_read: u64,
    hook: Option<ProgressHook>,
}

impl<R: Read> MultipartStream<R> {
    /// Wrap `payload` (whose length must be known up front) as a form
    /// field named `file` with the given display name and content type
    /// `application/octet-stream`.
    pub fn new(payload: R, payload_len: u64, filename: &str) -> Self {
        let boundary = format!("tempsh-{}", Uuid::new_v4().simple());
        let head = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        );
        let tail = format!("\r\n--{boundary}--\r\n");
        MultipartStream {
            head: Cursor::new(head.into_bytes()),
            payload,
            tail: Cursor::new(tail.into_bytes()),
            boundary,
            payload_len,
            bytes_read: 0,
            hook: None,
        }
    }

    /// Attach a progress hook. Without one the stream is still a valid
    /// encoder, it just reports to nobody.
    pub fn on_read(mut self, hook: impl FnMut(u64) + Send + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Header value for `Content-Type`, carrying the boundary token.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Exact encoded body length: framing plus payload. Lets the
    /// transport send a Content-Length and the tracker report a
    /// percentage.
    pub fn total_len(&self) -> u64 {
        self.head.get_ref().len() as u64 + self.payload_len + self.tail.get_ref().len() as u64
    }
}

impl<R: Read> Read for MultipartStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Emit the three sections in order. A single call fills from at
        // most one section; the transport just calls again.
        let mut n = self.head.read(buf)?;
        if n == 0 {
            n = self.payload.read(buf)?;
        }
        if n == 0 {
            n = self.tail.read(buf)?;
        }
        if n > 0 {
            self.bytes_read += n as u64;
            if let Some(hook) = self.hook.as_mut() {
                hook(self.bytes_read);
            }
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn encode_all(stream: &mut MultipartStream<impl Read>) -> Vec<u8> {
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn frames_a_single_file_field() {
        let payload = b"hello world";
        let mut stream = MultipartStream::new(&payload[..], payload.len() as u64, "greeting.txt");
        let boundary = stream.boundary.clone();
        let body = String::from_utf8(encode_all(&mut stream)).unwrap();

        assert!(body.starts_with(&format!("--{boundary}\r\n")));
        assert!(body.contains("Content-Disposition: form-data; name=\"file\"; filename=\"greeting.txt\"\r\n"));
        assert!(body.contains("Content-Type: application/octet-stream\r\n\r\nhello world"));
        assert!(body.ends_with(&format!("\r\n--{boundary}--\r\n")));
    }

    #[test]
    fn content_type_carries_the_boundary() {
        let stream = MultipartStream::new(&b"x"[..], 1, "x.bin");
        let ct = stream.content_type();
        assert!(ct.starts_with("multipart/form-data; boundary="));
        assert!(ct.ends_with(&stream.boundary));
    }

    #[test]
    fn total_len_matches_the_drained_body() {
        let payload = vec![0u8; 4096];
        let mut stream = MultipartStream::new(&payload[..], payload.len() as u64, "zeros.bin");
        let expected = stream.total_len();
        let body = encode_all(&mut stream);
        assert_eq!(body.len() as u64, expected);
    }

    #[test]
    fn hook_sees_a_cumulative_running_total() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_hook = Arc::clone(&seen);
        let payload = vec![7u8; 1000];
        let mut stream = MultipartStream::new(&payload[..], payload.len() as u64, "p.bin")
            .on_read(move |cumulative| seen_in_hook.lock().unwrap().push(cumulative));
        let total = stream.total_len();

        // Small destination buffer forces many incremental reads.
        let mut buf = [0u8; 64];
        loop {
            if stream.read(&mut buf).unwrap() == 0 {
                break;
            }
        }

        let seen = seen.lock().unwrap();
        assert!(seen.len() > 1);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*seen.last().unwrap(), total);
    }

    #[test]
    fn boundaries_are_unique_per_stream() {
        let a = MultipartStream::new(&b""[..], 0, "a");
        let b = MultipartStream::new(&b""[..], 0, "b");
        assert_ne!(a.boundary, b.boundary);
    }
}
