// src/sink.rs
//
// Output destinations for rendered HTML.

use std::io::{self, Write};

/// Append-only destination for rendered HTML.
///
/// Rendering never fails, so writes are infallible from the renderer's point
/// of view; sinks backed by fallible I/O keep the first error for later.
pub trait HtmlSink {
    fn write_bytes(&mut self, bytes: &[u8]);

    fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }
}

impl HtmlSink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Adapts any [`io::Write`] into an [`HtmlSink`].
///
/// After the first failed write every later write is dropped; the error is
/// returned by [`IoSink::finish`].
pub struct IoSink<W: Write> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// Flush and hand back the writer, or the first error seen.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> HtmlSink for IoSink<W> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.inner.write_all(bytes) {
            log::warn!("output write failed: {err}");
            self.error = Some(err);
        }
    }
}
