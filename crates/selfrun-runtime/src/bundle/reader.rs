//! Streaming payload reader
//!
//! Pulls the payload out of the executable in bounded chunks so the engine
//! can compile it without the whole payload ever sitting in memory.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::locator::PayloadRange;
use crate::engine::ChunkSource;
use crate::error::LoadError;

/// Default chunk size handed to the engine per pull.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Read cursor over one payload.
///
/// Owns the open file for the duration of a single load; dropping the reader
/// closes it.
pub struct PayloadReader<R = File> {
    inner: R,
    path: PathBuf,
    remaining: u64,
    buf: Box<[u8]>,
}

impl PayloadReader<File> {
    /// Start streaming the payload the locator found.
    pub fn from_range(range: PayloadRange, chunk_size: usize) -> Self {
        let (file, path, length) = range.into_parts();
        Self::new(file, path, length, chunk_size)
    }
}

impl<R: Read> PayloadReader<R> {
    /// Stream `length` bytes from `inner`, which must already be positioned
    /// at the first payload byte. `path` is only used in error messages.
    pub fn new(inner: R, path: impl Into<PathBuf>, length: u64, chunk_size: usize) -> Self {
        Self {
            inner,
            path: path.into(),
            remaining: length,
            buf: vec![0u8; chunk_size.max(1)].into_boxed_slice(),
        }
    }

    /// Payload bytes not yet delivered.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Path of the file being streamed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Produce the next chunk, or `None` once the payload is exhausted.
    ///
    /// Returns `None` without touching the underlying reader when nothing
    /// remains. Running out of file before the payload is complete is a read
    /// error, not end-of-stream.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>, LoadError> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let want = self.remaining.min(self.buf.len() as u64) as usize;
        let n = loop {
            match self.inner.read(&mut self.buf[..want]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(LoadError::Read {
                        path: self.path.clone(),
                        source,
                    })
                }
            }
        };

        if n == 0 {
            return Err(LoadError::Read {
                path: self.path.clone(),
                source: io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("payload truncated, {} bytes missing", self.remaining),
                ),
            });
        }

        self.remaining -= n as u64;
        tracing::trace!(chunk = n, remaining = self.remaining, "payload chunk");
        Ok(Some(&self.buf[..n]))
    }
}

impl<R: Read> ChunkSource for PayloadReader<R> {
    fn next_chunk(&mut self) -> Result<Option<&[u8]>, LoadError> {
        PayloadReader::next_chunk(self)
    }
}
