//! Payload locator
//!
//! Finds the payload glued onto an executable:
//! 1. Read trailer from end of file
//! 2. Validate magic
//! 3. Check the payload range lies before the trailer
//! 4. Seek to the payload and hand the open file over
//!
//! The locator never reads payload bytes; that is the job of
//! [`PayloadReader`](super::PayloadReader).

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::format::{FormatError, Trailer, TRAILER_SIZE};
use crate::error::LoadError;

/// An open executable positioned at the first payload byte.
#[derive(Debug)]
pub struct PayloadRange {
    file: File,
    path: PathBuf,
    offset: u64,
    length: u64,
}

impl PayloadRange {
    /// Path the payload was located in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute offset of the first payload byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Payload size in bytes.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Give up the open file, already positioned at the payload start.
    pub fn into_parts(self) -> (File, PathBuf, u64) {
        (self.file, self.path, self.length)
    }
}

/// Locate the payload glued onto the executable at `path`.
pub fn locate(path: &Path) -> Result<PayloadRange, LoadError> {
    let mut file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let seek_err = |source: io::Error| LoadError::Seek {
        path: path.to_path_buf(),
        source,
    };

    let file_size = file.seek(SeekFrom::End(0)).map_err(seek_err)?;
    let trailer_start = file_size.checked_sub(TRAILER_SIZE as u64).ok_or_else(|| {
        seek_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("file is {file_size} bytes, shorter than a {TRAILER_SIZE}-byte trailer"),
        ))
    })?;
    file.seek(SeekFrom::Start(trailer_start)).map_err(seek_err)?;

    let mut raw = [0u8; TRAILER_SIZE];
    file.read_exact(&mut raw).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let trailer = match Trailer::decode(&raw) {
        Ok(trailer) => trailer,
        Err(FormatError::BadSignature) | Err(FormatError::TooShort(_)) => {
            tracing::debug!(path = %path.display(), "no payload trailer");
            return Err(LoadError::NoPayload {
                path: path.to_path_buf(),
            });
        }
    };

    let out_of_range = || LoadError::OutOfRange {
        path: path.to_path_buf(),
        offset: trailer.payload_offset,
        length: trailer.payload_length,
        limit: trailer_start,
    };
    match trailer.payload_end() {
        Some(end) if end <= trailer_start => {}
        _ => return Err(out_of_range()),
    }

    file.seek(SeekFrom::Start(trailer.payload_offset))
        .map_err(seek_err)?;

    tracing::debug!(
        path = %path.display(),
        offset = trailer.payload_offset,
        length = trailer.payload_length,
        file_size,
        "located payload"
    );

    Ok(PayloadRange {
        file,
        path: path.to_path_buf(),
        offset: trailer.payload_offset,
        length: trailer.payload_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn composed(prefix: &[u8], payload: &[u8]) -> tempfile::NamedTempFile {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(prefix).unwrap();
        temp.write_all(payload).unwrap();
        Trailer::new(prefix.len() as u64, payload.len() as u64)
            .write_to(&mut temp)
            .unwrap();
        temp.flush().unwrap();
        temp
    }

    #[test]
    fn test_locate_payload() {
        let temp = composed(b"\x7fELF launcher bytes", b"print('hi')");
        let range = locate(temp.path()).unwrap();
        assert_eq!(range.offset(), 19);
        assert_eq!(range.len(), 11);
        assert_eq!(range.path(), temp.path());

        let (mut file, _, length) = range.into_parts();
        let mut payload = vec![0u8; length as usize];
        file.read_exact(&mut payload).unwrap();
        assert_eq!(payload, b"print('hi')");
    }

    #[test]
    fn test_locate_empty_payload() {
        let temp = composed(b"launcher", b"");
        let range = locate(temp.path()).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.offset(), 8);
    }

    #[test]
    fn test_detect_no_payload() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), b"an ordinary executable, long enough").unwrap();
        let err = locate(temp.path()).unwrap_err();
        assert!(matches!(err, LoadError::NoPayload { .. }), "{err:?}");
        assert!(err.to_string().starts_with("no Lua program found in "));
    }

    #[test]
    fn test_flipped_signature_byte() {
        let temp = composed(b"launcher", b"return 1");
        let bytes = std::fs::read(temp.path()).unwrap();
        let sig_start = bytes.len() - TRAILER_SIZE;
        for i in 0..8 {
            let mut bad = bytes.clone();
            bad[sig_start + i] = bad[sig_start + i].wrapping_add(1);
            std::fs::write(temp.path(), &bad).unwrap();
            let err = locate(temp.path()).unwrap_err();
            assert!(matches!(err, LoadError::NoPayload { .. }), "byte {i}: {err:?}");
        }
    }

    #[test]
    fn test_truncated_file_is_seek_failure() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), &Trailer::new(0, 0).encode()[..TRAILER_SIZE - 1]).unwrap();
        let err = locate(temp.path()).unwrap_err();
        assert!(matches!(err, LoadError::Seek { .. }), "{err:?}");

        std::fs::write(temp.path(), b"").unwrap();
        let err = locate(temp.path()).unwrap_err();
        assert!(matches!(err, LoadError::Seek { .. }), "{err:?}");
    }

    #[test]
    fn test_missing_file_is_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }), "{err:?}");
        assert!(err.to_string().starts_with("cannot open "));
    }

    #[test]
    fn test_range_past_trailer() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"launcher").unwrap();
        Trailer::new(4, 100).write_to(&mut temp).unwrap();
        temp.flush().unwrap();
        let err = locate(temp.path()).unwrap_err();
        assert!(
            matches!(err, LoadError::OutOfRange { offset: 4, length: 100, limit: 8, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn test_range_overflow() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        Trailer::new(u64::MAX, 2).write_to(&mut temp).unwrap();
        temp.flush().unwrap();
        let err = locate(temp.path()).unwrap_err();
        assert!(matches!(err, LoadError::OutOfRange { .. }), "{err:?}");
    }

    #[test]
    fn test_bare_trailer() {
        let temp = composed(b"", b"");
        let range = locate(temp.path()).unwrap();
        assert_eq!(range.offset(), 0);
        assert!(range.is_empty());
    }
}
