//! Binary payload format
//!
//! Defines the trailer that glues a Lua payload onto a launcher executable.
//!
//! ```text
//! ┌─────────────────────────┐
//! │  launcher (unchanged)   │  ← ordinary selfrun executable
//! ├─────────────────────────┤
//! │  Payload                │  ← Lua source or precompiled chunk
//! ├─────────────────────────┤
//! │  Trailer                │  ← fixed-size, at very end of file
//! └─────────────────────────┘
//! ```
//!
//! Trailer layout (24 bytes, integers little-endian):
//!
//! ```text
//! offset  size  field
//!      0     8  signature       b"%%glue:L"
//!      8     8  payload_offset  u64
//!     16     8  payload_length  u64
//! ```

use std::io::{self, Write};

/// Magic bytes identifying a payload trailer.
pub const TRAILER_MAGIC: [u8; 8] = *b"%%glue:L";

/// Size of the trailer in bytes.
pub const TRAILER_SIZE: usize = TRAILER_MAGIC.len() + 2 * std::mem::size_of::<u64>();

const OFFSET_FIELD: usize = TRAILER_MAGIC.len();
const LENGTH_FIELD: usize = OFFSET_FIELD + 8;

/// Errors produced while decoding a trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Fewer than `TRAILER_SIZE` bytes were supplied.
    #[error("trailer needs {} bytes, got {0}", TRAILER_SIZE)]
    TooShort(usize),

    /// The signature field does not match `TRAILER_MAGIC`.
    #[error("trailer signature mismatch")]
    BadSignature,
}

/// Fixed-size trailer at the very end of a composed executable.
///
/// To detect if an executable carries a payload, read the last
/// `TRAILER_SIZE` bytes and decode them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// Magic bytes: b"%%glue:L"
    pub magic: [u8; 8],

    /// Offset from the start of the file to the start of the payload.
    /// This equals the size of the launcher.
    pub payload_offset: u64,

    /// Size of the payload in bytes.
    pub payload_length: u64,
}

impl Trailer {
    /// Trailer describing a payload of `payload_length` bytes placed right
    /// after a launcher of `payload_offset` bytes.
    pub fn new(payload_offset: u64, payload_length: u64) -> Self {
        Self {
            magic: TRAILER_MAGIC,
            payload_offset,
            payload_length,
        }
    }

    /// Check if this trailer has the correct magic bytes.
    pub fn is_valid(&self) -> bool {
        self.magic == TRAILER_MAGIC
    }

    /// Offset one past the last payload byte, or `None` on overflow.
    pub fn payload_end(&self) -> Option<u64> {
        self.payload_offset.checked_add(self.payload_length)
    }

    /// Decode a trailer from the first `TRAILER_SIZE` bytes of `bytes`.
    ///
    /// Only the signature is checked; whether the offsets make sense for a
    /// particular file is up to the caller.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        let Some(raw) = bytes.get(..TRAILER_SIZE) else {
            return Err(FormatError::TooShort(bytes.len()));
        };

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&raw[..OFFSET_FIELD]);
        if magic != TRAILER_MAGIC {
            return Err(FormatError::BadSignature);
        }

        Ok(Self {
            magic,
            payload_offset: read_u64(&raw[OFFSET_FIELD..LENGTH_FIELD]),
            payload_length: read_u64(&raw[LENGTH_FIELD..TRAILER_SIZE]),
        })
    }

    /// Encode the trailer into its on-disk representation.
    pub fn encode(&self) -> [u8; TRAILER_SIZE] {
        let mut bytes = [0u8; TRAILER_SIZE];
        bytes[..OFFSET_FIELD].copy_from_slice(&self.magic);
        bytes[OFFSET_FIELD..LENGTH_FIELD].copy_from_slice(&self.payload_offset.to_le_bytes());
        bytes[LENGTH_FIELD..].copy_from_slice(&self.payload_length.to_le_bytes());
        bytes
    }

    /// Write the trailer to a writer.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.encode())
    }
}

fn read_u64(field: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(field);
    u64::from_le_bytes(buf)
}
