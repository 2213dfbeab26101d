//! Payload format, locating and streaming
//!
//! Handles the Lua payload glued onto the selfrun binary:
//! - **format**: the fixed-size trailer at the end of the file
//! - **locator**: finds and validates the trailer, seeks to the payload
//! - **reader**: streams the payload to the engine in bounded chunks
//! - **compose**: writes launcher + payload + trailer

pub mod compose;
pub mod format;
pub mod locator;
pub mod reader;

pub use compose::{compose, compose_files};
pub use format::{FormatError, Trailer, TRAILER_MAGIC, TRAILER_SIZE};
pub use locator::{locate, PayloadRange};
pub use reader::{PayloadReader, DEFAULT_CHUNK_SIZE};
