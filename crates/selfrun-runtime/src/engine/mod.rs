//! Scripting engine interface.
//!
//! The bootstrap only talks to the engine through [`Engine`], so the loading
//! protocol can be driven against a real Lua state or a recording stand-in.

pub mod lua;

pub use lua::{LuaEngine, NativeModule};

use crate::args::Arguments;
use crate::error::{LaunchError, LoadError};

/// Pull-based byte source for incremental loading.
///
/// The engine calls [`next_chunk`](ChunkSource::next_chunk) until it returns
/// `Ok(None)`. A returned slice stays valid until the next call.
pub trait ChunkSource {
    fn next_chunk(&mut self) -> Result<Option<&[u8]>, LoadError>;
}

/// An embeddable scripting engine instance.
///
/// Creation happens in the implementor's constructor and teardown in its
/// `Drop`. `load` leaves the compiled chunk pending; `call` runs it.
pub trait Engine {
    /// Stop automatic garbage collection.
    fn pause_collector(&mut self);

    /// Restart automatic garbage collection.
    fn resume_collector(&mut self);

    /// Register the standard library modules and any extra native modules
    /// the engine was configured with.
    fn open_libraries(&mut self) -> Result<(), LaunchError>;

    /// Compile a chunk pulled from `source`.
    ///
    /// A read error reported by `source` is returned as
    /// [`LaunchError::Payload`] even if the engine also rejected the
    /// truncated input.
    fn load(&mut self, chunk_name: &str, source: &mut dyn ChunkSource) -> Result<(), LaunchError>;

    /// Assign the full argument list, program path at index 0, to `global`.
    fn set_arg_table(&mut self, global: &str, args: &Arguments) -> Result<(), LaunchError>;

    /// Call the pending chunk with `args` as positional parameters.
    fn call(&mut self, args: &[String]) -> Result<(), LaunchError>;
}
