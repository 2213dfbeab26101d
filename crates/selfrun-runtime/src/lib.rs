//! Selfrun Runtime
//!
//! Everything a self-running Lua program needs at startup: the trailer
//! format glued onto the launcher, the locator and streaming reader that
//! find and feed the payload to the engine, and the bootstrap sequence that
//! ties them together.

pub mod args;
pub mod bootstrap;
pub mod bundle;
pub mod engine;
pub mod error;
pub mod options;
pub mod platform;

pub use args::Arguments;
pub use bootstrap::{launch, Bootstrap, Stage};
pub use engine::{ChunkSource, Engine, LuaEngine, NativeModule};
pub use error::{LaunchError, LoadError};
pub use options::{LaunchOptions, LOG_ENV};
pub use platform::{fatal, NativePlatform, Platform, EXIT_FAILURE};
