//! Shared pieces of the selfrun binaries.
//!
//! - `selfrun`: the launcher that runs the Lua payload glued onto it
//! - `selfrun-glue`: composes, inspects and extracts those payloads

pub mod commands;
pub mod logging;
pub mod output;
