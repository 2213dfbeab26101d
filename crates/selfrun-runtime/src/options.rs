//! Launch configuration.

use std::path::Path;

use crate::bundle::DEFAULT_CHUNK_SIZE;

/// Environment variable holding the log filter for the binaries.
pub const LOG_ENV: &str = "SELFRUN_LOG";

/// Knobs for a single launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Bytes handed to the engine per pull.
    pub chunk_size: usize,

    /// Global the argument table is assigned to.
    pub arg_global: String,

    /// Chunk name used in engine error messages. `None` derives
    /// `"=<executable file name>"`.
    pub chunk_name: Option<String>,

    /// Stop the collector while libraries are being registered.
    pub pause_collector: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            arg_global: "arg".to_string(),
            chunk_name: None,
            pause_collector: true,
        }
    }
}

impl LaunchOptions {
    /// Chunk name for a payload embedded in `exe`.
    pub fn chunk_name_for(&self, exe: &Path) -> String {
        match &self.chunk_name {
            Some(name) => name.clone(),
            None => {
                let stem = exe
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("={stem}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LaunchOptions::default();
        assert_eq!(options.chunk_size, 512);
        assert_eq!(options.arg_global, "arg");
        assert!(options.pause_collector);
    }

    #[test]
    fn test_chunk_name() {
        let mut options = LaunchOptions::default();
        assert_eq!(options.chunk_name_for(Path::new("/usr/bin/hello")), "=hello");
        assert_eq!(options.chunk_name_for(Path::new("/")), "=");

        options.chunk_name = Some("@main.lua".to_string());
        assert_eq!(options.chunk_name_for(Path::new("/usr/bin/hello")), "@main.lua");
    }
}
