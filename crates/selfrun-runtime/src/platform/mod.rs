//! Platform capabilities: finding our own executable and reporting fatal
//! errors.
//!
//! - **console**: stderr, used everywhere a console is attached
//! - **dialog**: modal error box for Windows GUI launches
//!
//! [`NativePlatform`] picks the right one at build time; nothing outside this
//! module looks at the target OS.

pub mod console;
#[cfg(windows)]
pub mod dialog;

use std::io;
use std::path::PathBuf;

pub use console::ConsolePlatform;
#[cfg(windows)]
pub use dialog::DialogPlatform;

/// Exit status for every fatal condition.
pub const EXIT_FAILURE: i32 = 1;

/// The platform a launcher runs on.
pub trait Platform {
    /// Path of the running executable on disk.
    fn executable_path(&self) -> io::Result<PathBuf>;

    /// Show `"<program>: <message>"` to the user.
    fn report(&self, program: &str, message: &str);
}

#[cfg(windows)]
pub type NativePlatform = DialogPlatform;
#[cfg(not(windows))]
pub type NativePlatform = ConsolePlatform;

/// The fatal message line, without a trailing newline.
pub fn fatal_message(program: &str, message: &str) -> String {
    format!("{program}: {message}")
}

/// Report `message` and terminate the process with [`EXIT_FAILURE`].
pub fn fatal(platform: &dyn Platform, program: &str, message: &str) -> ! {
    tracing::debug!(program, message, "fatal");
    platform.report(program, message);
    std::process::exit(EXIT_FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_message() {
        assert_eq!(
            fatal_message("/usr/bin/app", "no Lua program found in /usr/bin/app"),
            "/usr/bin/app: no Lua program found in /usr/bin/app"
        );
    }
}
