//! Windows error surface.
//!
//! A launcher started from Explorer has no console to print to, so fatal
//! errors go to a message box instead. With a console attached, output is
//! the same as [`ConsolePlatform`].

use std::ffi::OsStr;
use std::io;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::path::PathBuf;

use windows_sys::Win32::System::Console::GetConsoleWindow;
use windows_sys::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK};

use super::{fatal_message, ConsolePlatform, Platform};

#[derive(Debug, Clone, Copy, Default)]
pub struct DialogPlatform {
    console: ConsolePlatform,
}

impl DialogPlatform {
    fn has_console() -> bool {
        unsafe { !GetConsoleWindow().is_null() }
    }
}

impl Platform for DialogPlatform {
    fn executable_path(&self) -> io::Result<PathBuf> {
        self.console.executable_path()
    }

    fn report(&self, program: &str, message: &str) {
        if Self::has_console() {
            self.console.report(program, message);
            return;
        }

        let text = wide(&fatal_message(program, message));
        let caption = wide(program);
        unsafe {
            MessageBoxW(
                std::ptr::null_mut(),
                text.as_ptr(),
                caption.as_ptr(),
                MB_ICONERROR | MB_OK,
            );
        }
    }
}

/// NUL-terminated UTF-16 copy of `s`.
fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}
