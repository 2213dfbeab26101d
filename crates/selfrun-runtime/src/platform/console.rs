//! Console error surface.
//!
//! Uses `termcolor` so the program name stands out on a terminal. Respects
//! `NO_COLOR` and never colors redirected output.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::Platform;

/// Reports to stderr and resolves the executable through the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePlatform;

impl ConsolePlatform {
    /// Color choice for stderr.
    ///
    /// Priority: `NO_COLOR` env > redirected stderr > auto-detect.
    pub fn color_choice() -> ColorChoice {
        if std::env::var_os("NO_COLOR").is_some() || !io::stderr().is_terminal() {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        }
    }
}

impl Platform for ConsolePlatform {
    fn executable_path(&self) -> io::Result<PathBuf> {
        std::env::current_exe()
    }

    fn report(&self, program: &str, message: &str) {
        let mut stderr = StandardStream::stderr(Self::color_choice());
        let _ = write_fatal(&mut stderr, program, message);
    }
}

/// Write `"<program>: <message>\n"`, highlighting the program name.
pub fn write_fatal<W: WriteColor>(out: &mut W, program: &str, message: &str) -> io::Result<()> {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red)).set_bold(true);
    out.set_color(&spec)?;
    write!(out, "{program}")?;
    out.reset()?;
    writeln!(out, ": {message}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    #[test]
    fn test_plain_line() {
        let mut buf = Buffer::no_color();
        write_fatal(&mut buf, "prog", "cannot open prog: denied").unwrap();
        assert_eq!(buf.as_slice(), b"prog: cannot open prog: denied\n");
    }

    #[test]
    fn test_colored_line_keeps_text() {
        let mut buf = Buffer::ansi();
        write_fatal(&mut buf, "prog", "boom").unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        assert!(text.contains("prog"));
        assert!(text.ends_with(": boom\n"));
        assert!(text.contains('\u{1b}'));
    }

    #[test]
    fn test_executable_path_exists() {
        let path = ConsolePlatform.executable_path().unwrap();
        assert!(path.is_file());
    }
}
