//! Command-line arguments as seen by the payload.

/// The process arguments: program path at index 0, forwarded arguments after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arguments {
    entries: Vec<String>,
}

impl Arguments {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments of the current process. Non-UTF-8 arguments are converted
    /// lossily.
    pub fn from_env() -> Self {
        Self::new(std::env::args_os().map(|a| a.to_string_lossy().into_owned()))
    }

    /// Every entry, index 0 first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Argument 0, the program as invoked.
    pub fn program(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    /// Arguments 1..N, handed to the payload as call parameters.
    pub fn forwarded(&self) -> &[String] {
        self.entries.get(1..).unwrap_or(&[])
    }
}
