//! `selfrun-glue extract`: copy the payload back out of a composed file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context};
use selfrun_runtime::bundle::{self, PayloadReader};

const EXTRACT_CHUNK_SIZE: usize = 64 * 1024;

pub fn execute(file: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = output {
        if is_same_file(file, path) {
            bail!("output {} would overwrite the input", path.display());
        }
    }

    let range = bundle::locate(file)?;
    let mut reader = PayloadReader::from_range(range, EXTRACT_CHUNK_SIZE);

    let mut sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    while let Some(chunk) = reader.next_chunk()? {
        sink.write_all(chunk)?;
    }
    sink.flush()?;
    Ok(())
}

/// Both paths exist and resolve to the same file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
