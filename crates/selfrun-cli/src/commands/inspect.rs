//! `selfrun-glue inspect`: show where the payload of a composed file lives.

use std::path::Path;

use selfrun_runtime::bundle::{self, TRAILER_SIZE};

use crate::output::StyledOutput;

pub fn execute(file: &Path, out: &mut StyledOutput) -> anyhow::Result<()> {
    let range = bundle::locate(file)?;

    out.info("launcher");
    out.plain(&format!("  {} bytes", range.offset()));
    out.newline();
    out.info("payload ");
    out.plain(&format!(
        "  {} bytes at offset {}",
        range.len(),
        range.offset()
    ));
    out.newline();
    out.info("trailer ");
    out.plain(&format!("  {} bytes", TRAILER_SIZE));
    out.newline();
    Ok(())
}
