//! Composer: glue a payload onto a launcher.
//!
//! Produces `[launcher][payload][trailer]`, the layout the locator expects.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use super::format::Trailer;

/// Copy `launcher` then `payload` into `out` and finish with the trailer.
///
/// Returns the trailer that was written.
pub fn compose<L, P, W>(launcher: &mut L, payload: &mut P, out: &mut W) -> io::Result<Trailer>
where
    L: Read + ?Sized,
    P: Read + ?Sized,
    W: Write + ?Sized,
{
    let payload_offset = io::copy(launcher, out)?;
    let payload_length = io::copy(payload, out)?;
    let trailer = Trailer::new(payload_offset, payload_length);
    trailer.write_to(out)?;
    out.flush()?;
    Ok(trailer)
}

/// Compose files on disk, creating or replacing `output`.
///
/// On Unix the output is made executable.
pub fn compose_files(launcher: &Path, payload: &Path, output: &Path) -> io::Result<Trailer> {
    let mut launcher_file = File::open(launcher)?;
    let mut payload_file = File::open(payload)?;
    let mut out = BufWriter::new(File::create(output)?);

    let trailer = compose(&mut launcher_file, &mut payload_file, &mut out)?;
    out.into_inner().map_err(|e| e.into_error())?.sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(output, std::fs::Permissions::from_mode(0o755))?;
    }

    tracing::debug!(
        output = %output.display(),
        launcher_size = trailer.payload_offset,
        payload_size = trailer.payload_length,
        "composed executable"
    );
    Ok(trailer)
}
