//! `selfrun-glue glue`: glue a Lua script onto a launcher.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use selfrun_runtime::bundle;

use crate::output::StyledOutput;

/// The `selfrun` launcher installed next to the running tool.
pub fn default_launcher() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate selfrun-glue")?;
    let dir = exe
        .parent()
        .with_context(|| format!("{} has no parent directory", exe.display()))?;
    Ok(dir.join(format!("selfrun{}", std::env::consts::EXE_SUFFIX)))
}

pub fn execute(
    script: &Path,
    output: &Path,
    launcher: Option<&Path>,
    force: bool,
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    let launcher = match launcher {
        Some(path) => path.to_path_buf(),
        None => default_launcher()?,
    };

    if output.exists() {
        if !force {
            bail!("{} already exists (use --force to overwrite)", output.display());
        }
        let same = |a: &Path| {
            std::fs::canonicalize(a).ok() == std::fs::canonicalize(output).ok()
        };
        if same(&launcher) || same(script) {
            bail!("output {} would overwrite an input", output.display());
        }
    }

    if let Ok(existing) = bundle::locate(&launcher) {
        out.warning(&format!(
            "{} already carries a {}-byte payload; it becomes part of the launcher",
            launcher.display(),
            existing.len()
        ));
    }

    let trailer = bundle::compose_files(&launcher, script, output).with_context(|| {
        format!(
            "cannot glue {} onto {} as {}",
            script.display(),
            launcher.display(),
            output.display()
        )
    })?;

    out.success("Glued");
    out.plain(&format!(
        " {} ({} byte launcher + {} byte payload)",
        output.display(),
        trailer.payload_offset,
        trailer.payload_length
    ));
    out.newline();
    Ok(())
}
