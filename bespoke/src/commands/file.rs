use std::path::Path;

use crate::error::{Error, Result};

pub fn run(executable: &Path, source: &Path, output: &Path) -> Result<()> {
    super::refuse_self_overwrite(executable, output)?;

    let exe = super::open_executable(executable)?;
    let image = bespoke_format::with_file(exe, source).map_err(|source| Error::Build {
        path: executable.to_path_buf(),
        source,
    })?;

    super::write_image(output, &image)
}
