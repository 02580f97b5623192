use std::io::Write;
use std::path::{Path, PathBuf};

use bespoke_format::BespokeArchive;

use crate::error::{Error, Result};

/// Writes the entry `name` to `output`, or to stdout when no output is given.
pub fn run(path: &Path, name: &str, output: Option<PathBuf>) -> Result<()> {
    let archive = BespokeArchive::open(path).map_err(|source| Error::OpenImage {
        path: path.to_path_buf(),
        source,
    })?;

    let content = archive.read(name).map_err(|source| Error::Extract {
        name: name.to_string(),
        source,
    })?;

    match output {
        Some(output) => {
            std::fs::write(&output, &content).map_err(|source| Error::WriteOutput {
                path: output.clone(),
                source,
            })?;
            tracing::debug!(entry = name, output = %output.display(), bytes = content.len(), "extracted");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&content)
                .and_then(|_| handle.flush())
                .map_err(|source| Error::WriteOutput {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
    }

    Ok(())
}
