use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use bespoke_format::BespokeImage;

use crate::error::{Error, Result};

pub mod extract;
pub mod file;
pub mod list;
pub mod map;

pub use extract::run as extract;
pub use file::run as file;
pub use list::run as list;
pub use map::run as map;

fn open_executable(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|source| Error::OpenExecutable {
        path: path.to_path_buf(),
        source,
    })
}

fn refuse_self_overwrite(executable: &Path, output: &Path) -> Result<()> {
    let same = match (executable.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };

    if same {
        return Err(Error::OutputIsInput {
            path: output.to_path_buf(),
        });
    }
    Ok(())
}

/// Writes a finished image to `path`, replacing anything already there.
/// On Unix the file is made executable.
fn write_image(path: &Path, image: &BespokeImage) -> Result<()> {
    let map_err = |source| Error::WriteOutput {
        path: PathBuf::from(path),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o755);

        let mut out = options.open(path).map_err(map_err)?;
        // `mode` only applies to newly created files.
        out.set_permissions(std::fs::Permissions::from_mode(0o755))
            .map_err(map_err)?;
        out.write_all(image.as_bytes()).map_err(map_err)?;
        out.flush().map_err(map_err)?;
    }

    #[cfg(not(unix))]
    {
        let mut out = options.open(path).map_err(map_err)?;
        out.write_all(image.as_bytes()).map_err(map_err)?;
        out.flush().map_err(map_err)?;
    }

    tracing::debug!(
        output = %path.display(),
        bytes = image.len(),
        executable_len = image.executable_len(),
        "wrote bespoke binary"
    );

    Ok(())
}
