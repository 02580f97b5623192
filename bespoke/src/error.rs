use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open executable `{}`", .path.display())]
    OpenExecutable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot build bespoke binary from `{}`", .path.display())]
    Build {
        path: PathBuf,
        #[source]
        source: bespoke_format::BuildError,
    },

    #[error("Cannot write output `{}`", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open bespoke binary `{}`", .path.display())]
    OpenImage {
        path: PathBuf,
        #[source]
        source: bespoke_format::ReadError,
    },

    #[error("Cannot extract entry `{name}`")]
    Extract {
        name: String,
        #[source]
        source: bespoke_format::ReadError,
    },

    #[error("Invalid map entry `{0}`; expected KEY=VALUE")]
    InvalidMapEntry(String),

    #[error("Output `{}` would overwrite the executable", .path.display())]
    OutputIsInput { path: PathBuf },
}
