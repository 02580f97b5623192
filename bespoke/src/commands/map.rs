use std::path::Path;

use bespoke_format::PayloadMap;

use crate::error::{Error, Result};

/// Parses a `KEY=VALUE` argument. Only the first `=` separates; the value
/// may itself contain `=`.
pub fn parse_entry(src: &str) -> Result<(String, String)> {
    match src.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::InvalidMapEntry(src.to_string())),
    }
}

pub(crate) fn build_map(name: Option<String>, entries: Vec<(String, String)>) -> PayloadMap {
    let mut map = PayloadMap::new();
    if let Some(name) = name {
        map.insert("name".into(), name);
    }
    // Explicit entries are applied last, so `-e name=...` wins over `-n`.
    map.extend(entries);
    map
}

pub fn run(
    executable: &Path,
    output: &Path,
    name: Option<String>,
    entries: Vec<(String, String)>,
) -> Result<()> {
    super::refuse_self_overwrite(executable, output)?;

    let map = build_map(name, entries);
    tracing::debug!(keys = map.len(), "embedding map");

    let exe = super::open_executable(executable)?;
    let image = bespoke_format::with_map(exe, &map).map_err(|source| Error::Build {
        path: executable.to_path_buf(),
        source,
    })?;

    super::write_image(output, &image)
}
