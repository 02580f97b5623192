use std::path::{Component, Path};

mod error;

pub use self::error::IntoEntryNameError;

/// Derives a flat entry name from the final component of `path`.
///
/// Directory components are dropped, so `assets/css/site.css` becomes
/// `site.css`. Names must be valid UTF-8 and free of control characters and
/// separators, since ZIP readers treat `/` and `\` as hierarchy.
pub fn entry_name<P: AsRef<Path>>(path: P) -> Result<String, IntoEntryNameError> {
    let last = match path.as_ref().components().next_back() {
        Some(Component::Normal(os_str)) => os_str,
        _ => return Err(IntoEntryNameError::NoFileName),
    };

    let name = last
        .to_str()
        .ok_or(IntoEntryNameError::UnrepresentableStr)?;

    if name.is_empty() {
        return Err(IntoEntryNameError::NoFileName);
    }

    if name
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(IntoEntryNameError::UnrepresentableStr);
    }

    Ok(name.to_string())
}
