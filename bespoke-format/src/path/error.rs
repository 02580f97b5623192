use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntoEntryNameError {
    UnrepresentableStr,
    NoFileName,
}

impl std::error::Error for IntoEntryNameError {}

impl fmt::Display for IntoEntryNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl IntoEntryNameError {
    pub fn as_str(&self) -> &str {
        match self {
            IntoEntryNameError::UnrepresentableStr => "unrepresentable string found in path",
            IntoEntryNameError::NoFileName => "path has no file name",
        }
    }
}
