use std::io::{self, Cursor, Read};

pub mod reader;
pub mod writer;

/// A finished bespoke binary: the executable, byte for byte, followed by a
/// relocated ZIP archive.
///
/// Reads yield the whole image from the first byte of the executable.
#[derive(Debug, Clone)]
pub struct BespokeImage {
    inner: Cursor<Vec<u8>>,
    executable_len: usize,
}

impl BespokeImage {
    pub(crate) fn new(bytes: Vec<u8>, executable_len: usize) -> BespokeImage {
        BespokeImage {
            inner: Cursor::new(bytes),
            executable_len,
        }
    }

    /// Length of the executable prefix.
    pub fn executable_len(&self) -> usize {
        self.executable_len
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.inner.get_ref()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner()
    }

    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Read for BespokeImage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}
