//! The interface traversal needs from an archive format

use ss_arc::U8Archive;

use crate::error::Result;

/// An archive of named members whose contents can be replaced
///
/// Paths are `/` separated and start with the archive's root, `/dat/stage.plc` for example.
pub trait Container: Sized {
    fn decode(bytes: &[u8]) -> Result<Self>;

    /// Paths of every member, in listing order
    fn paths(&self) -> Vec<String>;

    fn read_member(&self, path: &str) -> Result<&[u8]>;

    /// Replace the contents of an existing member
    fn write_member(&mut self, path: &str, bytes: Vec<u8>) -> Result<()>;

    fn encode(&self) -> Result<Vec<u8>>;
}

impl Container for U8Archive {
    fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(U8Archive::from_bytes(bytes)?)
    }

    fn paths(&self) -> Vec<String> {
        self.file_names().map(str::to_owned).collect()
    }

    fn read_member(&self, path: &str) -> Result<&[u8]> {
        Ok(self.by_name(path)?)
    }

    fn write_member(&mut self, path: &str, bytes: Vec<u8>) -> Result<()> {
        self.replace(path, bytes)?;
        Ok(())
    }

    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.to_bytes()?)
    }
}
