//! Output file that disappears unless the write completes.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A newly created output file, removed on drop unless committed.
///
/// Compressors write straight into the destination, so a failure halfway
/// would otherwise leave a truncated file that looks valid by name.
#[derive(Debug)]
pub struct PartialOutput {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl PartialOutput {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and keep the file.
    ///
    /// If the flush or sync fails the guard is still armed, so the file is
    /// removed when `self` drops on the way out.
    pub fn commit(mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        self.writer = None;
        Ok(())
    }
}

impl Write for PartialOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.writer.as_mut() {
            Some(writer) => writer.write(buf),
            None => Err(io::Error::new(io::ErrorKind::Other, "output already committed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        // Still holding the writer means commit() never ran.
        if let Some(writer) = self.writer.take() {
            drop(writer);
            match fs::remove_file(&self.path) {
                Ok(()) => log::warn!("removed incomplete output {}", self.path.display()),
                Err(e) => log::warn!(
                    "could not remove incomplete output {}: {e}",
                    self.path.display()
                ),
            }
        }
    }
}
