use std::io;
use std::path::Path;

use tempfile::TempPath;

/// Every staging file name starts with this.
pub const STAGING_PREFIX: &str = "archiver-unpacker-";

/// Scratch file holding the intermediate tar container.
///
/// Owned by exactly one operation. The file is removed by [`release`], or by
/// `Drop` if the operation never gets that far.
///
/// [`release`]: StagingFile::release
#[derive(Debug)]
pub struct StagingFile {
    path: TempPath,
}

impl StagingFile {
    /// Creates an empty, uniquely named file in the system temp directory.
    pub fn acquire(suffix: &str) -> io::Result<Self> {
        Self::acquire_in(std::env::temp_dir(), suffix)
    }

    pub fn acquire_in(dir: impl AsRef<Path>, suffix: &str) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(suffix)
            .tempfile_in(dir)?;
        let staging = StagingFile {
            path: file.into_temp_path(),
        };
        log::debug!("acquired staging file {}", staging.path().display());
        Ok(staging)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the file. A file that is already gone counts as released.
    pub fn release(self) -> io::Result<()> {
        let shown = self.path.to_path_buf();
        match self.path.close() {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => {
                log::debug!("released staging file {}", shown.display());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn acquire_creates_an_empty_named_file() {
        let dir = tempdir().unwrap();
        let staging = StagingFile::acquire_in(dir.path(), ".tar").unwrap();
        let name = staging.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(STAGING_PREFIX));
        assert!(name.ends_with(".tar"));
        assert_eq!(std::fs::metadata(staging.path()).unwrap().len(), 0);
    }

    #[test]
    fn release_removes_the_file() {
        let dir = tempdir().unwrap();
        let staging = StagingFile::acquire_in(dir.path(), ".tar").unwrap();
        let path = staging.path().to_path_buf();
        staging.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn release_tolerates_a_consumed_file() {
        let dir = tempdir().unwrap();
        let staging = StagingFile::acquire_in(dir.path(), ".tar").unwrap();
        std::fs::remove_file(staging.path()).unwrap();
        staging.release().unwrap();
    }

    #[test]
    fn drop_removes_the_file() {
        let dir = tempdir().unwrap();
        let path = {
            let staging = StagingFile::acquire_in(dir.path(), ".tar").unwrap();
            std::fs::write(staging.path(), b"partial").unwrap();
            staging.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn names_are_unique() {
        let dir = tempdir().unwrap();
        let a = StagingFile::acquire_in(dir.path(), ".tar").unwrap();
        let b = StagingFile::acquire_in(dir.path(), ".tar").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
