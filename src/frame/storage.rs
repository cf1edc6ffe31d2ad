use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Card or directory holding the playlist, the cursor and the raw images.
///
/// Paths are absolute within the storage, e.g. `/order.txt`.
pub trait Storage {
    type Image: Read + Seek;

    fn mount(&mut self) -> io::Result<()>;

    fn read_to_string(&mut self, path: &str) -> io::Result<String>;

    fn write_string(&mut self, path: &str, contents: &str) -> io::Result<()>;

    fn open_image(&mut self, path: &str) -> io::Result<Self::Image>;

    fn unmount(&mut self);
}

/// A directory standing in for the SD card.
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
    mounted: bool,
}

impl DirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStorage {
            root: root.into(),
            mounted: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        if !self.mounted {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "storage is not mounted",
            ));
        }
        Ok(self.root.join(path.trim_start_matches('/')))
    }
}

impl Storage for DirStorage {
    type Image = BufReader<File>;

    fn mount(&mut self) -> io::Result<()> {
        if !fs::metadata(&self.root)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            ));
        }
        info!("Storage mounted at {}", self.root.display());
        self.mounted = true;
        Ok(())
    }

    fn read_to_string(&mut self, path: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(path)?)
    }

    fn write_string(&mut self, path: &str, contents: &str) -> io::Result<()> {
        let target = self.resolve(path)?;
        debug!("Write {} bytes to {}", contents.len(), target.display());
        fs::write(target, contents)
    }

    fn open_image(&mut self, path: &str) -> io::Result<Self::Image> {
        File::open(self.resolve(path)?).map(BufReader::new)
    }

    fn unmount(&mut self) {
        if self.mounted {
            debug!("Storage unmounted");
        }
        self.mounted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "x").unwrap();

        assert!(DirStorage::new(&file).mount().is_err());
        assert!(DirStorage::new(dir.path().join("missing")).mount().is_err());
        assert!(DirStorage::new(dir.path()).mount().is_ok());
    }

    #[test]
    fn test_paths_are_rooted() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = DirStorage::new(dir.path());
        storage.mount().unwrap();

        storage.write_string("/index.txt", "3").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("index.txt")).unwrap(), "3");
        assert_eq!(storage.read_to_string("index.txt").unwrap(), "3");
    }

    #[test]
    fn test_unmounted_storage_refuses_access() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = DirStorage::new(dir.path());
        storage.mount().unwrap();
        storage.unmount();

        let err = storage.read_to_string("/order.txt").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }
}
