use crate::container::{Container, ContainerFile};
use crate::error::Result;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use tracing::{debug, warn};

/// Read-only handle over a container file
///
/// The file is read once on open and released immediately; the handle only
/// hands out shared access to the loaded tree.
#[derive(Debug)]
pub struct StoreReader {
    container: Container,
}

impl StoreReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = ContainerFile::new(path);
        let container = file.load()?;
        debug!("Opened {} read-only", file.path().display());
        Ok(StoreReader { container })
    }

    /// Wrap an already loaded container
    pub fn from_container(container: Container) -> Self {
        StoreReader { container }
    }
}

impl Deref for StoreReader {
    type Target = Container;

    fn deref(&self) -> &Container {
        &self.container
    }
}

/// Writable handle over a container file
///
/// Mutations are applied to the loaded tree and written back by
/// [`StoreWriter::close`]. A handle dropped without `close` (for instance
/// when a repair aborts half way) still writes its pending changes.
#[derive(Debug)]
pub struct StoreWriter {
    file: ContainerFile,
    container: Container,
    dirty: bool,
}

impl StoreWriter {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = ContainerFile::new(path);
        let container = file.load()?;
        debug!("Opened {} for writing", file.path().display());
        Ok(StoreWriter {
            file,
            container,
            dirty: false,
        })
    }

    /// Write pending changes to disk
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.file.save(&self.container)?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Flush and release the handle
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Deref for StoreWriter {
    type Target = Container;

    fn deref(&self) -> &Container {
        &self.container
    }
}

impl DerefMut for StoreWriter {
    fn deref_mut(&mut self) -> &mut Container {
        self.dirty = true;
        &mut self.container
    }
}

impl Drop for StoreWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(
                "Failed to write pending changes to {}: {}",
                self.file.path().display(),
                e
            );
        }
    }
}
