//! Container file persistence
//!
//! On disk a container is a [`Header`] followed by the JSON-serialized tree.

use super::header::{Header, HEADER_SIZE};
use super::Container;
use crate::error::{OdimError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Handle to a container file on disk
#[derive(Debug, Clone)]
pub struct ContainerFile {
    path: PathBuf,
}

impl ContainerFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ContainerFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether `path` holds a readable container
    pub fn is_container<P: AsRef<Path>>(path: P) -> bool {
        Self::new(path).load().is_ok()
    }

    /// Read and parse the whole container
    pub fn load(&self) -> Result<Container> {
        let bytes = fs::read(&self.path).map_err(|e| OdimError::NotOpened {
            path: self.display(),
            reason: e.to_string(),
        })?;

        let header = Header::from_bytes(&bytes).map_err(|e| self.not_a_container(e.to_string()))?;

        let body = &bytes[HEADER_SIZE..];
        if body.len() as u64 != header.body_len {
            return Err(self.not_a_container(format!(
                "body is {} bytes, header declares {}",
                body.len(),
                header.body_len
            )));
        }

        serde_json::from_slice(body).map_err(|e| self.not_a_container(e.to_string()))
    }

    /// Serialize `container` and replace the file contents
    pub fn save(&self, container: &Container) -> Result<()> {
        let body = serde_json::to_vec(container)?;
        let header = Header::new(body.len() as u64);

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| OdimError::NotOpened {
                path: self.display(),
                reason: e.to_string(),
            })?;
        file.write_all(&header.to_bytes())?;
        file.write_all(&body)?;
        file.sync_all()?;
        Ok(())
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    fn not_a_container(&self, reason: String) -> OdimError {
        OdimError::NotAContainer {
            path: self.display(),
            reason,
        }
    }
}

/// Copy `source` to `target` byte for byte.
///
/// Fails if the copy does not end up with the same length as the source.
pub fn copy_verbatim<P: AsRef<Path>, Q: AsRef<Path>>(source: P, target: Q) -> Result<u64> {
    let source = source.as_ref();
    let target = target.as_ref();

    let expected = fs::metadata(source)
        .map_err(|e| OdimError::NotOpened {
            path: source.display().to_string(),
            reason: e.to_string(),
        })?
        .len();

    let mut input = File::open(source)?;
    let mut output = File::create(target).map_err(|e| OdimError::NotOpened {
        path: target.display().to_string(),
        reason: e.to_string(),
    })?;
    let copied = std::io::copy(&mut input, &mut output)?;
    output.sync_all()?;

    let written = fs::metadata(target)?.len();
    if copied != expected || written != expected {
        return Err(OdimError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!(
                "copy of {} to {} is incomplete: {} of {} bytes",
                source.display(),
                target.display(),
                written,
                expected
            ),
        )));
    }

    tracing::debug!(
        "Copied {} bytes from {} to {}",
        written,
        source.display(),
        target.display()
    );
    Ok(written)
}
