use std::io;
use std::path::{Path, PathBuf};

/// Error that occurs when reading a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to read file `{path}`: {source}")]
pub struct FileReadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Reads the whole file at the given path into memory.
///
/// # Errors
///
/// Returns a [`FileReadError`] carrying the offending path if the file cannot be read.
pub fn read_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>, FileReadError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| FileReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the file at the given path as UTF-8 text.
///
/// # Example
/// ```no_run
/// # use danm_cleaner::fsutil;
/// let kubeconfig = fsutil::read_to_string("/etc/kubernetes/kubelet.conf")?;
/// # Ok::<(), fsutil::FileReadError>(())
/// ```
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String, FileReadError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| FileReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the file at the given path and strips surrounding whitespace, e.g. the trailing
/// newline of `/proc/sys/kernel/hostname` or of a service account token.
pub fn read_trimmed(path: impl AsRef<Path>) -> Result<String, FileReadError> {
    read_to_string(path).map(|s| s.trim().to_owned())
}
