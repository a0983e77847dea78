//! Host identity resolution.
//!
//! Endpoints carry the name of the node they were provisioned on, so the cleaner
//! has to know its own host name to select the records it is responsible for.
use std::path::{Path, PathBuf};

use crate::fsutil;

const KERNEL_HOSTNAME_PATH: &str = "/proc/sys/kernel/hostname";
const ETC_HOSTNAME_PATH: &str = "/etc/hostname";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to resolve hostname: {0}")]
    Read(#[from] fsutil::FileReadError),
    #[error("hostname read from `{path}` is empty")]
    Empty { path: PathBuf },
}

/// Resolves the host identity.
///
/// An explicit override (e.g. the node name injected into a DaemonSet pod) wins;
/// otherwise the operating system hostname is used.
pub fn resolve_hostname(override_name: Option<&str>) -> Result<String, Error> {
    if let Some(name) = override_name.map(str::trim).filter(|n| !n.is_empty()) {
        return Ok(name.to_owned());
    }
    hostname_from_files(&[
        Path::new(KERNEL_HOSTNAME_PATH),
        Path::new(ETC_HOSTNAME_PATH),
    ])
}

/// Returns the first readable, non-empty hostname among `candidates`.
///
/// The error of the last candidate is reported if none of them yields a name.
fn hostname_from_files(candidates: &[&Path]) -> Result<String, Error> {
    let mut last_err = None;
    for path in candidates {
        match fsutil::read_trimmed(path) {
            Ok(name) if !name.is_empty() => return Ok(name),
            Ok(_) => {
                last_err = Some(Error::Empty {
                    path: path.to_path_buf(),
                })
            }
            Err(err) => {
                log::debug!("{err}");
                last_err = Some(Error::Read(err));
            }
        }
    }
    Err(last_err.unwrap_or(Error::Empty {
        path: PathBuf::from(KERNEL_HOSTNAME_PATH),
    }))
}
