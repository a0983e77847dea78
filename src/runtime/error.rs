use std::path::PathBuf;

use super::ContainerFilter;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to set up runtime client for socket `{path}`: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: bollard::errors::Error,
    },
    #[error("runtime did not answer ping: {0}")]
    Ping(#[source] bollard::errors::Error),
    #[error("failed to list containers ({filter:?}): {source}")]
    ListContainers {
        filter: ContainerFilter,
        #[source]
        source: bollard::errors::Error,
    },
    #[error("failed to receive event message: {0}")]
    EventMessage(#[source] bollard::errors::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
