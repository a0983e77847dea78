use std::path::PathBuf;

use crate::fsutil;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Read(#[from] fsutil::FileReadError),
    #[error("failed to parse kubeconfig `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("kubeconfig does not select a current context")]
    MissingCurrentContext,
    #[error("context `{0}` not found in kubeconfig")]
    UnknownContext(String),
    #[error("cluster `{0}` not found in kubeconfig")]
    UnknownCluster(String),
    #[error("user `{0}` not found in kubeconfig")]
    UnknownUser(String),
    #[error("failed to decode base64 field `{field}`: {source}")]
    Base64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error("no kubeconfig given and not running in a cluster (`{0}` is not set)")]
    NotInCluster(&'static str),
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("{method} `{path}` failed: {source}")]
    Request {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} `{path}` returned status {status}: {body}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response of `{path}`: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
