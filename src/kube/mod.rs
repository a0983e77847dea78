//! Access to the Kubernetes API server that stores the DANM custom resources.
//!
//! Only what the cleaner needs is implemented: resolving credentials from a
//! kubeconfig or the in-cluster service account, and JSON `GET`/`PUT`/`DELETE`
//! requests against resource paths.
mod client;
mod config;
mod error;
#[cfg(test)]
pub(crate) mod testserver;

pub use client::{KubeClient, PutOutcome};
pub use config::ClusterAccess;
pub use error::{Error, Result};
