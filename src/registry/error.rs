#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to list endpoints: {0}")]
    ListEndpoints(#[source] crate::kube::Error),
    #[error("failed to fetch network `{namespace}/{network_id}`: {source}")]
    GetNetwork {
        namespace: String,
        network_id: String,
        #[source]
        source: crate::kube::Error,
    },
    #[error("failed to delete endpoint `{namespace}/{name}`: {source}")]
    DeleteEndpoint {
        namespace: String,
        name: String,
        #[source]
        source: crate::kube::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
