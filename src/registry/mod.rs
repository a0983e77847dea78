//! Cluster-stored registry of network endpoints (`DanmEp`) and network
//! definitions (`DanmNet`).
mod danm;
mod error;
mod models;

pub use danm::DanmRegistry;
pub(crate) use danm::network_path;
pub use error::{Error, Result};
pub use models::{
    AllocationPool, Endpoint, EndpointSpec, Interface, Network, NetworkOptions, NetworkSpec,
    ObjectMeta, POOL_EXEMPT_NETWORK_TYPE,
};

use crate::container::ContainerID;

pub trait EndpointRegistry {
    /// Lists the endpoints provisioned on `host`.
    fn list_endpoints_by_host(
        &self,
        host: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Endpoint>>> + Send;

    /// Lists the endpoints attached to the container `cid`.
    fn list_endpoints_by_container(
        &self,
        cid: &ContainerID,
    ) -> impl std::future::Future<Output = Result<Vec<Endpoint>>> + Send;

    /// Fetches a network definition. `None` if it does not exist.
    fn get_network(
        &self,
        namespace: &str,
        network_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Network>>> + Send;

    /// Deletes an endpoint record. Deleting an absent record succeeds.
    fn delete_endpoint(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
