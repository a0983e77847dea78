use super::Cleaner;
use crate::error::ResultOkLogExt;
use crate::ipam::AddressAllocator;
use crate::registry::{Endpoint, EndpointRegistry};

impl<R, C, A> Cleaner<R, C, A>
where
    R: EndpointRegistry,
    A: AddressAllocator,
{
    /// Frees the endpoint's address and deletes the endpoint record.
    ///
    /// Never fails: every error is logged so one broken record cannot stop the cleanup of
    /// others. The record is kept when its network cannot be fetched, since deleting it
    /// without knowing whether its address needs releasing would leak the address.
    pub async fn delete_endpoint(&self, endpoint: &Endpoint) {
        let namespace = endpoint.namespace();
        let name = endpoint.name();
        let network_id = endpoint.spec.network_id.as_str();

        let network = match self.registry.get_network(namespace, network_id).await {
            Ok(Some(network)) => network,
            Ok(None) => {
                log::info!(
                    "Network `{namespace}/{network_id}` of endpoint `{namespace}/{name}` does not exist, keeping the endpoint"
                );
                return;
            }
            Err(err) => {
                log::error!("Cannot fetch net info for endpoint `{namespace}/{name}`: {err}");
                return;
            }
        };

        if network.releases_addresses() {
            let released = self
                .allocator
                .release(&network, &endpoint.spec.interface.address)
                .await;
            released.ok_log_with(format_args!(
                "failed to release address of endpoint `{namespace}/{name}`"
            ));
        }

        if self
            .registry
            .delete_endpoint(namespace, name)
            .await
            .ok_log()
            .is_some()
        {
            log::info!(
                "Deleted endpoint `{namespace}/{name}` (container `{}`)",
                endpoint.spec.cid
            );
        }
    }
}
