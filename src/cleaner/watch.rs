use std::future::Future;

use super::Cleaner;
use crate::container::ContainerID;
use crate::ipam::AddressAllocator;
use crate::registry::EndpointRegistry;
use crate::runtime::{self, ContainerRuntime, Event};

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("failed to subscribe to runtime events: {0}")]
    Subscribe(#[source] runtime::Error),
    #[error("runtime event stream failed: {0}")]
    Stream(#[source] runtime::Error),
    #[error("runtime closed the event stream")]
    StreamClosed,
}

impl<R, C, A> Cleaner<R, C, A>
where
    R: EndpointRegistry,
    C: ContainerRuntime,
    A: AddressAllocator,
{
    /// Follows the runtime's event stream until `shutdown` resolves.
    ///
    /// Events are handled one at a time, in delivery order. The subscription is released
    /// on every exit path.
    ///
    /// # Errors
    ///
    /// Fails if the subscription cannot be established, or once the stream breaks or is
    /// closed by the runtime.
    pub async fn watch(&self, shutdown: impl Future<Output = ()>) -> Result<(), WatchError> {
        let mut subscription = self
            .runtime
            .subscribe_events()
            .await
            .map_err(WatchError::Subscribe)?;
        log::info!("Connected");

        tokio::pin!(shutdown);
        let result = loop {
            let next = tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Shutting down event watcher");
                    break Ok(());
                }
                next = subscription.next() => next,
            };
            match next {
                Some(Ok(event)) => self.handle_event(&event).await,
                Some(Err(err)) => break Err(WatchError::Stream(err)),
                None => break Err(WatchError::StreamClosed),
            }
        };

        subscription.unsubscribe();
        result
    }

    /// Deletes the endpoints of a pod sandbox that can no longer be used for networking.
    ///
    /// Only sandbox containers own the pod's network namespace; the application
    /// containers sharing it are ignored so their events cannot trigger a second cleanup.
    pub async fn handle_event(&self, event: &Event) {
        if !event.is_container() || !event.is_pod_sandbox() {
            return;
        }
        // kill, die, stop and destroy also fire during normal pod teardown, usually after
        // the CNI delete already removed the endpoints
        if !event.action().ends_container() {
            return;
        }

        let cid = match ContainerID::new(&event.actor.id) {
            Ok(cid) => cid,
            Err(err) => {
                log::warn!("Ignoring `{}` event: {err}", event.action);
                return;
            }
        };
        let endpoints = match self.registry.list_endpoints_by_container(&cid).await {
            Ok(endpoints) => endpoints,
            Err(err) => {
                log::error!("Cannot look up endpoints of container `{cid}`: {err}");
                return;
            }
        };
        if endpoints.is_empty() {
            log::debug!("No endpoints left for container `{cid}` ({})", event.action);
            return;
        }

        log::info!(
            "Container `{cid}` received `{}`, deleting {} endpoints",
            event.action,
            endpoints.len()
        );
        for endpoint in &endpoints {
            self.delete_endpoint(endpoint).await;
        }
    }
}
