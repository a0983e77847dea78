use std::collections::HashSet;

use super::Cleaner;
use crate::container::ContainerID;
use crate::ipam::AddressAllocator;
use crate::registry::{Endpoint, EndpointRegistry};
use crate::runtime::{ContainerFilter, ContainerRuntime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanReason {
    /// The runtime reports the endpoint's container as exited.
    Exited,
    /// The runtime does not know the endpoint's container at all.
    Vanished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orphan<'a> {
    pub endpoint: &'a Endpoint,
    pub reason: OrphanReason,
}

/// Outcome of one startup sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub examined: usize,
    pub exited: usize,
    pub vanished: usize,
}

/// Selects the endpoints whose container exited or no longer exists.
///
/// Endpoints of exited containers come first, then those of vanished containers. An
/// endpoint matching both (the container disappeared between the two listings) is only
/// reported once, as exited. Endpoints of running containers are never selected.
pub fn find_orphans<'a>(
    endpoints: &'a [Endpoint],
    exited: &HashSet<ContainerID>,
    all: &HashSet<ContainerID>,
) -> Vec<Orphan<'a>> {
    let mut seen = HashSet::new();
    let exited_pass = endpoints
        .iter()
        .filter(|ep| exited.contains(ep.spec.cid.as_str()))
        .map(|endpoint| Orphan {
            endpoint,
            reason: OrphanReason::Exited,
        });
    let vanished_pass = endpoints
        .iter()
        .filter(|ep| !all.contains(ep.spec.cid.as_str()))
        .map(|endpoint| Orphan {
            endpoint,
            reason: OrphanReason::Vanished,
        });

    exited_pass
        .chain(vanished_pass)
        .filter(|orphan| seen.insert((orphan.endpoint.namespace(), orphan.endpoint.name())))
        .collect()
}

impl<R, C, A> Cleaner<R, C, A>
where
    R: EndpointRegistry,
    C: ContainerRuntime,
    A: AddressAllocator,
{
    /// Removes endpoints on this host whose containers exited or vanished.
    ///
    /// Best effort: if any listing fails the sweep is abandoned and `None` is returned.
    /// Later events still get cleaned up by [`Cleaner::watch`].
    pub async fn reconcile(&self) -> Option<SweepSummary> {
        let endpoints = match self.registry.list_endpoints_by_host(&self.hostname).await {
            Ok(endpoints) => endpoints,
            Err(err) => {
                log::error!("Cleanup failed: {err}");
                return None;
            }
        };
        let exited = self.container_ids(ContainerFilter::Exited).await?;
        let all = self.container_ids(ContainerFilter::All).await?;

        let orphans = find_orphans(&endpoints, &exited, &all);
        let mut summary = SweepSummary {
            examined: endpoints.len(),
            ..Default::default()
        };
        for orphan in orphans {
            log::debug!(
                "Endpoint `{}/{}` belongs to {:?} container `{}`",
                orphan.endpoint.namespace(),
                orphan.endpoint.name(),
                orphan.reason,
                orphan.endpoint.spec.cid
            );
            match orphan.reason {
                OrphanReason::Exited => summary.exited += 1,
                OrphanReason::Vanished => summary.vanished += 1,
            }
            self.delete_endpoint(orphan.endpoint).await;
        }

        log::info!(
            "Startup cleanup on `{}`: examined {} endpoints, {} of exited and {} of vanished containers",
            self.hostname,
            summary.examined,
            summary.exited,
            summary.vanished
        );
        Some(summary)
    }

    async fn container_ids(&self, filter: ContainerFilter) -> Option<HashSet<ContainerID>> {
        match self.runtime.list_containers(filter).await {
            Ok(containers) => Some(containers.into_iter().map(|c| c.id).collect()),
            Err(err) => {
                log::error!("Cleanup failed: {err}");
                None
            }
        }
    }
}
