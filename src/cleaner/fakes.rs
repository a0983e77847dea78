use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::container::ContainerID;
use crate::ipam::{self, AddressAllocator};
use crate::registry::{
    self, Endpoint, EndpointRegistry, EndpointSpec, Interface, Network, NetworkSpec, ObjectMeta,
};
use crate::runtime::{
    self, ContainerFilter, ContainerRuntime, ContainerSummary, Event, EventSubscription,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    ListByHost(String),
    ListByContainer(String),
    GetNetwork(String, String),
    Delete(String, String),
}

fn kube_error() -> crate::kube::Error {
    crate::kube::Error::Status {
        method: "GET",
        path: "/fake".to_owned(),
        status: 500,
        body: "unavailable".to_owned(),
    }
}

pub fn endpoint(
    namespace: &str,
    name: &str,
    network_id: &str,
    cid: &str,
    address: &str,
) -> Endpoint {
    Endpoint {
        metadata: ObjectMeta {
            name: name.to_owned(),
            namespace: namespace.to_owned(),
            ..Default::default()
        },
        spec: EndpointSpec {
            network_id: network_id.to_owned(),
            network_type: "other".to_owned(),
            interface: Interface {
                name: "eth0".to_owned(),
                address: address.to_owned(),
                ..Default::default()
            },
            host: "worker-1".to_owned(),
            cid: cid.to_owned(),
            ..Default::default()
        },
    }
}

pub fn network(namespace: &str, network_id: &str, network_type: &str) -> Network {
    Network {
        metadata: ObjectMeta {
            name: network_id.to_owned(),
            namespace: namespace.to_owned(),
            ..Default::default()
        },
        spec: NetworkSpec {
            network_id: network_id.to_owned(),
            network_type: network_type.to_owned(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// In-memory registry that records every call.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    endpoints: Mutex<Vec<Endpoint>>,
    networks: HashMap<(String, String), Network>,
    broken_networks: HashSet<String>,
    broken_deletes: HashSet<String>,
    fail_listing: bool,
    calls: Mutex<Vec<RegistryCall>>,
}

impl FakeRegistry {
    pub fn with_endpoints(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints: Mutex::new(endpoints),
            ..Default::default()
        }
    }

    pub fn add_network(mut self, network: Network) -> Self {
        self.networks.insert(
            (
                network.metadata.namespace.clone(),
                network.metadata.name.clone(),
            ),
            network,
        );
        self
    }

    /// Fetching this network fails with a transient error.
    pub fn break_network(mut self, network_id: &str) -> Self {
        self.broken_networks.insert(network_id.to_owned());
        self
    }

    /// Deleting this endpoint fails with a transient error.
    pub fn break_delete(mut self, name: &str) -> Self {
        self.broken_deletes.insert(name.to_owned());
        self
    }

    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> Vec<String> {
        self.endpoints
            .lock()
            .unwrap()
            .iter()
            .map(|ep| ep.name().to_owned())
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RegistryCall::Delete(_, name) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RegistryCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl EndpointRegistry for FakeRegistry {
    async fn list_endpoints_by_host(&self, host: &str) -> registry::Result<Vec<Endpoint>> {
        self.record(RegistryCall::ListByHost(host.to_owned()));
        if self.fail_listing {
            return Err(registry::Error::ListEndpoints(kube_error()));
        }
        Ok(self
            .endpoints
            .lock()
            .unwrap()
            .iter()
            .filter(|ep| ep.spec.host == host)
            .cloned()
            .collect())
    }

    async fn list_endpoints_by_container(
        &self,
        cid: &ContainerID,
    ) -> registry::Result<Vec<Endpoint>> {
        self.record(RegistryCall::ListByContainer(cid.to_string()));
        if self.fail_listing {
            return Err(registry::Error::ListEndpoints(kube_error()));
        }
        Ok(self
            .endpoints
            .lock()
            .unwrap()
            .iter()
            .filter(|ep| ep.spec.cid == cid.as_str())
            .cloned()
            .collect())
    }

    async fn get_network(
        &self,
        namespace: &str,
        network_id: &str,
    ) -> registry::Result<Option<Network>> {
        self.record(RegistryCall::GetNetwork(
            namespace.to_owned(),
            network_id.to_owned(),
        ));
        if self.broken_networks.contains(network_id) {
            return Err(registry::Error::GetNetwork {
                namespace: namespace.to_owned(),
                network_id: network_id.to_owned(),
                source: kube_error(),
            });
        }
        Ok(self
            .networks
            .get(&(namespace.to_owned(), network_id.to_owned()))
            .cloned())
    }

    async fn delete_endpoint(&self, namespace: &str, name: &str) -> registry::Result<()> {
        self.record(RegistryCall::Delete(namespace.to_owned(), name.to_owned()));
        if self.broken_deletes.contains(name) {
            return Err(registry::Error::DeleteEndpoint {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
                source: kube_error(),
            });
        }
        self.endpoints
            .lock()
            .unwrap()
            .retain(|ep| !(ep.namespace() == namespace && ep.name() == name));
        Ok(())
    }
}

pub fn runtime_unavailable() -> bollard::errors::Error {
    std::io::Error::from(std::io::ErrorKind::ConnectionRefused).into()
}

/// Runtime with fixed listings and a scripted event stream.
#[derive(Debug, Default)]
pub struct FakeRuntime {
    all: Vec<&'static str>,
    exited: Vec<&'static str>,
    fail_listing: bool,
    events: Mutex<Option<mpsc::Receiver<runtime::Result<Event>>>>,
}

impl FakeRuntime {
    /// `running` and `exited` together make up the "all containers" listing.
    pub fn with_containers(running: &[&'static str], exited: &[&'static str]) -> Self {
        Self {
            all: running.iter().chain(exited).copied().collect(),
            exited: exited.to_vec(),
            ..Default::default()
        }
    }

    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Serves `events` to the next subscriber.
    pub fn with_events(self, events: mpsc::Receiver<runtime::Result<Event>>) -> Self {
        *self.events.lock().unwrap() = Some(events);
        self
    }
}

impl ContainerRuntime for FakeRuntime {
    async fn list_containers(
        &self,
        filter: ContainerFilter,
    ) -> runtime::Result<Vec<ContainerSummary>> {
        if self.fail_listing {
            return Err(runtime::Error::ListContainers {
                filter,
                source: runtime_unavailable(),
            });
        }
        let (ids, status) = match filter {
            ContainerFilter::All => (&self.all, "Up"),
            ContainerFilter::Exited => (&self.exited, "Exited (0)"),
        };
        Ok(ids
            .iter()
            .map(|id| ContainerSummary {
                id: ContainerID::new(id).unwrap(),
                status: status.to_owned(),
            })
            .collect())
    }

    async fn subscribe_events(&self) -> runtime::Result<EventSubscription> {
        match self.events.lock().unwrap().take() {
            Some(rx) => Ok(EventSubscription::new(rx, None)),
            None => Err(runtime::Error::Ping(runtime_unavailable())),
        }
    }
}

/// Allocator that records releases.
#[derive(Debug, Default)]
pub struct FakeAllocator {
    fail: bool,
    releases: Mutex<Vec<(String, String)>>,
}

impl FakeAllocator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// `(network, address)` pairs passed to `release`.
    pub fn releases(&self) -> Vec<(String, String)> {
        self.releases.lock().unwrap().clone()
    }
}

impl AddressAllocator for FakeAllocator {
    async fn release(&self, network: &Network, address: &str) -> ipam::Result<()> {
        self.releases
            .lock()
            .unwrap()
            .push((network.metadata.name.clone(), address.to_owned()));
        if self.fail {
            return Err(ipam::Error::TooManyConflicts {
                network: network.metadata.name.clone(),
                attempts: 5,
            });
        }
        Ok(())
    }
}

/// Allocator applying releases to its own copy of each network's bitmap, the way the
/// registry-backed allocator does against the stored object.
#[derive(Debug, Default)]
pub struct BitmapAllocator {
    networks: Mutex<HashMap<String, Network>>,
    writes: Mutex<usize>,
}

impl BitmapAllocator {
    /// Number of releases that changed a bitmap.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn alloc(&self, network_id: &str) -> Option<String> {
        self.networks
            .lock()
            .unwrap()
            .get(network_id)
            .map(|n| n.spec.options.alloc.clone())
    }
}

impl AddressAllocator for BitmapAllocator {
    async fn release(&self, network: &Network, address: &str) -> ipam::Result<()> {
        let mut networks = self.networks.lock().unwrap();
        let stored = networks
            .entry(network.metadata.name.clone())
            .or_insert_with(|| network.clone());
        if let Some(updated) = ipam::released(stored, address)? {
            *stored = updated;
            *self.writes.lock().unwrap() += 1;
        }
        Ok(())
    }
}

pub fn container_event(action: &str, id: &str, sandbox: bool) -> Event {
    let mut event = Event {
        category: runtime::CONTAINER_EVENT_TYPE.to_owned(),
        action: action.to_owned(),
        ..Default::default()
    };
    event.actor.id = id.to_owned();
    let container_type = if sandbox {
        runtime::POD_SANDBOX_TYPE
    } else {
        "container"
    };
    event.actor.attributes.insert(
        runtime::CONTAINER_TYPE_LABEL.to_owned(),
        container_type.to_owned(),
    );
    event
}
