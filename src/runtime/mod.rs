//! The local container runtime: container listings and lifecycle events.
use std::collections::HashMap;

use bollard::models::EventMessage;

use crate::container::ContainerID;

mod docker;
mod error;
mod subscription;

pub use docker::DockerRuntime;
pub use error::{Error, Result};
pub use subscription::EventSubscription;

/// Actor attribute the kubelet sets on the containers it creates.
pub const CONTAINER_TYPE_LABEL: &str = "io.kubernetes.docker.type";
/// Value of [`CONTAINER_TYPE_LABEL`] for pod sandbox (pause) containers, the only
/// containers that own a pod's network namespace.
pub const POD_SANDBOX_TYPE: &str = "podsandbox";

/// Event category of container lifecycle events.
pub const CONTAINER_EVENT_TYPE: &str = "container";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFilter {
    All,
    Exited,
}

/// One entry of a container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: ContainerID,
    /// Human readable status, e.g. `Exited (0) 2 hours ago`.
    pub status: String,
}

/// A notification from the runtime's event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    /// Object category, e.g. `container`, `network`, `volume`, `image`.
    pub category: String,
    pub action: String,
    pub actor: Actor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub attributes: HashMap<String, String>,
}

impl From<EventMessage> for Event {
    fn from(message: EventMessage) -> Self {
        let actor = message.actor.unwrap_or_default();
        Self {
            category: message.typ.map(|t| t.to_string()).unwrap_or_default(),
            action: message.action.unwrap_or_default(),
            actor: Actor {
                id: actor.id.unwrap_or_default(),
                attributes: actor.attributes.unwrap_or_default(),
            },
        }
    }
}

/// Container lifecycle actions the cleaner distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Start,
    Kill,
    Die,
    Stop,
    Destroy,
    Other,
}

impl Action {
    /// Parses the action of a container event. Actions with a detail suffix such as
    /// `exec_die` or `health_status: healthy` are never one of the plain lifecycle actions.
    pub fn parse(action: &str) -> Self {
        match action {
            "create" => Self::Create,
            "start" => Self::Start,
            "kill" => Self::Kill,
            "die" => Self::Die,
            "stop" => Self::Stop,
            "destroy" => Self::Destroy,
            _ => Self::Other,
        }
    }

    /// Whether the container can no longer be used for networking after this action.
    pub fn ends_container(self) -> bool {
        matches!(self, Self::Kill | Self::Die | Self::Stop | Self::Destroy)
    }
}

impl Event {
    pub fn is_container(&self) -> bool {
        self.category == CONTAINER_EVENT_TYPE
    }

    pub fn is_pod_sandbox(&self) -> bool {
        self.actor
            .attributes
            .get(CONTAINER_TYPE_LABEL)
            .is_some_and(|t| t == POD_SANDBOX_TYPE)
    }

    pub fn action(&self) -> Action {
        Action::parse(&self.action)
    }
}

pub trait ContainerRuntime {
    fn list_containers(
        &self,
        filter: ContainerFilter,
    ) -> impl std::future::Future<Output = Result<Vec<ContainerSummary>>> + Send;

    /// Opens the lifecycle event stream. Events are delivered in the runtime's order.
    fn subscribe_events(
        &self,
    ) -> impl std::future::Future<Output = Result<EventSubscription>> + Send;
}
