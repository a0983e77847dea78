use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::pin;

use bollard::Docker;
use bollard::container::ListContainersOptions;
use bollard::system::EventsOptions;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use super::{
    CONTAINER_EVENT_TYPE, ContainerFilter, ContainerRuntime, ContainerSummary, Error, Event,
    EventSubscription, Result,
};
use crate::container::ContainerID;
use crate::error::ResultOkLogExt;

/// Seconds a request may take until the daemon sends response headers.
const REQUEST_TIMEOUT_SECS: u64 = 120;
/// Events buffered between the stream reader and the consumer.
const EVENT_BUFFER: usize = 64;

/// Docker Engine API client on the daemon's unix socket.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
    socket_path: PathBuf,
}

impl DockerRuntime {
    /// Sets up the client. No request is made until the first call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the client cannot be built for `socket_path`.
    pub fn connect(socket_path: PathBuf) -> Result<Self> {
        let docker = Docker::connect_with_unix(
            &socket_path.to_string_lossy(),
            REQUEST_TIMEOUT_SECS,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|source| Error::Connect {
            path: socket_path.clone(),
            source,
        })?;
        Ok(Self {
            docker,
            socket_path,
        })
    }

    /// Checks that the daemon answers on the socket.
    pub async fn ping(&self) -> Result<()> {
        self.docker.ping().await.map_err(Error::Ping)?;
        log::debug!("Runtime at {} is reachable", self.socket_path.display());
        Ok(())
    }
}

fn list_options(filter: ContainerFilter) -> ListContainersOptions<&'static str> {
    let mut filters = HashMap::new();
    if filter == ContainerFilter::Exited {
        filters.insert("status", vec!["exited"]);
    }
    ListContainersOptions {
        all: true,
        filters,
        ..Default::default()
    }
}

fn summary(container: bollard::models::ContainerSummary) -> Option<ContainerSummary> {
    let id = ContainerID::new(container.id.unwrap_or_default())
        .ok_log_with("Skipping listed container")?;
    Some(ContainerSummary {
        id,
        status: container.status.unwrap_or_default(),
    })
}

impl ContainerRuntime for DockerRuntime {
    async fn list_containers(&self, filter: ContainerFilter) -> Result<Vec<ContainerSummary>> {
        let containers = self
            .docker
            .list_containers(Some(list_options(filter)))
            .await
            .map_err(|source| Error::ListContainers { filter, source })?;
        let containers: Vec<ContainerSummary> =
            containers.into_iter().filter_map(summary).collect();
        log::debug!("Found {} containers ({:?})", containers.len(), filter);
        Ok(containers)
    }

    async fn subscribe_events(&self) -> Result<EventSubscription> {
        // the event stream only reports connection failures once it is polled
        self.ping().await?;
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let reader = tokio::spawn(read_events(self.docker.clone(), tx));
        log::info!("Subscribed to events on {}", self.socket_path.display());
        Ok(EventSubscription::new(rx, Some(reader)))
    }
}

/// Forwards container events until the stream ends, a read fails, or the subscription
/// is gone.
async fn read_events(docker: Docker, tx: mpsc::Sender<Result<Event>>) {
    let options = EventsOptions::<&str> {
        filters: HashMap::from([("type", vec![CONTAINER_EVENT_TYPE])]),
        ..Default::default()
    };
    let mut stream = pin!(docker.events(Some(options)));
    while let Some(message) = stream.next().await {
        let event = match message {
            Ok(message) => Event::from(message),
            Err(err) => {
                let _ = tx.send(Err(Error::EventMessage(err))).await;
                return;
            }
        };
        log::trace!(
            "Received event: type={}, action={}, id={}",
            event.category,
            event.action,
            event.actor.id
        );
        if tx.send(Ok(event)).await.is_err() {
            return;
        }
    }
    log::warn!("Runtime closed the event stream");
}
