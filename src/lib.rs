//! DANM Cleaner: garbage collection of network endpoints on a single node.
//!
//! Endpoints (`DanmEp`) are created by the CNI plugin whenever a pod gets a network
//! interface, and normally deleted again by the CNI delete path. When that path never runs
//! (the node rebooted, the runtime crashed, a container was force-removed) the endpoint
//! and the address it holds leak. This crate finds those endpoints by comparing the
//! registry with the containers the local runtime knows about, and keeps following the
//! runtime's events to catch dying pod sandboxes as they happen.

use cleaner::Cleaner;
use config::Config;
use ipam::DanmAllocator;
use registry::DanmRegistry;
use runtime::DockerRuntime;

pub mod cleaner;
pub mod config;
pub mod container;
pub mod error;
pub mod fsutil;
pub mod host;
pub mod ipam;
pub mod kube;
pub mod registry;
pub mod runtime;

/// Runs the cleaner until a shutdown signal arrives or the event stream fails.
///
/// The startup sweep runs to completion before the first event is read.
///
/// # Errors
///
/// Possible errors include:
/// - The host name cannot be resolved.
/// - No usable cluster credentials (kubeconfig or in-cluster service account).
/// - The container runtime does not answer on its socket.
/// - The event subscription cannot be established, breaks, or is closed.
pub async fn run(config: Config) -> Result<(), error::Error> {
    let hostname = host::resolve_hostname(config.hostname.as_deref())?;
    log::debug!("Hostname: {}", &hostname);

    let access = kube::ClusterAccess::resolve(config.kubeconfig_path().as_deref())?;
    let client = kube::KubeClient::new(access, config.request_timeout())?;

    let runtime = DockerRuntime::connect(config.docker_socket.clone())?;
    runtime.ping().await?;

    let cleaner = Cleaner::new(
        DanmRegistry::new(client.clone()),
        runtime,
        DanmAllocator::new(client),
        hostname,
    );

    cleaner.reconcile().await;
    cleaner.watch(shutdown_signal()).await?;

    Ok(())
}

/// Resolves on `SIGINT` or `SIGTERM`.
async fn shutdown_signal() {
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                log::warn!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => log::info!("Received SIGINT"),
        _ = terminate => log::info!("Received SIGTERM"),
    }
}
