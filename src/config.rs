//! Process configuration.
//!
//! Every flag can also be supplied through the environment, which is how the
//! cleaner is usually configured when it runs as a DaemonSet.
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Per-node garbage collector for DANM network endpoints
#[derive(Parser, Debug, Clone)]
#[command(name = "danm-cleaner")]
#[command(about = "Removes network endpoints of dead or vanished containers on this host")]
pub struct Config {
    /// Path to a kubeconfig. Only required if out-of-cluster. Of a `:`-separated list,
    /// as kubectl accepts in `KUBECONFIG`, the first entry is used.
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Unix socket of the Docker Engine API
    #[arg(long, env = "DOCKER_SOCKET", default_value = "/var/run/docker.sock")]
    pub docker_socket: PathBuf,

    /// Name of this host as recorded in the endpoints' `Host` field.
    /// Defaults to the operating system hostname.
    #[arg(long, env = "NODE_NAME")]
    pub hostname: Option<String>,

    /// Timeout in seconds for each Kubernetes API request
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The kubeconfig to read, if any. Files are not merged.
    pub fn kubeconfig_path(&self) -> Option<PathBuf> {
        let list = self.kubeconfig.as_ref()?;
        std::env::split_paths(list).find(|p| !p.as_os_str().is_empty())
    }
}
