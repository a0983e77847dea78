use clap::Parser;

/// Entry point for the DANM endpoint cleaner.
///
/// Runs one cleanup sweep over the endpoints of this host, then follows the container
/// runtime's events until terminated.
///
/// # Errors
///
/// Returns an error if setup fails (no host name, no cluster credentials, runtime socket
/// unreachable) or the runtime event stream ends.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=info danm-cleaner --kubeconfig /etc/kubernetes/kubelet.conf
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = danm_cleaner::config::Config::parse();
    danm_cleaner::run(config).await?;
    Ok(())
}
