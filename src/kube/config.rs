use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{Error, Result};
use crate::fsutil;

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Resolved credentials and endpoint of the API server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterAccess {
    pub server: String,
    pub ca_pem: Option<Vec<u8>>,
    pub insecure_skip_tls_verify: bool,
    pub token: Option<String>,
    /// Client certificate followed by its private key, PEM encoded.
    pub identity_pem: Option<Vec<u8>>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Kubeconfig {
    #[serde(default)]
    clusters: Vec<Named<Cluster>>,
    #[serde(default)]
    contexts: Vec<Named<Context>>,
    #[serde(default)]
    users: Vec<NamedUser>,
    current_context: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct Named<T> {
    name: String,
    #[serde(alias = "cluster", alias = "context")]
    value: T,
}

#[derive(Debug, serde::Deserialize)]
struct NamedUser {
    name: String,
    user: AuthInfo,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Cluster {
    server: String,
    certificate_authority: Option<PathBuf>,
    certificate_authority_data: Option<String>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, serde::Deserialize)]
struct Context {
    cluster: String,
    user: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AuthInfo {
    token: Option<String>,
    #[serde(rename = "tokenFile")]
    token_file: Option<PathBuf>,
    client_certificate: Option<PathBuf>,
    client_certificate_data: Option<String>,
    client_key: Option<PathBuf>,
    client_key_data: Option<String>,
}

impl ClusterAccess {
    /// Resolves cluster access from the given kubeconfig, or from the in-cluster
    /// service account when no kubeconfig is given.
    pub fn resolve(kubeconfig: Option<&Path>) -> Result<Self> {
        match kubeconfig {
            Some(path) => Self::from_kubeconfig(path),
            None => Self::in_cluster(),
        }
    }

    /// Reads the current context of a kubeconfig file.
    ///
    /// Relative file references inside the kubeconfig are resolved against the
    /// directory that contains it, like kubectl does.
    pub fn from_kubeconfig(path: &Path) -> Result<Self> {
        let content = fsutil::read_to_string(path)?;
        let config: Kubeconfig = serde_yaml::from_str(&content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_parsed(config, base_dir)
    }

    fn from_parsed(config: Kubeconfig, base_dir: &Path) -> Result<Self> {
        let context_name = config
            .current_context
            .filter(|c| !c.is_empty())
            .ok_or(Error::MissingCurrentContext)?;
        let context = config
            .contexts
            .into_iter()
            .find(|c| c.name == context_name)
            .ok_or_else(|| Error::UnknownContext(context_name.clone()))?
            .value;
        let cluster = config
            .clusters
            .into_iter()
            .find(|c| c.name == context.cluster)
            .ok_or_else(|| Error::UnknownCluster(context.cluster.clone()))?
            .value;
        let user = match context.user {
            Some(user_name) => {
                config
                    .users
                    .into_iter()
                    .find(|u| u.name == user_name)
                    .ok_or(Error::UnknownUser(user_name))?
                    .user
            }
            None => AuthInfo::default(),
        };

        let ca_pem = inline_or_file(
            "certificate-authority-data",
            cluster.certificate_authority_data.as_deref(),
            cluster.certificate_authority.as_deref(),
            base_dir,
        )?;

        let token = match (user.token, user.token_file) {
            (Some(token), _) => Some(token),
            (None, Some(file)) => Some(fsutil::read_trimmed(base_dir.join(file))?),
            (None, None) => None,
        };

        let cert = inline_or_file(
            "client-certificate-data",
            user.client_certificate_data.as_deref(),
            user.client_certificate.as_deref(),
            base_dir,
        )?;
        let key = inline_or_file(
            "client-key-data",
            user.client_key_data.as_deref(),
            user.client_key.as_deref(),
            base_dir,
        )?;
        let identity_pem = match (cert, key) {
            (Some(mut cert), Some(key)) => {
                if !cert.ends_with(b"\n") {
                    cert.push(b'\n');
                }
                cert.extend_from_slice(&key);
                Some(cert)
            }
            (Some(_), None) | (None, Some(_)) => {
                log::warn!("kubeconfig user has only half of a client certificate pair, ignoring it");
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            server: cluster.server,
            ca_pem,
            insecure_skip_tls_verify: cluster.insecure_skip_tls_verify,
            token,
            identity_pem,
        })
    }

    /// Uses the service account mounted into every pod.
    pub fn in_cluster() -> Result<Self> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST")
            .map_err(|_| Error::NotInCluster("KUBERNETES_SERVICE_HOST"))?;
        let port = std::env::var("KUBERNETES_SERVICE_PORT")
            .map_err(|_| Error::NotInCluster("KUBERNETES_SERVICE_PORT"))?;
        Self::from_service_account(&host, &port, Path::new(SERVICE_ACCOUNT_DIR))
    }

    fn from_service_account(host: &str, port: &str, dir: &Path) -> Result<Self> {
        // IPv6 service addresses have to be bracketed in the URL.
        let server = if host.contains(':') {
            format!("https://[{host}]:{port}")
        } else {
            format!("https://{host}:{port}")
        };
        Ok(Self {
            server,
            ca_pem: Some(fsutil::read_bytes(dir.join("ca.crt"))?),
            insecure_skip_tls_verify: false,
            token: Some(fsutil::read_trimmed(dir.join("token"))?),
            identity_pem: None,
        })
    }
}

fn inline_or_file(
    field: &'static str,
    inline: Option<&str>,
    file: Option<&Path>,
    base_dir: &Path,
) -> Result<Option<Vec<u8>>> {
    if let Some(data) = inline {
        return STANDARD
            .decode(data.trim())
            .map(Some)
            .map_err(|source| Error::Base64 { field, source });
    }
    match file {
        Some(file) => Ok(Some(fsutil::read_bytes(base_dir.join(file))?)),
        None => Ok(None),
    }
}
