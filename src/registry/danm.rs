use super::{Endpoint, EndpointRegistry, Error, Network, Result};
use crate::container::ContainerID;
use crate::kube::KubeClient;

const API_PREFIX: &str = "/apis/danm.k8s.io/v1";

#[derive(Debug, serde::Deserialize)]
struct EndpointList {
    #[serde(default)]
    items: Vec<Endpoint>,
}

pub(crate) fn network_path(namespace: &str, network_id: &str) -> String {
    format!("{API_PREFIX}/namespaces/{namespace}/danmnets/{network_id}")
}

fn endpoint_path(namespace: &str, name: &str) -> String {
    format!("{API_PREFIX}/namespaces/{namespace}/danmeps/{name}")
}

/// DANM custom resources served by the Kubernetes API.
///
/// Custom resources cannot be filtered by spec fields server-side, so endpoint lookups
/// list all endpoints of the cluster and filter locally.
#[derive(Debug, Clone)]
pub struct DanmRegistry {
    client: KubeClient,
}

impl DanmRegistry {
    pub fn new(client: KubeClient) -> Self {
        Self { client }
    }

    async fn list_endpoints(&self) -> Result<Vec<Endpoint>> {
        let list: Option<EndpointList> = self
            .client
            .get(&format!("{API_PREFIX}/danmeps"))
            .await
            .map_err(Error::ListEndpoints)?;
        Ok(list.map(|l| l.items).unwrap_or_default())
    }
}

impl EndpointRegistry for DanmRegistry {
    async fn list_endpoints_by_host(&self, host: &str) -> Result<Vec<Endpoint>> {
        let mut endpoints = self.list_endpoints().await?;
        endpoints.retain(|ep| ep.spec.host == host);
        log::debug!("Found {} endpoints on host `{}`", endpoints.len(), host);
        Ok(endpoints)
    }

    async fn list_endpoints_by_container(&self, cid: &ContainerID) -> Result<Vec<Endpoint>> {
        let mut endpoints = self.list_endpoints().await?;
        endpoints.retain(|ep| ep.spec.cid == cid.as_str());
        Ok(endpoints)
    }

    async fn get_network(&self, namespace: &str, network_id: &str) -> Result<Option<Network>> {
        self.client
            .get(&network_path(namespace, network_id))
            .await
            .map_err(|source| Error::GetNetwork {
                namespace: namespace.to_owned(),
                network_id: network_id.to_owned(),
                source,
            })
    }

    async fn delete_endpoint(&self, namespace: &str, name: &str) -> Result<()> {
        let deleted = self
            .client
            .delete(&endpoint_path(namespace, name))
            .await
            .map_err(|source| Error::DeleteEndpoint {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
                source,
            })?;
        if !deleted {
            log::debug!("Endpoint `{namespace}/{name}` was already gone");
        }
        Ok(())
    }
}
