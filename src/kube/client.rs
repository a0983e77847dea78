use std::time::Duration;

use reqwest::{Certificate, Identity, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{ClusterAccess, Error, Result};

/// Outcome of an optimistic-concurrency `PUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Updated,
    /// The object's `resourceVersion` changed since it was read.
    Conflict,
}

/// Thin JSON client for resource paths of the API server.
#[derive(Debug, Clone)]
pub struct KubeClient {
    http: reqwest::Client,
    server: String,
    token: Option<String>,
}

impl KubeClient {
    pub fn new(access: ClusterAccess, timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(access.insecure_skip_tls_verify);
        if let Some(ca) = &access.ca_pem {
            for cert in Certificate::from_pem_bundle(ca).map_err(Error::ClientBuild)? {
                builder = builder.add_root_certificate(cert);
            }
        }
        if let Some(pem) = &access.identity_pem {
            builder = builder.identity(Identity::from_pem(pem).map_err(Error::ClientBuild)?);
        }
        let http = builder.build().map_err(Error::ClientBuild)?;
        log::debug!("Created API client for {}", access.server);

        Ok(Self {
            http,
            server: access.server.trim_end_matches('/').to_owned(),
            token: access.token,
        })
    }

    /// Fetches and decodes the object at `path`. A missing object yields `None`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status("GET", path, response).await?;
        let body = response.bytes().await.map_err(|source| Error::Request {
            method: "GET",
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| Error::Decode {
                path: path.to_owned(),
                source,
            })
    }

    /// Replaces the object at `path`. The body must carry the `resourceVersion` it was read
    /// with, so concurrent writers are detected instead of overwritten.
    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<PutOutcome> {
        let response = self.send(Method::PUT, path, Some(body)).await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(PutOutcome::Conflict);
        }
        check_status("PUT", path, response).await?;
        Ok(PutOutcome::Updated)
    }

    /// Deletes the object at `path`. Returns `false` if it did not exist.
    pub async fn delete(&self, path: &str) -> Result<bool> {
        let response = self.send(Method::DELETE, path, None::<&()>).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status("DELETE", path, response).await?;
        Ok(true)
    }

    async fn send<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<reqwest::Response> {
        let method_name = method_name(&method);
        let mut request = self
            .http
            .request(method, format!("{}{}", self.server, path))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        log::trace!("{method_name} {path}");
        request.send().await.map_err(|source| Error::Request {
            method: method_name,
            path: path.to_owned(),
            source,
        })
    }
}

async fn check_status(
    method: &'static str,
    path: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        method,
        path: path.to_owned(),
        status: status.as_u16(),
        body,
    })
}

fn method_name(method: &Method) -> &'static str {
    if *method == Method::GET {
        "GET"
    } else if *method == Method::PUT {
        "PUT"
    } else if *method == Method::DELETE {
        "DELETE"
    } else {
        "REQUEST"
    }
}
