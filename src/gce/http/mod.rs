//! Compute Engine v1 REST client implementing [`Connection`].

mod disks;
mod error;
mod instances;
mod models;
mod operation;

use std::time::Duration;

use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::connection::{
    AttachedDisk, AvailabilityZone, BackendFuture, Connection, Connector, Disk, DiskSpec,
    Instance,
};
use super::types::{DiskMode, InstanceStatus};
use crate::config::EnvironConfig;
use crate::storage::StorageError;

pub use error::ComputeError;
use models::Page;

/// Authenticated client for one Google Cloud project.
#[derive(Clone, Debug)]
pub struct ComputeClient {
    http: reqwest::Client,
    project_base: Url,
    access_token: String,
    poll_interval: Duration,
    operation_timeout: Duration,
}

impl ComputeClient {
    /// Builds a client from the environment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::InvalidEndpoint`] when the API endpoint is not
    /// a usable base URL and [`ComputeError::Client`] when the HTTP client
    /// cannot be built.
    pub fn new(environ: &EnvironConfig) -> Result<Self, ComputeError> {
        let raw_endpoint = environ.api_endpoint.trim();
        let endpoint = Url::parse(raw_endpoint).map_err(|err| ComputeError::InvalidEndpoint {
            endpoint: raw_endpoint.to_owned(),
            message: err.to_string(),
        })?;
        let project_base = append_segments(&endpoint, &["projects", environ.project_id.trim()])?;
        let http = reqwest::Client::builder()
            .timeout(environ.http_timeout())
            .build()
            .map_err(|err| ComputeError::Client {
                message: err.to_string(),
            })?;
        Ok(Self {
            http,
            project_base,
            access_token: environ.access_token.trim().to_owned(),
            poll_interval: environ.operation_poll_interval(),
            operation_timeout: environ.operation_timeout(),
        })
    }

    fn project_url(&self, segments: &[&str]) -> Result<Url, ComputeError> {
        append_segments(&self.project_base, segments)
    }

    fn zone_url(&self, zone: &str, segments: &[&str]) -> Result<Url, ComputeError> {
        let mut path = vec!["zones", zone];
        path.extend_from_slice(segments);
        append_segments(&self.project_base, &path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<T, ComputeError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|err| ComputeError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ComputeError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        if !status.is_success() {
            return Err(ComputeError::Api {
                status: status.as_u16(),
                url: url.to_string(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice(&body).map_err(|err| ComputeError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ComputeError> {
        self.send(self.http.get(url.clone()), url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<T, ComputeError> {
        self.send(self.http.post(url.clone()).json(body), url).await
    }

    async fn list_pages<P: Page + DeserializeOwned>(
        &self,
        url: &Url,
        query: &[(&str, &str)],
    ) -> Result<Vec<P::Item>, ComputeError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let token_query: Vec<(&str, &str)> = page_token
                .iter()
                .map(|token| ("pageToken", token.as_str()))
                .collect();
            let request = self.http.get(url.clone()).query(query).query(&token_query);
            let page: P = self.send(request, url).await?;
            let (page_items, next) = page.into_parts();
            items.extend(page_items);
            match next.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(items),
            }
        }
    }
}

/// Appends path segments to `base`, percent-encoding each one so that names
/// can never introduce extra path components.
fn append_segments(base: &Url, segments: &[&str]) -> Result<Url, ComputeError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ComputeError::InvalidEndpoint {
            endpoint: base.to_string(),
            message: String::from("endpoint cannot be a base URL"),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

impl Connection for ComputeClient {
    type Error = ComputeError;

    fn create_disks<'a>(
        &'a self,
        zone: &'a str,
        specs: &'a [DiskSpec],
    ) -> BackendFuture<'a, Vec<Disk>, Self::Error> {
        Box::pin(async move { self.insert_disks(zone, specs).await })
    }

    fn remove_disk<'a>(
        &'a self,
        zone: &'a str,
        name: &'a str,
    ) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move { self.delete_disk(zone, name).await })
    }

    fn attach_disk<'a>(
        &'a self,
        zone: &'a str,
        volume_name: &'a str,
        instance_id: &'a str,
        mode: DiskMode,
    ) -> BackendFuture<'a, AttachedDisk, Self::Error> {
        Box::pin(async move {
            self.attach_to_instance(zone, volume_name, instance_id, mode)
                .await
        })
    }

    fn detach_disk<'a>(
        &'a self,
        zone: &'a str,
        instance_id: &'a str,
        volume_name: &'a str,
    ) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move {
            self.detach_from_instance(zone, instance_id, volume_name)
                .await
        })
    }

    fn disk<'a>(&'a self, zone: &'a str, name: &'a str) -> BackendFuture<'a, Disk, Self::Error> {
        Box::pin(async move { self.fetch_disk(zone, name).await })
    }

    fn disks<'a>(&'a self, zone: &'a str) -> BackendFuture<'a, Vec<Disk>, Self::Error> {
        Box::pin(async move { self.list_disks(zone).await })
    }

    fn instances<'a>(
        &'a self,
        zone: Option<&'a str>,
        status: InstanceStatus,
    ) -> BackendFuture<'a, Vec<Instance>, Self::Error> {
        Box::pin(async move { self.list_instances(zone, status).await })
    }

    fn instance_disks<'a>(
        &'a self,
        zone: &'a str,
        instance_id: &'a str,
    ) -> BackendFuture<'a, Vec<AttachedDisk>, Self::Error> {
        Box::pin(async move { self.attached_disks(zone, instance_id).await })
    }

    fn availability_zones<'a>(
        &'a self,
        region: &'a str,
    ) -> BackendFuture<'a, Vec<AvailabilityZone>, Self::Error> {
        Box::pin(async move { self.list_zones(region).await })
    }
}

/// Connector producing [`ComputeClient`] connections.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ComputeConnector;

impl Connector for ComputeConnector {
    type Connection = ComputeClient;

    fn connect(&self, environ: &EnvironConfig) -> Result<ComputeClient, StorageError> {
        environ
            .validate()
            .map_err(|err| StorageError::Config(err.to_string()))?;
        ComputeClient::new(environ)
            .map_err(|err| StorageError::backend("cannot connect to compute API", err))
    }
}
