//! Wire models for the Compute Engine v1 REST API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ComputeError;
use crate::gce::connection::{AttachedDisk, AvailabilityZone, Disk, Instance};
use crate::gce::types::{DiskMode, InstanceStatus};

/// Returns the final path segment of a resource URL.
fn last_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// A page of a list response.
pub(super) trait Page {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct InsertDiskRequest<'a> {
    pub(super) name: &'a str,
    pub(super) size_gb: String,
    #[serde(rename = "type")]
    pub(super) disk_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AttachDiskRequest<'a> {
    pub(super) source: String,
    pub(super) mode: DiskMode,
    pub(super) device_name: &'a str,
    pub(super) boot: bool,
    pub(super) auto_delete: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ApiDisk {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    zone: String,
    #[serde(default)]
    size_gb: Option<String>,
    #[serde(default)]
    status: String,
}

impl ApiDisk {
    pub(super) fn into_disk(self) -> Result<Disk, ComputeError> {
        let size_gb = match self.size_gb.as_deref() {
            None => 0,
            Some(raw) => raw.parse().map_err(|err| ComputeError::Decode {
                url: self.name.clone(),
                message: format!("invalid sizeGb {raw:?}: {err}"),
            })?,
        };
        Ok(Disk {
            id: self.id,
            zone: last_segment(&self.zone).to_owned(),
            name: self.name,
            size_gb,
            status: self.status,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DiskList {
    #[serde(default)]
    items: Vec<ApiDisk>,
    next_page_token: Option<String>,
}

impl Page for DiskList {
    type Item = ApiDisk;

    fn into_parts(self) -> (Vec<ApiDisk>, Option<String>) {
        (self.items, self.next_page_token)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ApiAttachedDisk {
    #[serde(default)]
    device_name: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    mode: DiskMode,
}

impl From<ApiAttachedDisk> for AttachedDisk {
    fn from(value: ApiAttachedDisk) -> Self {
        Self {
            volume_name: last_segment(&value.source).to_owned(),
            device_name: value.device_name,
            mode: value.mode,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ApiInstance {
    name: String,
    #[serde(default)]
    zone: String,
    status: InstanceStatus,
    #[serde(default)]
    disks: Vec<ApiAttachedDisk>,
}

impl ApiInstance {
    pub(super) fn into_attached_disks(self) -> Vec<AttachedDisk> {
        self.disks.into_iter().map(AttachedDisk::from).collect()
    }
}

// Instances are addressed by name throughout the provider.
impl From<ApiInstance> for Instance {
    fn from(value: ApiInstance) -> Self {
        Self {
            id: value.name,
            zone: last_segment(&value.zone).to_owned(),
            status: value.status,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct InstanceList {
    #[serde(default)]
    items: Vec<ApiInstance>,
    next_page_token: Option<String>,
}

impl Page for InstanceList {
    type Item = ApiInstance;

    fn into_parts(self) -> (Vec<ApiInstance>, Option<String>) {
        (self.items, self.next_page_token)
    }
}

#[derive(Deserialize)]
struct InstancesScopedList {
    #[serde(default)]
    instances: Vec<ApiInstance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AggregatedInstanceList {
    #[serde(default)]
    items: BTreeMap<String, InstancesScopedList>,
    next_page_token: Option<String>,
}

impl Page for AggregatedInstanceList {
    type Item = ApiInstance;

    fn into_parts(self) -> (Vec<ApiInstance>, Option<String>) {
        let instances = self
            .items
            .into_values()
            .flat_map(|scoped| scoped.instances)
            .collect();
        (instances, self.next_page_token)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct ApiZone {
    name: String,
    #[serde(default)]
    region: String,
}

impl ApiZone {
    pub(super) fn in_region(&self, region: &str) -> bool {
        region.is_empty() || last_segment(&self.region) == region
    }
}

impl From<ApiZone> for AvailabilityZone {
    fn from(value: ApiZone) -> Self {
        Self::new(value.name)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ZoneList {
    #[serde(default)]
    items: Vec<ApiZone>,
    next_page_token: Option<String>,
}

impl Page for ZoneList {
    type Item = ApiZone;

    fn into_parts(self) -> (Vec<ApiZone>, Option<String>) {
        (self.items, self.next_page_token)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct Operation {
    pub(super) name: String,
    #[serde(default)]
    pub(super) status: String,
    #[serde(default)]
    pub(super) error: Option<OperationErrors>,
}

impl Operation {
    pub(super) fn is_done(&self) -> bool {
        self.status == "DONE"
    }

    /// Joins the error messages reported by a finished operation.
    pub(super) fn failure_message(&self) -> Option<String> {
        let errors = &self.error.as_ref()?.errors;
        if errors.is_empty() {
            return None;
        }
        Some(
            errors
                .iter()
                .map(|item| format!("{}: {}", item.code, item.message))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct OperationErrors {
    #[serde(default)]
    errors: Vec<OperationErrorItem>,
}

#[derive(Clone, Debug, Deserialize)]
struct OperationErrorItem {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).unwrap_or_else(|err| panic!("parse: {err}"))
    }

    #[test]
    fn disk_sizes_are_parsed_from_strings() {
        let disk: ApiDisk = parse(
            r#"{"id":"42","name":"us-east1-b--abc","sizeGb":"10","status":"READY",
                "zone":"https://compute.googleapis.com/compute/v1/projects/p/zones/us-east1-b"}"#,
        );
        let converted = disk.into_disk().unwrap_or_else(|err| panic!("convert: {err}"));
        assert_eq!(converted.size_gb, 10);
        assert_eq!(converted.zone, "us-east1-b");
        assert_eq!(converted.name, "us-east1-b--abc");
    }

    #[test]
    fn invalid_disk_size_is_a_decode_error() {
        let disk: ApiDisk = parse(r#"{"name":"d","sizeGb":"ten"}"#);
        assert!(matches!(disk.into_disk(), Err(ComputeError::Decode { .. })));
    }

    #[test]
    fn attached_disks_take_volume_name_from_source() {
        let instance: ApiInstance = parse(
            r#"{"name":"i-1","status":"RUNNING","zone":"zones/us-east1-b",
                "disks":[{"deviceName":"persistent-disk-1","mode":"READ_ONLY",
                          "source":"projects/p/zones/us-east1-b/disks/us-east1-b--abc"}]}"#,
        );
        let disks = instance.into_attached_disks();
        assert_eq!(
            disks,
            vec![AttachedDisk {
                volume_name: String::from("us-east1-b--abc"),
                device_name: String::from("persistent-disk-1"),
                mode: DiskMode::ReadOnly,
            }]
        );
    }

    #[test]
    fn aggregated_instances_flatten_all_zones() {
        let list: AggregatedInstanceList = parse(
            r#"{"items":{
                "zones/us-east1-b":{"instances":[{"name":"a","status":"RUNNING","zone":"zones/us-east1-b"}]},
                "zones/us-east1-c":{"warning":{"code":"NO_RESULTS_ON_PAGE"}},
                "zones/us-east1-d":{"instances":[{"name":"b","status":"RUNNING","zone":"zones/us-east1-d"}]}
            },"nextPageToken":"next"}"#,
        );
        let (instances, token) = list.into_parts();
        let names: Vec<Instance> = instances.into_iter().map(Instance::from).collect();
        assert_eq!(names.len(), 2);
        assert_eq!(names.first().map(|i| i.zone.as_str()), Some("us-east1-b"));
        assert_eq!(token.as_deref(), Some("next"));
    }

    #[test]
    fn zones_match_region_by_url_suffix() {
        let zone: ApiZone = parse(
            r#"{"name":"us-east1-b","status":"UP","region":"https://x/projects/p/regions/us-east1"}"#,
        );
        assert!(zone.in_region("us-east1"));
        assert!(zone.in_region(""));
        assert!(!zone.in_region("us-east4"));
    }

    #[test]
    fn operation_failures_join_messages() {
        let operation: Operation = parse(
            r#"{"name":"op-1","status":"DONE","error":{"errors":[
                {"code":"QUOTA_EXCEEDED","message":"quota"},
                {"code":"RESOURCE_IN_USE","message":"busy"}]}}"#,
        );
        assert!(operation.is_done());
        assert_eq!(
            operation.failure_message().as_deref(),
            Some("QUOTA_EXCEEDED: quota; RESOURCE_IN_USE: busy")
        );
    }

    #[test]
    fn insert_request_serialises_api_field_names() {
        let request = InsertDiskRequest {
            name: "z--1",
            size_gb: String::from("2"),
            disk_type: String::from("zones/z/diskTypes/pd-ssd"),
        };
        let json = serde_json::to_string(&request).unwrap_or_else(|err| panic!("json: {err}"));
        assert_eq!(
            json,
            r#"{"name":"z--1","sizeGb":"2","type":"zones/z/diskTypes/pd-ssd"}"#
        );
    }

    #[test]
    fn attach_request_uses_api_mode_spelling() {
        let request = AttachDiskRequest {
            source: String::from("projects/p/zones/z/disks/z--1"),
            mode: DiskMode::ReadWrite,
            device_name: "z--1",
            boot: false,
            auto_delete: false,
        };
        let json = serde_json::to_string(&request).unwrap_or_else(|err| panic!("json: {err}"));
        assert!(json.contains(r#""mode":"READ_WRITE""#));
        assert!(json.contains(r#""deviceName":"z--1""#));
        assert!(json.contains(r#""autoDelete":false"#));
    }
}
