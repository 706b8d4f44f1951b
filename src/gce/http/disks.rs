//! Persistent disk requests.

use super::models::{ApiDisk, AttachDiskRequest, DiskList, InsertDiskRequest, Operation};
use super::{ComputeClient, ComputeError};
use crate::gce::connection::{AttachedDisk, Disk, DiskSpec};
use crate::gce::types::DiskMode;

impl ComputeClient {
    pub(super) async fn insert_disks(
        &self,
        zone: &str,
        specs: &[DiskSpec],
    ) -> Result<Vec<Disk>, ComputeError> {
        let url = self.zone_url(zone, &["disks"])?;
        let mut created = Vec::with_capacity(specs.len());
        for spec in specs {
            let payload = InsertDiskRequest {
                name: &spec.name,
                size_gb: spec.size_hint_gb.to_string(),
                disk_type: format!("zones/{zone}/diskTypes/{}", spec.disk_type),
            };
            let operation: Operation = self.post(&url, &payload).await?;
            self.wait_for_operation(zone, operation).await?;
            created.push(self.fetch_disk(zone, &spec.name).await?);
        }
        Ok(created)
    }

    pub(super) async fn delete_disk(&self, zone: &str, name: &str) -> Result<(), ComputeError> {
        let url = self.zone_url(zone, &["disks", name])?;
        let operation: Operation = self.send(self.http.delete(url.clone()), &url).await?;
        self.wait_for_operation(zone, operation).await
    }

    pub(super) async fn fetch_disk(&self, zone: &str, name: &str) -> Result<Disk, ComputeError> {
        let url = self.zone_url(zone, &["disks", name])?;
        let disk: ApiDisk = self.get(&url).await?;
        disk.into_disk()
    }

    pub(super) async fn list_disks(&self, zone: &str) -> Result<Vec<Disk>, ComputeError> {
        let url = self.zone_url(zone, &["disks"])?;
        self.list_pages::<DiskList>(&url, &[])
            .await?
            .into_iter()
            .map(ApiDisk::into_disk)
            .collect()
    }

    pub(super) async fn attach_to_instance(
        &self,
        zone: &str,
        volume_name: &str,
        instance_id: &str,
        mode: DiskMode,
    ) -> Result<AttachedDisk, ComputeError> {
        let url = self.zone_url(zone, &["instances", instance_id, "attachDisk"])?;
        let payload = AttachDiskRequest {
            source: self.zone_url(zone, &["disks", volume_name])?.to_string(),
            mode,
            device_name: volume_name,
            boot: false,
            auto_delete: false,
        };
        let operation: Operation = self.post(&url, &payload).await?;
        self.wait_for_operation(zone, operation).await?;

        self.attached_disks(zone, instance_id)
            .await?
            .into_iter()
            .find(|disk| disk.volume_name == volume_name)
            .ok_or_else(|| ComputeError::NotAttached {
                volume_name: volume_name.to_owned(),
                instance_id: instance_id.to_owned(),
            })
    }

    pub(super) async fn detach_from_instance(
        &self,
        zone: &str,
        instance_id: &str,
        volume_name: &str,
    ) -> Result<(), ComputeError> {
        let attached = self
            .attached_disks(zone, instance_id)
            .await?
            .into_iter()
            .find(|disk| disk.volume_name == volume_name)
            .ok_or_else(|| ComputeError::NotAttached {
                volume_name: volume_name.to_owned(),
                instance_id: instance_id.to_owned(),
            })?;

        let url = self.zone_url(zone, &["instances", instance_id, "detachDisk"])?;
        let request = self
            .http
            .post(url.clone())
            .query(&[("deviceName", attached.device_name.as_str())])
            .header(reqwest::header::CONTENT_LENGTH, 0);
        let operation: Operation = self.send(request, &url).await?;
        self.wait_for_operation(zone, operation).await
    }
}
