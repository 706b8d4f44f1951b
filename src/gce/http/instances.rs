//! Instance and zone queries.

use super::models::{AggregatedInstanceList, ApiInstance, InstanceList, ZoneList};
use super::{ComputeClient, ComputeError};
use crate::gce::connection::{AttachedDisk, AvailabilityZone, Instance};
use crate::gce::types::InstanceStatus;

impl ComputeClient {
    pub(super) async fn list_instances(
        &self,
        zone: Option<&str>,
        status: InstanceStatus,
    ) -> Result<Vec<Instance>, ComputeError> {
        let filter = format!("status = {}", status.as_str());
        let query = [("filter", filter.as_str())];
        let instances = match zone {
            Some(name) => {
                let url = self.zone_url(name, &["instances"])?;
                self.list_pages::<InstanceList>(&url, &query).await?
            }
            None => {
                let url = self.project_url(&["aggregated", "instances"])?;
                self.list_pages::<AggregatedInstanceList>(&url, &query)
                    .await?
            }
        };
        Ok(instances
            .into_iter()
            .map(Instance::from)
            .filter(|instance| instance.status == status)
            .collect())
    }

    pub(super) async fn attached_disks(
        &self,
        zone: &str,
        instance_id: &str,
    ) -> Result<Vec<AttachedDisk>, ComputeError> {
        let url = self.zone_url(zone, &["instances", instance_id])?;
        let instance: ApiInstance = self.get(&url).await?;
        Ok(instance.into_attached_disks())
    }

    pub(super) async fn list_zones(
        &self,
        region: &str,
    ) -> Result<Vec<AvailabilityZone>, ComputeError> {
        let url = self.project_url(&["zones"])?;
        Ok(self
            .list_pages::<ZoneList>(&url, &[])
            .await?
            .into_iter()
            .filter(|zone| zone.in_region(region))
            .map(AvailabilityZone::from)
            .collect())
    }
}
