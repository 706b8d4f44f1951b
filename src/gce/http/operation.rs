//! Zone operation polling.

use std::time::Instant;

use tokio::time::sleep;

use super::models::Operation;
use super::{ComputeClient, ComputeError};

impl ComputeClient {
    /// Polls a zone operation until it reports `DONE`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Operation`] when the finished operation carries
    /// errors and [`ComputeError::Timeout`] when it does not finish in time.
    pub(super) async fn wait_for_operation(
        &self,
        zone: &str,
        started: Operation,
    ) -> Result<(), ComputeError> {
        let deadline = Instant::now() + self.operation_timeout;
        let mut current = started;
        loop {
            if current.is_done() {
                return match current.failure_message() {
                    Some(message) => Err(ComputeError::Operation {
                        operation: current.name,
                        message,
                    }),
                    None => Ok(()),
                };
            }

            if Instant::now() > deadline {
                return Err(ComputeError::Timeout {
                    operation: current.name,
                });
            }

            sleep(self.poll_interval).await;
            let url = self.zone_url(zone, &["operations", current.name.as_str()])?;
            current = self.get(&url).await?;
        }
    }
}
