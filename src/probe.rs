use std::{sync::Arc, time::Duration};

use tokio::sync::Semaphore;
use tracing::debug;

use crate::entry::Status;

/// Checks whether stream locations answer over the network.
///
/// Every probe is a single GET bounded by `timeout`; the shared semaphore caps
/// how many run at once.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl HttpProbe {
    #[must_use]
    pub fn new(client: reqwest::Client, timeout: Duration, parallelism: usize) -> Self {
        Self {
            client,
            timeout,
            permits: Arc::new(Semaphore::new(parallelism.max(1))),
        }
    }

    /// Any response counts as [`Status::Good`]; transport errors and timeouts are [`Status::Bad`].
    pub async fn probe(&self, location: &str) -> Status {
        let Ok(_permit) = self.permits.acquire().await else {
            return Status::Bad;
        };

        match self.client.get(location).timeout(self.timeout).send().await {
            Ok(res) => {
                debug!("{location} answered {}", res.status());
                Status::Good
            }
            Err(e) => {
                debug!("{location} is unreachable: {e}");
                Status::Bad
            }
        }
    }
}
