//! Push-gateway delivery of a gathered metric set.

use crate::client::{AuthClient, OutboundRequest};
use crate::error::{PushError, Result};
use nimbus_common::expose;
use nimbus_common::types::Sample;

/// Serializes full metric sets and PUTs them to the push gateway through the
/// authenticated client.
///
/// Grouping keys become URL path segments, so every push replaces the same
/// metric group on the gateway.
pub struct Pusher {
    client: AuthClient,
    url: String,
}

impl Pusher {
    pub fn new(client: AuthClient, gateway_url: &str, job: &str) -> Self {
        Self {
            client,
            url: format!("{}/metrics/job/{job}", gateway_url.trim_end_matches('/')),
        }
    }

    /// Appends a grouping label to the push URL.
    ///
    /// Values the gateway cannot carry in a path segment (empty, or
    /// containing `/`) are skipped with a warning rather than corrupting
    /// the group.
    pub fn grouping(mut self, name: &str, value: &str) -> Self {
        if value.is_empty() || value.contains('/') {
            tracing::warn!(name, value, "skipping unusable grouping value");
            return self;
        }
        self.url = format!("{}/{name}/{value}", self.url);
        self
    }

    /// Pushes one gathered metric set.
    pub async fn push(&mut self, samples: &[Sample]) -> Result<()> {
        let body = expose::encode(samples).into_bytes();
        let request = OutboundRequest::put(
            self.url.clone(),
            expose::TEXT_FORMAT_CONTENT_TYPE,
            body,
        );

        let response = self.client.execute(&request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PushError::GatewayStatus(status.as_u16()));
        }
        Ok(())
    }
}
