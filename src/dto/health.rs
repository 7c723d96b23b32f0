use serde::Serialize;
use utoipa::ToSchema;

/// Whether a storage backend is currently serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Storage installed and answering.
    Ok,
    /// No usable storage; game operations answer 503.
    Degraded,
}

/// Body of `GET /healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status.
    pub status: HealthStatus,
}

impl HealthResponse {
    /// Healthy response.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
        }
    }

    /// Degraded-mode response.
    pub fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
        }
    }
}
