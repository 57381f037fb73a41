// Identity platform integration
//
// The platform is an optional collaborator: when a service-account key is
// present the integration is reported as enabled, otherwise the API runs
// without it. Nothing in the triage path depends on it.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    project_id: Option<String>,
    client_email: Option<String>,
}

/// Whether platform features are available
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformStatus {
    Enabled { project_id: String },
    Disabled { reason: String },
}

impl PlatformStatus {
    pub fn is_enabled(&self) -> bool {
        matches!(self, PlatformStatus::Enabled { .. })
    }
}

/// Inspect the service-account key at `path`. Never fails; problems are
/// logged and reported as `Disabled`.
pub fn discover(path: &Path) -> PlatformStatus {
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "Service account key not found, platform features disabled"
        );
        return PlatformStatus::Disabled {
            reason: format!("{} not found", path.display()),
        };
    }

    let key = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str::<ServiceAccountKey>(&raw).map_err(|e| e.to_string()));

    match key {
        Ok(ServiceAccountKey {
            project_id: Some(project_id),
            client_email,
        }) => {
            tracing::info!(
                %project_id,
                client_email = client_email.as_deref().unwrap_or("unknown"),
                "Platform initialized with service account key"
            );
            PlatformStatus::Enabled { project_id }
        }
        Ok(_) => {
            tracing::error!(path = %path.display(), "Service account key has no project_id");
            PlatformStatus::Disabled {
                reason: "service account key has no project_id".to_string(),
            }
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Error initializing platform");
            PlatformStatus::Disabled { reason: e }
        }
    }
}
