//! Provisioning engine seam
//!
//! Creating, diffing and ordering provider calls belongs to an external
//! engine. This trait is the contract stackwright hands manifests across.

use crate::action::{ApplyResult, Plan};
use crate::error::{CloudError, Result};
use crate::manifest::DeploymentManifest;
use crate::resource::SecretPolicy;
use crate::store::ManifestStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument, warn};

#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Engine name (e.g. "manifest")
    fn name(&self) -> &str;

    /// Engine display name for UI
    fn display_name(&self) -> &str;

    /// Check the engine is configured and can reach its backend
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Actions the engine would take to reach the manifest's desired state
    async fn preview(&self, manifest: &DeploymentManifest) -> Result<Plan>;

    /// Drive the deployment towards the manifest
    ///
    /// Provider rejections are reported per action in the result, verbatim.
    /// The manifest must be rendered with [`SecretPolicy::Envelope`] for the
    /// engine to see secret values.
    async fn apply(&self, manifest: &DeploymentManifest, plan: &Plan) -> Result<ApplyResult>;

    /// Tear down everything the manifest declares
    async fn destroy(&self, manifest: &DeploymentManifest) -> Result<ApplyResult>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub account_info: Option<String>,
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Engine that hands the manifest off through the [`ManifestStore`]
///
/// It performs no diffing: every declared resource is planned as a create
/// and "applying" means publishing the manifest for the external engine.
pub struct ManifestEngine {
    store: ManifestStore,
}

impl ManifestEngine {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            store: ManifestStore::new(project_root),
        }
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }
}

#[async_trait]
impl ProvisioningEngine for ManifestEngine {
    fn name(&self) -> &str {
        "manifest"
    }

    fn display_name(&self) -> &str {
        "Manifest handoff"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        Ok(AuthStatus::ok("local manifest store"))
    }

    async fn preview(&self, manifest: &DeploymentManifest) -> Result<Plan> {
        Ok(Plan::create_all(manifest))
    }

    #[instrument(skip_all, fields(stack = %manifest.stack))]
    async fn apply(&self, manifest: &DeploymentManifest, plan: &Plan) -> Result<ApplyResult> {
        let started = Instant::now();
        if manifest.secrets == SecretPolicy::Redact {
            warn!("Handing off a redacted manifest; secret values will not reach the engine");
        }
        let lock = self.store.acquire_lock(&manifest.stack).await?;

        let mut result = ApplyResult::new();
        match self.store.save(manifest).await {
            Ok(path) => {
                for action in &plan.actions {
                    result.add_success(
                        action.id.clone(),
                        format!("handed off in {}", path.display()),
                    );
                }
            }
            Err(e) => {
                for action in &plan.actions {
                    let rejection = CloudError::ProviderRejection {
                        resource: action.resource_name.clone(),
                        message: e.to_string(),
                    };
                    result.add_failure(action.id.clone(), rejection.to_string());
                }
            }
        }

        lock.release().await?;
        result.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "Manifest handoff complete"
        );
        Ok(result)
    }

    #[instrument(skip_all, fields(stack = %manifest.stack))]
    async fn destroy(&self, manifest: &DeploymentManifest) -> Result<ApplyResult> {
        let started = Instant::now();
        let lock = self.store.acquire_lock(&manifest.stack).await?;
        let plan = Plan::delete_all(manifest);

        let removed = self.store.remove(&manifest.stack).await?;
        let mut result = ApplyResult::new();
        for action in &plan.actions {
            if removed {
                result.add_success(action.id.clone(), "withdrawn from handoff");
            } else {
                result.add_failure(
                    action.id.clone(),
                    CloudError::StoreError(format!(
                        "no manifest stored for stack '{}'",
                        manifest.stack
                    ))
                    .to_string(),
                );
            }
        }

        lock.release().await?;
        result.duration_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }
}
