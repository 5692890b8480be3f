//! Plan and apply result types exchanged with the provisioning engine

use crate::manifest::{DeploymentManifest, ManifestResource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A planned change to one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    pub action_type: ActionType,

    /// Provider type token (e.g. "aws:ecs/cluster:Cluster")
    pub resource_type: String,

    /// Declared resource name
    pub resource_name: String,

    pub description: String,

    /// Extra engine-specific details
    pub details: HashMap<String, serde_json::Value>,
}

impl Action {
    /// A create action for a manifest resource
    pub fn create(resource: &ManifestResource) -> Self {
        let mut details = HashMap::new();
        if !resource.depends_on.is_empty() {
            details.insert(
                "depends_on".to_string(),
                serde_json::json!(resource.depends_on),
            );
        }
        Self {
            id: format!("create:{}", resource.urn),
            action_type: ActionType::Create,
            resource_type: resource.type_token.clone(),
            resource_name: resource.name.clone(),
            description: format!("create {} ({})", resource.name, resource.type_token),
            details,
        }
    }

    /// A delete action for a manifest resource
    pub fn delete(resource: &ManifestResource) -> Self {
        Self {
            id: format!("delete:{}", resource.urn),
            action_type: ActionType::Delete,
            resource_type: resource.type_token.clone(),
            resource_name: resource.name.clone(),
            description: format!("delete {} ({})", resource.name, resource.type_token),
            details: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Outcome of applying a plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyResult {
    pub succeeded: Vec<ActionResult>,
    pub failed: Vec<ActionResult>,
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, action_id: impl Into<String>, message: impl Into<String>) {
        self.succeeded.push(ActionResult {
            action_id: action_id.into(),
            success: true,
            message: message.into(),
            error: None,
        });
    }

    /// Record a failure exactly as the engine or provider reported it
    pub fn add_failure(&mut self, action_id: impl Into<String>, error: impl Into<String>) {
        self.failed.push(ActionResult {
            action_id: action_id.into(),
            success: false,
            message: String::new(),
            error: Some(error.into()),
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_id: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

/// Actions the engine intends to perform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
            has_changes: false,
        }
    }

    /// Create every manifest resource, in declaration order
    pub fn create_all(manifest: &DeploymentManifest) -> Self {
        Self::new(manifest.resources.iter().map(Action::create).collect())
    }

    /// Delete every manifest resource, dependents first
    pub fn delete_all(manifest: &DeploymentManifest) -> Self {
        Self::new(manifest.resources.iter().rev().map(Action::delete).collect())
    }

    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}
