//! Rendered deployment manifest
//!
//! The document handed to the provisioning engine: every declared resource
//! in declaration order with its URN, type token, dependencies and
//! properties, plus the stack outputs.
//!
//! Manifests shown to people are rendered with [`SecretPolicy::Redact`].
//! Only the manifest published for the engine carries `{"$secret": ...}`
//! envelopes, and the store writes it owner-readable only.

use crate::error::Result;
use crate::graph::ResourceGraph;
use crate::resource::{Attr, SecretPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentManifest {
    pub version: u32,
    pub project: String,
    pub stack: String,
    pub generated_at: DateTime<Utc>,
    /// How secret values appear in this document
    #[serde(default)]
    pub secrets: SecretPolicy,
    pub resources: Vec<ManifestResource>,
    /// Stack outputs, in declaration order
    pub outputs: Vec<ManifestOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestResource {
    pub urn: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_token: String,
    /// URNs of upstream resources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    pub properties: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestOutput {
    pub name: String,
    pub value: serde_json::Value,
}

/// Supported manifest encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    #[default]
    Json,
    Yaml,
}

impl std::str::FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ManifestFormat::Json),
            "yaml" | "yml" => Ok(ManifestFormat::Yaml),
            other => Err(format!("unknown manifest format: {}", other)),
        }
    }
}

impl DeploymentManifest {
    /// Validate the graph and render it with the given stack outputs
    #[instrument(skip(graph, outputs), fields(resources = graph.len()))]
    pub fn render(
        project: &str,
        stack: &str,
        graph: &ResourceGraph,
        outputs: &[(String, Attr)],
        secrets: SecretPolicy,
    ) -> Result<Self> {
        graph.validate()?;

        let resources: Vec<ManifestResource> = graph
            .iter()
            .map(|resource| ManifestResource {
                urn: resource.id().urn(),
                name: resource.name().to_string(),
                type_token: resource.kind().type_token().to_string(),
                depends_on: resource.dependencies().iter().map(|id| id.urn()).collect(),
                properties: resource.properties_with(secrets),
            })
            .collect();

        let outputs: Vec<ManifestOutput> = outputs
            .iter()
            .map(|(name, value)| ManifestOutput {
                name: name.clone(),
                value: value.to_value(secrets),
            })
            .collect();

        debug!(
            resources = resources.len(),
            outputs = outputs.len(),
            "Rendered manifest"
        );

        Ok(Self {
            version: MANIFEST_VERSION,
            project: project.to_string(),
            stack: stack.to_string(),
            generated_at: Utc::now(),
            secrets,
            resources,
            outputs,
        })
    }

    /// First resource declared under `name`
    pub fn resource(&self, name: &str) -> Option<&ManifestResource> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn resource_by_urn(&self, urn: &str) -> Option<&ManifestResource> {
        self.resources.iter().find(|r| r.urn == urn)
    }

    pub fn output(&self, name: &str) -> Option<&serde_json::Value> {
        self.outputs.iter().find(|o| o.name == name).map(|o| &o.value)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn encode(&self, format: ManifestFormat) -> Result<String> {
        match format {
            ManifestFormat::Json => self.to_json(),
            ManifestFormat::Yaml => self.to_yaml(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloudError;
    use crate::output::OutputRef;
    use crate::resource::{ResourceDescriptor, ResourceId, ResourceKind};
    use serde_json::json;
    use stackwright_config::Secret;

    fn sample_graph() -> ResourceGraph {
        let mut graph = ResourceGraph::new();
        let repo = ResourceDescriptor::new("app-repo", ResourceKind::EcrRepository)
            .with("forceDelete", true);
        let image = ResourceDescriptor::new("app-img", ResourceKind::EcrImage)
            .with("repositoryUrl", repo.output::<String>("url"))
            .with("buildArgs", Attr::map([("DATABASE_URL", Secret::new("hunter2"))]));
        graph.add(repo).unwrap();
        graph.add(image).unwrap();
        graph
    }

    fn render(secrets: SecretPolicy) -> DeploymentManifest {
        let outputs = vec![("url".to_string(), Attr::from("https://app.example.com"))];
        DeploymentManifest::render("webapp", "dev", &sample_graph(), &outputs, secrets).unwrap()
    }

    #[test]
    fn test_render_keeps_order_and_dependencies() {
        let manifest = render(SecretPolicy::Redact);

        let names: Vec<_> = manifest.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["app-repo", "app-img"]);

        let image = manifest.resource("app-img").unwrap();
        assert_eq!(image.urn, "awsx:ecr:Image::app-img");
        assert_eq!(image.type_token, "awsx:ecr:Image");
        assert_eq!(image.depends_on, vec!["awsx:ecr:Repository::app-repo"]);
        assert!(manifest.resource_by_urn(&image.depends_on[0]).is_some());
        assert_eq!(manifest.output("url"), Some(&json!("https://app.example.com")));
    }

    #[test]
    fn test_render_redacts_secrets() {
        let manifest = render(SecretPolicy::Redact);
        let json = manifest.to_json().unwrap();
        let yaml = manifest.to_yaml().unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!yaml.contains("hunter2"));
        assert!(json.contains("[secret]"));
    }

    #[test]
    fn test_render_envelope_carries_secrets() {
        let manifest = render(SecretPolicy::Envelope);
        assert_eq!(manifest.secrets, SecretPolicy::Envelope);

        let image = manifest.resource("app-img").unwrap();
        assert_eq!(
            image.properties["buildArgs"]["DATABASE_URL"],
            json!({ "$secret": "hunter2" })
        );

        let parsed: DeploymentManifest =
            serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(parsed.secrets, SecretPolicy::Envelope);
        assert_eq!(parsed.resources, manifest.resources);
    }

    #[test]
    fn test_render_rejects_invalid_graph() {
        let repo = ResourceId::new(ResourceKind::EcrRepository, "app-repo");
        let mut graph = ResourceGraph::new();
        graph
            .add(
                ResourceDescriptor::new("app-img", ResourceKind::EcrImage)
                    .with("repositoryUrl", OutputRef::new(repo, "url")),
            )
            .unwrap();
        let err = DeploymentManifest::render("webapp", "dev", &graph, &[], SecretPolicy::Redact)
            .unwrap_err();
        assert!(matches!(err, CloudError::DanglingReference { .. }));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<ManifestFormat>(), Ok(ManifestFormat::Json));
        assert_eq!("yml".parse::<ManifestFormat>(), Ok(ManifestFormat::Yaml));
        assert!("toml".parse::<ManifestFormat>().is_err());
    }
}
