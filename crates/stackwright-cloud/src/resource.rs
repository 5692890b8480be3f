//! Resource descriptors
//!
//! A [`ResourceDescriptor`] is plain data: a name, a kind and an ordered map
//! of attributes. Attributes are literal values or references to another
//! descriptor's outputs. The provisioning engine reads descriptors; nothing
//! here talks to a provider.

use crate::output::{Output, OutputRef};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};
use stackwright_config::{REDACTED, Secret};
use std::fmt;

/// Kinds of resources a deployment can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    EcsCluster,
    ApplicationLoadBalancer,
    Route53Record,
    EcrRepository,
    EcrImage,
    FargateService,
}

impl ResourceKind {
    /// Provider type token understood by the engine
    pub fn type_token(&self) -> &'static str {
        match self {
            ResourceKind::EcsCluster => "aws:ecs/cluster:Cluster",
            ResourceKind::ApplicationLoadBalancer => "awsx:lb:ApplicationLoadBalancer",
            ResourceKind::Route53Record => "aws:route53/record:Record",
            ResourceKind::EcrRepository => "awsx:ecr:Repository",
            ResourceKind::EcrImage => "awsx:ecr:Image",
            ResourceKind::FargateService => "awsx:ecs:FargateService",
        }
    }

    /// Output attributes the engine reports once the resource exists
    pub fn outputs(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::EcsCluster => &["arn", "name"],
            ResourceKind::ApplicationLoadBalancer => {
                &["arn", "dnsName", "zoneId", "defaultTargetGroup"]
            }
            ResourceKind::Route53Record => &["fqdn"],
            ResourceKind::EcrRepository => &["arn", "url"],
            ResourceKind::EcrImage => &["imageUri"],
            ResourceKind::FargateService => &["serviceArn", "taskDefinitionArn"],
        }
    }

    pub fn has_output(&self, attribute: &str) -> bool {
        self.outputs().contains(&attribute)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::EcsCluster => "ecs-cluster",
            ResourceKind::ApplicationLoadBalancer => "load-balancer",
            ResourceKind::Route53Record => "dns-record",
            ResourceKind::EcrRepository => "ecr-repository",
            ResourceKind::EcrImage => "ecr-image",
            ResourceKind::FargateService => "fargate-service",
        };
        f.write_str(label)
    }
}

impl Serialize for ResourceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.type_token())
    }
}

/// Identity of a declared resource
///
/// Names are unique per kind, so a DNS record may share its name with the
/// load balancer it points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub name: String,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// `<type token>::<name>`
    pub fn urn(&self) -> String {
        format!("{}::{}", self.kind.type_token(), self.name)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.urn())
    }
}

/// How secret attribute values are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretPolicy {
    /// `"[secret]"`; for anything shown to people
    #[default]
    Redact,
    /// `{"$secret": "<value>"}`; only for the manifest handed to the engine
    Envelope,
}

/// Attribute value on a descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Str(String),
    Int(i64),
    Bool(bool),
    Secret(Secret),
    List(Vec<Attr>),
    /// Ordered map; insertion order is kept in rendered manifests
    Map(Vec<(String, Attr)>),
    /// Another descriptor's output, resolved by the engine
    Ref(OutputRef),
    /// String concatenation of literal and referenced parts
    Concat(Vec<Attr>),
}

impl Attr {
    /// Build an ordered map attribute
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Attr>,
        I: IntoIterator<Item = (K, V)>,
    {
        Attr::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn list<V: Into<Attr>, I: IntoIterator<Item = V>>(items: I) -> Self {
        Attr::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attr::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Attr::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Collect every output reference in this attribute, depth first
    pub fn collect_refs<'a>(&'a self, out: &mut Vec<&'a OutputRef>) {
        match self {
            Attr::Ref(reference) => out.push(reference),
            Attr::List(items) | Attr::Concat(items) => {
                for item in items {
                    item.collect_refs(out);
                }
            }
            Attr::Map(entries) => {
                for (_, value) in entries {
                    value.collect_refs(out);
                }
            }
            Attr::Str(_) | Attr::Int(_) | Attr::Bool(_) | Attr::Secret(_) => {}
        }
    }

    /// Render as JSON, with secrets handled per `secrets`
    pub fn to_value(&self, secrets: SecretPolicy) -> Value {
        match self {
            Attr::Str(s) => Value::String(s.clone()),
            Attr::Int(i) => Value::from(*i),
            Attr::Bool(b) => Value::Bool(*b),
            Attr::Secret(secret) => match secrets {
                SecretPolicy::Redact => Value::String(REDACTED.to_string()),
                SecretPolicy::Envelope => json!({ "$secret": secret.expose() }),
            },
            Attr::List(items) => {
                Value::Array(items.iter().map(|item| item.to_value(secrets)).collect())
            }
            Attr::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_value(secrets)))
                    .collect(),
            ),
            Attr::Ref(reference) => json!({ "$ref": reference.address() }),
            Attr::Concat(parts) => {
                let parts: Vec<Value> = parts.iter().map(|part| part.to_value(secrets)).collect();
                json!({ "$concat": parts })
            }
        }
    }
}

/// Serializes redacted
impl Serialize for Attr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value(SecretPolicy::Redact).serialize(serializer)
    }
}

impl From<&str> for Attr {
    fn from(value: &str) -> Self {
        Attr::Str(value.to_string())
    }
}

impl From<String> for Attr {
    fn from(value: String) -> Self {
        Attr::Str(value)
    }
}

impl From<i64> for Attr {
    fn from(value: i64) -> Self {
        Attr::Int(value)
    }
}

impl From<u32> for Attr {
    fn from(value: u32) -> Self {
        Attr::Int(i64::from(value))
    }
}

impl From<u16> for Attr {
    fn from(value: u16) -> Self {
        Attr::Int(i64::from(value))
    }
}

impl From<bool> for Attr {
    fn from(value: bool) -> Self {
        Attr::Bool(value)
    }
}

impl From<Secret> for Attr {
    fn from(value: Secret) -> Self {
        Attr::Secret(value)
    }
}

impl From<OutputRef> for Attr {
    fn from(value: OutputRef) -> Self {
        Attr::Ref(value)
    }
}

impl From<Vec<Attr>> for Attr {
    fn from(value: Vec<Attr>) -> Self {
        Attr::List(value)
    }
}

impl From<Output<String>> for Attr {
    fn from(output: Output<String>) -> Self {
        if let Some(reference) = output.reference() {
            return Attr::Ref(reference.clone());
        }
        let value = output.value().cloned().unwrap_or_default();
        if output.is_secret() {
            Attr::Secret(Secret::new(value))
        } else {
            Attr::Str(value)
        }
    }
}

/// A declared resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    id: ResourceId,
    attributes: Vec<(String, Attr)>,
    depends_on: Vec<ResourceId>,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: ResourceId::new(kind, name),
            attributes: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Attr>) -> Self {
        self.set(key, value);
        self
    }

    /// Add an ordering dependency not expressed through an output reference
    pub fn with_dependency(mut self, resource: ResourceId) -> Self {
        self.depends_on.push(resource);
        self
    }

    /// Set an attribute, replacing an earlier value with the same key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Attr>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.id.kind
    }

    pub fn attr(&self, key: &str) -> Option<&Attr> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn attributes(&self) -> &[(String, Attr)] {
        &self.attributes
    }

    /// Every output reference held by this descriptor's attributes
    pub fn references(&self) -> Vec<&OutputRef> {
        let mut refs = Vec::new();
        for (_, value) in &self.attributes {
            value.collect_refs(&mut refs);
        }
        refs
    }

    /// Upstream resources, in first-mention order without duplicates
    pub fn dependencies(&self) -> Vec<&ResourceId> {
        let mut deps: Vec<&ResourceId> = Vec::new();
        let referenced = self.references().into_iter().map(|r| &r.resource);
        for id in self.depends_on.iter().chain(referenced) {
            if !deps.contains(&id) {
                deps.push(id);
            }
        }
        deps
    }

    /// Handle to one of this resource's outputs
    pub fn output<T>(&self, attribute: &str) -> Output<T> {
        Output::pending(self.id.clone(), attribute)
    }

    /// Attributes rendered as a JSON object, secrets redacted
    pub fn properties(&self) -> Value {
        self.properties_with(SecretPolicy::Redact)
    }

    pub fn properties_with(&self, secrets: SecretPolicy) -> Value {
        Value::Object(
            self.attributes
                .iter()
                .map(|(key, value)| (key.clone(), value.to_value(secrets)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_keep_insertion_order() {
        let desc = ResourceDescriptor::new("app-repo", ResourceKind::EcrRepository)
            .with("forceDelete", true)
            .with("imageTagMutability", "MUTABLE");
        let keys: Vec<_> = desc.attributes().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["forceDelete", "imageTagMutability"]);

        let rendered = serde_json::to_string(&desc.properties()).unwrap();
        assert_eq!(
            rendered,
            r#"{"forceDelete":true,"imageTagMutability":"MUTABLE"}"#
        );
    }

    #[test]
    fn test_set_replaces_existing_key() {
        let mut desc = ResourceDescriptor::new("app-cluster", ResourceKind::EcsCluster);
        desc.set("name", "first");
        desc.set("name", "second");
        assert_eq!(desc.attributes().len(), 1);
        assert_eq!(desc.attr("name").and_then(Attr::as_str), Some("second"));
    }

    #[test]
    fn test_dependencies_from_nested_references() {
        let lb = ResourceDescriptor::new("app-lb", ResourceKind::ApplicationLoadBalancer);
        let record = ResourceDescriptor::new("app.example.com", ResourceKind::Route53Record)
            .with(
                "aliases",
                Attr::list([Attr::map([
                    ("name", Attr::from(lb.output::<String>("dnsName"))),
                    ("zoneId", Attr::from(lb.output::<String>("zoneId"))),
                ])]),
            )
            .with_dependency(ResourceId::new(ResourceKind::EcsCluster, "app-cluster"));

        let deps: Vec<_> = record.dependencies().iter().map(|id| id.name.as_str()).collect();
        assert_eq!(deps, vec!["app-cluster", "app-lb"]);
        assert_eq!(record.references().len(), 2);
    }

    fn service() -> ResourceDescriptor {
        let image = ResourceId::new(ResourceKind::EcrImage, "app-img");
        let lb = ResourceId::new(ResourceKind::ApplicationLoadBalancer, "app-lb");
        ResourceDescriptor::new("app-service", ResourceKind::FargateService)
            .with("image", OutputRef::new(image, "imageUri"))
            .with("databaseUrl", Secret::new("postgres://app:hunter2@db/app"))
            .with(
                "url",
                Attr::Concat(vec!["https://".into(), OutputRef::new(lb, "dnsName").into()]),
            )
    }

    #[test]
    fn test_reference_and_secret_rendering() {
        let properties = service().properties();
        assert_eq!(
            properties["image"],
            json!({ "$ref": "awsx:ecr:Image::app-img.imageUri" })
        );
        assert_eq!(properties["databaseUrl"], json!("[secret]"));
        assert_eq!(
            properties["url"],
            json!({
                "$concat": [
                    "https://",
                    { "$ref": "awsx:lb:ApplicationLoadBalancer::app-lb.dnsName" }
                ]
            })
        );
        assert!(!serde_json::to_string(&service().attributes()[1].1).unwrap().contains("hunter2"));
    }

    #[test]
    fn test_secret_envelope() {
        let properties = service().properties_with(SecretPolicy::Envelope);
        assert_eq!(
            properties["databaseUrl"],
            json!({ "$secret": "postgres://app:hunter2@db/app" })
        );
        assert_eq!(
            properties["image"],
            json!({ "$ref": "awsx:ecr:Image::app-img.imageUri" })
        );
    }

    #[test]
    fn test_resource_id_urn() {
        let id = ResourceId::new(ResourceKind::Route53Record, "app.example.com");
        assert_eq!(id.urn(), "aws:route53/record:Record::app.example.com");
        assert_ne!(id, ResourceId::new(ResourceKind::EcrImage, "app.example.com"));
    }

    #[test]
    fn test_kind_outputs() {
        assert!(ResourceKind::ApplicationLoadBalancer.has_output("defaultTargetGroup"));
        assert!(ResourceKind::EcrImage.has_output("imageUri"));
        assert!(!ResourceKind::EcsCluster.has_output("dnsName"));
        assert_eq!(
            ResourceKind::FargateService.type_token(),
            "awsx:ecs:FargateService"
        );
    }
}
