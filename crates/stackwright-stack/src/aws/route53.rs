//! Route53 レコード

use stackwright_cloud::{Attr, Output, ResourceDescriptor, ResourceGraph, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
        }
    }
}

/// エイリアス先（別リソースのDNS名とホストゾーン）
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub name: Output<String>,
    pub zone_id: Output<String>,
    pub evaluate_target_health: bool,
}

impl Alias {
    fn to_attr(&self) -> Attr {
        Attr::map([
            ("name", Attr::from(self.name.clone())),
            ("zoneId", Attr::from(self.zone_id.clone())),
            ("evaluateTargetHealth", Attr::from(self.evaluate_target_health)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordArgs {
    pub name: String,
    pub zone_id: String,
    pub record_type: RecordType,
    pub aliases: Vec<Alias>,
}

impl RecordArgs {
    /// ロードバランサーを指す `name` のAエイリアスレコード（ヘルスチェック評価あり）
    pub fn alias_a(
        name: impl Into<String>,
        zone_id: impl Into<String>,
        target_dns_name: Output<String>,
        target_zone_id: Output<String>,
    ) -> Self {
        Self {
            name: name.into(),
            zone_id: zone_id.into(),
            record_type: RecordType::A,
            aliases: vec![Alias {
                name: target_dns_name,
                zone_id: target_zone_id,
                evaluate_target_health: true,
            }],
        }
    }

    pub fn declare(
        self,
        resource_name: &str,
        graph: &mut ResourceGraph,
    ) -> stackwright_cloud::Result<Record> {
        let descriptor = ResourceDescriptor::new(resource_name, ResourceKind::Route53Record)
            .with("name", self.name.clone())
            .with("zoneId", self.zone_id.clone())
            .with("type", self.record_type.as_str())
            .with("aliases", Attr::list(self.aliases.iter().map(Alias::to_attr)));
        graph.add(descriptor)?;
        Ok(Record {
            resource_name: resource_name.to_string(),
            args: self,
        })
    }
}

/// 宣言済みレコードのハンドル
#[derive(Debug, Clone)]
pub struct Record {
    resource_name: String,
    args: RecordArgs,
}

impl Record {
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.args.aliases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stackwright_cloud::ResourceId;

    #[test]
    fn test_alias_record_rendering() {
        let mut graph = ResourceGraph::new();
        graph
            .add(ResourceDescriptor::new("app-lb", ResourceKind::ApplicationLoadBalancer))
            .unwrap();
        let lb = ResourceId::new(ResourceKind::ApplicationLoadBalancer, "app-lb");
        let record = RecordArgs::alias_a(
            "app.example.com",
            "Z123",
            Output::pending(lb.clone(), "dnsName"),
            Output::pending(lb.clone(), "zoneId"),
        )
        .declare("app.example.com", &mut graph)
        .unwrap();

        assert_eq!(record.aliases().len(), 1);
        let descriptor = graph
            .get(ResourceKind::Route53Record, "app.example.com")
            .unwrap();
        assert_eq!(descriptor.dependencies(), vec![&lb]);
        assert_eq!(
            descriptor.properties(),
            json!({
                "name": "app.example.com",
                "zoneId": "Z123",
                "type": "A",
                "aliases": [{
                    "name": { "$ref": "awsx:lb:ApplicationLoadBalancer::app-lb.dnsName" },
                    "zoneId": { "$ref": "awsx:lb:ApplicationLoadBalancer::app-lb.zoneId" },
                    "evaluateTargetHealth": true
                }]
            })
        );
        assert!(graph.validate().is_ok());
    }
}
