//! ECSクラスターとFargateサービス

use crate::env::EnvironmentMap;
use stackwright_cloud::{Attr, Output, OutputKey, ResourceDescriptor, ResourceGraph, ResourceKind};

/// このスタックが実行する全タスクのCPUアーキテクチャ
pub const ARM64_CPU_ARCHITECTURE: &str = "ARM64";

const CLUSTER_ARN: OutputKey<String> = OutputKey::new(ResourceKind::EcsCluster, "arn");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterArgs;

impl ClusterArgs {
    pub fn declare(
        self,
        name: &str,
        graph: &mut ResourceGraph,
    ) -> stackwright_cloud::Result<Cluster> {
        graph.add(ResourceDescriptor::new(name, ResourceKind::EcsCluster))?;
        Ok(Cluster {
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Cluster {
    name: String,
}

impl Cluster {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arn(&self) -> Output<String> {
        CLUSTER_ARN.on(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortMapping {
    pub container_port: u16,
    /// このポートへのトラフィックを受けるターゲットグループ
    pub target_group: Output<String>,
}

impl PortMapping {
    fn to_attr(&self) -> Attr {
        Attr::map([
            ("containerPort", Attr::from(self.container_port)),
            ("targetGroup", Attr::from(self.target_group.clone())),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDefinition {
    pub name: String,
    pub image: Output<String>,
    /// CPUユニット
    pub cpu: u32,
    /// メモリ（MiB）
    pub memory: u32,
    pub port_mappings: Vec<PortMapping>,
    pub environment: EnvironmentMap,
}

impl ContainerDefinition {
    fn to_attr(&self) -> Attr {
        Attr::map([
            ("image", Attr::from(self.image.clone())),
            ("name", Attr::from(self.name.clone())),
            ("cpu", Attr::from(self.cpu)),
            ("memory", Attr::from(self.memory)),
            (
                "portMappings",
                Attr::list(self.port_mappings.iter().map(PortMapping::to_attr)),
            ),
            ("environment", self.environment.to_pairs()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FargateServiceArgs {
    pub cluster: Output<String>,
    pub desired_count: u32,
    pub assign_public_ip: bool,
    pub container: ContainerDefinition,
}

impl FargateServiceArgs {
    /// 常に [`ARM64_CPU_ARCHITECTURE`]
    pub fn cpu_architecture(&self) -> &'static str {
        ARM64_CPU_ARCHITECTURE
    }

    pub fn declare(
        self,
        name: &str,
        graph: &mut ResourceGraph,
    ) -> stackwright_cloud::Result<FargateService> {
        let task_definition = Attr::map([
            (
                "runtimePlatform",
                Attr::map([("cpuArchitecture", self.cpu_architecture())]),
            ),
            ("container", self.container.to_attr()),
        ]);
        graph.add(
            ResourceDescriptor::new(name, ResourceKind::FargateService)
                .with("assignPublicIp", self.assign_public_ip)
                .with("cluster", Attr::from(self.cluster.clone()))
                .with("desiredCount", self.desired_count)
                .with("taskDefinitionArgs", task_definition),
        )?;
        Ok(FargateService {
            name: name.to_string(),
            args: self,
        })
    }
}

/// 宣言済みサービスのハンドル
#[derive(Debug, Clone)]
pub struct FargateService {
    name: String,
    args: FargateServiceArgs,
}

impl FargateService {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &FargateServiceArgs {
        &self.args
    }

    pub fn container(&self) -> &ContainerDefinition {
        &self.args.container
    }
}
