//! スタックが宣言するAWSリソースの型付き引数
//!
//! 各 `*Args` 型は [`ResourceGraph`] に [`ResourceDescriptor`] を1つ宣言し、
//! そのリソースの出力を参照できるハンドルを返す。
//!
//! [`ResourceDescriptor`]: stackwright_cloud::ResourceDescriptor
//! [`ResourceGraph`]: stackwright_cloud::ResourceGraph

pub mod ecr;
pub mod ecs;
pub mod lb;
pub mod route53;

pub use ecr::{ARM64_PLATFORM, Image, ImageArgs, Repository, RepositoryArgs};
pub use ecs::{
    ARM64_CPU_ARCHITECTURE, Cluster, ClusterArgs, ContainerDefinition, FargateService,
    FargateServiceArgs, PortMapping,
};
pub use lb::{
    ApplicationLoadBalancer, ApplicationLoadBalancerArgs, Listener, ListenerAction, Protocol,
    RedirectStatus,
};
pub use route53::{Alias, Record, RecordArgs, RecordType};
