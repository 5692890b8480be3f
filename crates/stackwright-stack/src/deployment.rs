//! デプロイメント記述の組み立て
//!
//! 依存順に以下を宣言する:
//! 1. ECSクラスター
//! 2. Application Load Balancer（80 → 443 リダイレクト、443 でTLS終端）
//! 3. ドメインの Route53 `A` エイリアスレコード
//! 4. ECRリポジトリ
//! 5. `linux/arm64` 向けにビルドするECRイメージ
//! 6. ロードバランサー配下でイメージを実行するFargateサービス
//!
//! 出力は `url = https://<domainName>`。

use crate::aws::{
    ApplicationLoadBalancer, ApplicationLoadBalancerArgs, Cluster, ClusterArgs,
    ContainerDefinition, FargateService, FargateServiceArgs, Image, ImageArgs, PortMapping, Record,
    RecordArgs, Repository, RepositoryArgs,
};
use crate::env::EnvironmentMap;
use crate::error::Result;
use crate::inputs::StackInputs;
use crate::settings::AppSettings;
use stackwright_cloud::{Attr, DeploymentManifest, Output, ResourceGraph, SecretPolicy};
use stackwright_config::StackConfig;
use tracing::{info, instrument};

/// スタックファイルでプロジェクト名が未設定の場合の既定値
pub const DEFAULT_PROJECT: &str = "app";

/// エンドポイントURLの出力名
pub const URL_OUTPUT: &str = "url";

/// 組み立て済みのデプロイメント（宣言済みリソースとスタック出力）
#[derive(Debug, Clone)]
pub struct Deployment {
    project: String,
    stack: String,
    graph: ResourceGraph,
    cluster: Cluster,
    load_balancer: ApplicationLoadBalancer,
    record: Record,
    repository: Repository,
    image: Image,
    service: FargateService,
    url: Output<String>,
}

impl Deployment {
    /// `config` から入力を読み込んで組み立てる
    ///
    /// 必須の設定キーが欠けている場合、リソースを宣言する前にここで失敗する。
    #[instrument(skip_all, fields(stack = %config.stack()))]
    pub fn from_config(config: &StackConfig, settings: &AppSettings) -> Result<Self> {
        let inputs = StackInputs::from_config(config)?;
        let project = config.project().unwrap_or(DEFAULT_PROJECT);
        Self::assemble(project, config.stack(), &inputs, settings)
    }

    /// 読み込み済みの入力から全リソースを宣言する
    #[instrument(skip(inputs, settings))]
    pub fn assemble(
        project: &str,
        stack: &str,
        inputs: &StackInputs,
        settings: &AppSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let mut graph = ResourceGraph::new();

        let cluster = ClusterArgs.declare(&settings.cluster_name, &mut graph)?;

        let load_balancer =
            ApplicationLoadBalancerArgs::redirecting_to_https(&inputs.acm_certificate_arn)
                .declare(&settings.load_balancer_name, &mut graph)?;

        let record = RecordArgs::alias_a(
            &inputs.domain_name,
            &inputs.route53_zone_id,
            load_balancer.dns_name(),
            load_balancer.zone_id(),
        )
        .declare(&inputs.domain_name, &mut graph)?;

        let repository = RepositoryArgs { force_delete: true }
            .declare(&settings.repository_name, &mut graph)?;

        let image = ImageArgs::new(repository.url(), &settings.context)
            .declare(&settings.image_name, &mut graph)?;

        let environment =
            EnvironmentMap::standard(settings.container_port, inputs.database_url.clone());

        let service = FargateServiceArgs {
            cluster: cluster.arn(),
            desired_count: settings.desired_count,
            assign_public_ip: settings.assign_public_ip,
            container: ContainerDefinition {
                name: settings.container_name.clone(),
                image: image.image_uri(),
                cpu: settings.cpu,
                memory: settings.memory,
                port_mappings: vec![PortMapping {
                    container_port: settings.container_port,
                    target_group: load_balancer.default_target_group(),
                }],
                environment,
            },
        }
        .declare(&settings.service_name, &mut graph)?;

        graph.validate()?;

        let url = Output::known(format!("https://{}", inputs.domain_name));

        info!(resources = graph.len(), "Deployment assembled");

        Ok(Self {
            project: project.to_string(),
            stack: stack.to_string(),
            graph,
            cluster,
            load_balancer,
            record,
            repository,
            image,
            service,
            url,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    pub fn load_balancer(&self) -> &ApplicationLoadBalancer {
        &self.load_balancer
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn service(&self) -> &FargateService {
        &self.service
    }

    /// 公開エンドポイントURL
    pub fn url(&self) -> &Output<String> {
        &self.url
    }

    /// 出力順に並べたスタック出力
    pub fn outputs(&self) -> Vec<(String, Attr)> {
        vec![(URL_OUTPUT.to_string(), Attr::from(self.url.clone()))]
    }

    /// 表示用のマニフェストを生成する（シークレットは伏せ字）
    pub fn render(&self) -> Result<DeploymentManifest> {
        self.render_with(SecretPolicy::Redact)
    }

    /// プロビジョニングエンジンへ引き渡すマニフェストを生成する
    ///
    /// シークレットは `{"$secret": ...}` として値を保持する。
    /// 標準出力やログには出さないこと。
    pub fn render_for_engine(&self) -> Result<DeploymentManifest> {
        self.render_with(SecretPolicy::Envelope)
    }

    fn render_with(&self, secrets: SecretPolicy) -> Result<DeploymentManifest> {
        Ok(DeploymentManifest::render(
            &self.project,
            &self.stack,
            &self.graph,
            &self.outputs(),
            secrets,
        )?)
    }
}
