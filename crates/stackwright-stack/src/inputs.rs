//! デプロイメントの設定入力

use crate::error::Result;
use stackwright_config::{Secret, StackConfig};
use tracing::{debug, instrument};

pub const KEY_ACM_CERTIFICATE_ARN: &str = "acmCertificateArn";
pub const KEY_ROUTE53_ZONE_ID: &str = "route53ZoneId";
pub const KEY_DOMAIN_NAME: &str = "domainName";
pub const KEY_DATABASE_URL: &str = "DATABASE_URL";

/// デプロイメントが読み込む設定値すべて
///
/// 一度にまとめて構築するため、キーの欠落はリソース宣言前に検出される。
#[derive(Debug, Clone)]
pub struct StackInputs {
    pub acm_certificate_arn: String,
    pub route53_zone_id: String,
    pub domain_name: String,
    pub database_url: Secret,
}

impl StackInputs {
    #[instrument(skip(config), fields(stack = %config.stack()))]
    pub fn from_config(config: &StackConfig) -> Result<Self> {
        let inputs = Self {
            acm_certificate_arn: config.require(KEY_ACM_CERTIFICATE_ARN)?,
            route53_zone_id: config.require(KEY_ROUTE53_ZONE_ID)?,
            domain_name: config.require(KEY_DOMAIN_NAME)?,
            database_url: config.require_secret(KEY_DATABASE_URL)?,
        };
        debug!(domain = %inputs.domain_name, "Read stack inputs");
        Ok(inputs)
    }
}
