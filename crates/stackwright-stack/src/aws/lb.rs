//! Application Load Balancer

use stackwright_cloud::{Attr, Output, OutputKey, ResourceDescriptor, ResourceGraph, ResourceKind};
use std::fmt;

const DNS_NAME: OutputKey<String> =
    OutputKey::new(ResourceKind::ApplicationLoadBalancer, "dnsName");
const ZONE_ID: OutputKey<String> = OutputKey::new(ResourceKind::ApplicationLoadBalancer, "zoneId");
const DEFAULT_TARGET_GROUP: OutputKey<String> =
    OutputKey::new(ResourceKind::ApplicationLoadBalancer, "defaultTargetGroup");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => f.write_str("HTTP"),
            Protocol::Https => f.write_str("HTTPS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectStatus {
    /// HTTP 301
    Permanent,
}

impl RedirectStatus {
    pub fn code(&self) -> &'static str {
        match self {
            RedirectStatus::Permanent => "HTTP_301",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListenerAction {
    Redirect {
        protocol: Protocol,
        port: u16,
        status: RedirectStatus,
    },
}

impl ListenerAction {
    fn to_attr(&self) -> Attr {
        match self {
            ListenerAction::Redirect {
                protocol,
                port,
                status,
            } => Attr::map([
                ("type", Attr::from("redirect")),
                (
                    "redirect",
                    Attr::map([
                        ("protocol", protocol.to_string()),
                        // プロバイダはリダイレクト先ポートを文字列で受け取る
                        ("port", port.to_string()),
                        ("statusCode", status.code().to_string()),
                    ]),
                ),
            ]),
        }
    }
}

/// ロードバランサーのリスナー1つ
#[derive(Debug, Clone, PartialEq)]
pub struct Listener {
    pub port: u16,
    pub protocol: Protocol,
    pub certificate_arn: Option<String>,
    pub default_actions: Vec<ListenerAction>,
}

impl Listener {
    /// 443番のHTTPSへ恒久リダイレクトする80番リスナー
    pub fn http_redirect_to_https() -> Self {
        Self {
            port: 80,
            protocol: Protocol::Http,
            certificate_arn: None,
            default_actions: vec![ListenerAction::Redirect {
                protocol: Protocol::Https,
                port: 443,
                status: RedirectStatus::Permanent,
            }],
        }
    }

    /// `certificate_arn` でTLSを終端する443番リスナー
    ///
    /// アクション未指定時はデフォルトターゲットグループへ転送する。
    pub fn https(certificate_arn: impl Into<String>) -> Self {
        Self {
            port: 443,
            protocol: Protocol::Https,
            certificate_arn: Some(certificate_arn.into()),
            default_actions: Vec::new(),
        }
    }

    fn to_attr(&self) -> Attr {
        let mut entries = vec![
            ("port".to_string(), Attr::from(self.port)),
            ("protocol".to_string(), Attr::from(self.protocol.to_string())),
        ];
        if let Some(arn) = &self.certificate_arn {
            entries.push(("certificateArn".to_string(), Attr::from(arn.clone())));
        }
        if !self.default_actions.is_empty() {
            entries.push((
                "defaultActions".to_string(),
                Attr::list(self.default_actions.iter().map(ListenerAction::to_attr)),
            ));
        }
        Attr::Map(entries)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationLoadBalancerArgs {
    pub listeners: Vec<Listener>,
}

impl ApplicationLoadBalancerArgs {
    /// 80番でHTTP→HTTPSリダイレクト、443番でTLS終端
    pub fn redirecting_to_https(certificate_arn: impl Into<String>) -> Self {
        Self {
            listeners: vec![
                Listener::http_redirect_to_https(),
                Listener::https(certificate_arn),
            ],
        }
    }

    pub fn declare(
        self,
        name: &str,
        graph: &mut ResourceGraph,
    ) -> stackwright_cloud::Result<ApplicationLoadBalancer> {
        let descriptor = ResourceDescriptor::new(name, ResourceKind::ApplicationLoadBalancer).with(
            "listeners",
            Attr::list(self.listeners.iter().map(Listener::to_attr)),
        );
        graph.add(descriptor)?;
        Ok(ApplicationLoadBalancer {
            name: name.to_string(),
            listeners: self.listeners,
        })
    }
}

/// 宣言済みロードバランサーのハンドル
#[derive(Debug, Clone)]
pub struct ApplicationLoadBalancer {
    name: String,
    listeners: Vec<Listener>,
}

impl ApplicationLoadBalancer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn dns_name(&self) -> Output<String> {
        DNS_NAME.on(&self.name)
    }

    pub fn zone_id(&self) -> Output<String> {
        ZONE_ID.on(&self.name)
    }

    pub fn default_target_group(&self) -> Output<String> {
        DEFAULT_TARGET_GROUP.on(&self.name)
    }
}
