use serde_json::json;
use stackwright_cloud::{Attr, OutputRef, ResolvedOutputs, ResourceId, ResourceKind, SecretPolicy};
use stackwright_config::StackConfig;
use stackwright_stack::aws::{ARM64_PLATFORM, Protocol, RedirectStatus};
use stackwright_stack::{AppSettings, Deployment, EnvValue, StackError};

const CERT_ARN: &str = "arn:aws:acm:us-east-1:123456789012:certificate/abc";

fn config() -> StackConfig {
    let mut config = StackConfig::new("prod").with_project("webapp");
    config
        .set("acmCertificateArn", CERT_ARN)
        .set("route53ZoneId", "Z123456")
        .set("webapp:domainName", "app.example.com")
        .set_secret("DATABASE_URL", "postgres://app:hunter2@db/app");
    config
}

fn deployment() -> Deployment {
    Deployment::from_config(&config(), &AppSettings::default()).unwrap()
}

/// Dropping any required key fails with MissingConfiguration
#[test]
fn test_missing_configuration_fails_before_assembly() {
    for key in [
        "acmCertificateArn",
        "route53ZoneId",
        "webapp:domainName",
        "DATABASE_URL",
    ] {
        let full = config();
        let mut partial = StackConfig::new("prod").with_project("webapp");
        for other in [
            "acmCertificateArn",
            "route53ZoneId",
            "webapp:domainName",
            "DATABASE_URL",
        ] {
            if other != key {
                let value = full.get(other.trim_start_matches("webapp:")).unwrap();
                partial.set(other, value);
            }
        }

        let err = Deployment::from_config(&partial, &AppSettings::default()).unwrap_err();
        assert!(err.is_missing_configuration(), "{}: {}", key, err);
        assert!(matches!(err, StackError::Config(_)));
    }
}

/// Exactly two listeners: 80 redirect and 443 TLS
#[test]
fn test_load_balancer_listeners() {
    let deployment = deployment();
    let listeners = deployment.load_balancer().listeners();
    assert_eq!(listeners.len(), 2);

    let http = &listeners[0];
    assert_eq!(http.port, 80);
    assert_eq!(http.protocol, Protocol::Http);
    assert_eq!(http.certificate_arn, None);
    assert_eq!(
        http.default_actions,
        vec![stackwright_stack::aws::ListenerAction::Redirect {
            protocol: Protocol::Https,
            port: 443,
            status: RedirectStatus::Permanent,
        }]
    );

    let https = &listeners[1];
    assert_eq!(https.port, 443);
    assert_eq!(https.protocol, Protocol::Https);
    assert_eq!(https.certificate_arn.as_deref(), Some(CERT_ARN));

    let properties = deployment
        .graph()
        .get(ResourceKind::ApplicationLoadBalancer, "app-lb")
        .unwrap()
        .properties();
    assert_eq!(properties["listeners"].as_array().unwrap().len(), 2);
    assert_eq!(
        properties["listeners"][0]["defaultActions"][0]["redirect"]["statusCode"],
        json!("HTTP_301")
    );
}

/// DNS alias targets the load balancer's own DNS name and zone
#[test]
fn test_dns_alias_targets_load_balancer() {
    let deployment = deployment();
    let aliases = deployment.record().aliases();
    assert_eq!(aliases.len(), 1);

    let alias = &aliases[0];
    assert_eq!(alias.name, deployment.load_balancer().dns_name());
    assert_eq!(alias.zone_id, deployment.load_balancer().zone_id());
    assert!(alias.evaluate_target_health);

    let record = deployment
        .graph()
        .get(ResourceKind::Route53Record, "app.example.com")
        .unwrap();
    assert_eq!(record.attr("type").and_then(Attr::as_str), Some("A"));
    assert_eq!(record.attr("zoneId").and_then(Attr::as_str), Some("Z123456"));
    let lb = ResourceId::new(ResourceKind::ApplicationLoadBalancer, "app-lb");
    assert_eq!(
        record.references(),
        vec![
            &OutputRef::new(lb.clone(), "dnsName"),
            &OutputRef::new(lb, "zoneId")
        ]
    );
}

/// Image platform stays linux/arm64 regardless of settings
#[test]
fn test_image_platform_is_arm64() {
    for context in ["./app", "/srv/build", "../other"] {
        let settings = AppSettings::default().with_context(context);
        let deployment = Deployment::from_config(&config(), &settings).unwrap();
        assert_eq!(deployment.image().platform(), ARM64_PLATFORM);

        let image = deployment
            .graph()
            .get(ResourceKind::EcrImage, "app-img")
            .unwrap();
        assert_eq!(image.attr("platform").and_then(Attr::as_str), Some("linux/arm64"));
        assert_eq!(image.attr("context").and_then(Attr::as_str), Some(context));
    }
}

/// Environment is PORT, NODE_ENV, DATABASE_URL in order
#[test]
fn test_service_environment() {
    let deployment = deployment();
    let env = &deployment.service().container().environment;
    let pairs: Vec<_> = env.iter().map(|(n, v)| (n, v.expose())).collect();
    assert_eq!(
        pairs,
        vec![
            ("PORT", "80"),
            ("NODE_ENV", "production"),
            ("DATABASE_URL", "postgres://app:hunter2@db/app"),
        ]
    );
    assert!(env.get("DATABASE_URL").is_some_and(EnvValue::is_secret));
}

#[test]
fn test_service_shape() {
    let deployment = deployment();
    let container = deployment.service().container();
    assert_eq!(container.name, "app-container");
    assert_eq!(container.cpu, 128);
    assert_eq!(container.memory, 1024);
    assert_eq!(container.image, deployment.image().image_uri());
    assert_eq!(container.port_mappings.len(), 1);
    assert_eq!(container.port_mappings[0].container_port, 80);
    assert_eq!(
        container.port_mappings[0].target_group,
        deployment.load_balancer().default_target_group()
    );

    let args = deployment.service().args();
    assert_eq!(args.desired_count, 1);
    assert!(args.assign_public_ip);
    assert_eq!(args.cpu_architecture(), "ARM64");
    assert_eq!(args.cluster, deployment.cluster().arn());
}

/// url output is https:// + domain
#[test]
fn test_url_output() {
    for domain in ["app.example.com", "example.org", "a.b.c.example.net"] {
        let mut config = config();
        config.set("webapp:domainName", domain);
        let deployment = Deployment::from_config(&config, &AppSettings::default()).unwrap();

        let url = deployment.url();
        assert!(url.is_known());
        assert_eq!(
            url.resolve(&ResolvedOutputs::new()).unwrap(),
            format!("https://{}", domain)
        );
    }
}

#[test]
fn test_rendered_manifest() {
    let manifest = deployment().render().unwrap();
    assert_eq!(manifest.project, "webapp");
    assert_eq!(manifest.stack, "prod");
    assert_eq!(manifest.resources.len(), 6);
    assert_eq!(manifest.output("url"), Some(&json!("https://app.example.com")));

    let service = manifest.resource("app-service").unwrap();
    assert_eq!(service.type_token, "awsx:ecs:FargateService");
    assert_eq!(
        service.properties["taskDefinitionArgs"]["container"]["environment"][2],
        json!({ "name": "DATABASE_URL", "value": "[secret]" })
    );
    assert_eq!(
        service.properties["taskDefinitionArgs"]["container"]["image"],
        json!({ "$ref": "awsx:ecr:Image::app-img.imageUri" })
    );

    let image = manifest.resource("app-img").unwrap();
    assert_eq!(image.depends_on, vec!["awsx:ecr:Repository::app-repo"]);
    assert_eq!(
        image.properties["repositoryUrl"],
        json!({ "$ref": "awsx:ecr:Repository::app-repo.url" })
    );

    assert_eq!(manifest.secrets, SecretPolicy::Redact);
    assert!(!manifest.to_json().unwrap().contains("hunter2"));
    assert!(!manifest.to_yaml().unwrap().contains("hunter2"));
}

/// The engine's manifest keeps DATABASE_URL recoverable
#[test]
fn test_engine_manifest_carries_database_url() {
    let manifest = deployment().render_for_engine().unwrap();
    assert_eq!(manifest.secrets, SecretPolicy::Envelope);

    let service = manifest.resource("app-service").unwrap();
    assert_eq!(
        service.properties["taskDefinitionArgs"]["container"]["environment"][2],
        json!({
            "name": "DATABASE_URL",
            "value": { "$secret": "postgres://app:hunter2@db/app" }
        })
    );
    // everything else renders the same as the redacted manifest
    let redacted = deployment().render().unwrap();
    assert_eq!(
        manifest.resource("app-lb").unwrap().properties,
        redacted.resource("app-lb").unwrap().properties
    );
}

/// A domain name may coincide with a fixed resource name
#[test]
fn test_domain_named_like_a_resource() {
    for domain in ["app-lb", "app-cluster", "app-service"] {
        let mut config = config();
        config.set("webapp:domainName", domain);
        let deployment = Deployment::from_config(&config, &AppSettings::default()).unwrap();
        assert_eq!(deployment.graph().len(), 6);
        assert!(deployment.graph().validate().is_ok());

        let record = deployment
            .graph()
            .get(ResourceKind::Route53Record, domain)
            .unwrap();
        assert_eq!(record.attr("name").and_then(Attr::as_str), Some(domain));

        let manifest = deployment.render().unwrap();
        let urns: Vec<_> = manifest.resources.iter().map(|r| r.urn.as_str()).collect();
        let record_urn = format!("aws:route53/record:Record::{}", domain);
        assert!(urns.contains(&record_urn.as_str()));
        assert_eq!(
            urns.len(),
            urns.iter().collect::<std::collections::HashSet<_>>().len()
        );
    }
}

#[test]
fn test_repository_force_delete() {
    let deployment = deployment();
    let repo = deployment
        .graph()
        .get(ResourceKind::EcrRepository, "app-repo")
        .unwrap();
    assert_eq!(repo.attr("forceDelete").and_then(Attr::as_bool), Some(true));
}
