#![allow(deprecated)] // TODO: switch to cargo_bin_cmd! when assert_cmd 2.1 is the minimum

use assert_cmd::Command;
use predicates::prelude::*;
mod common;
use common::{STACK_YAML, TestProject};

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("wright").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("wright").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stackwright"));
}

#[test]
fn test_render_help_lists_stack_flag() {
    let mut cmd = Command::cargo_bin("wright").unwrap();
    cmd.arg("render")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--stack"))
        .stdout(predicate::str::contains("--context"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("wright").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

#[test]
fn test_validate_without_stack_file() {
    let project = TestProject::new();
    project
        .wright()
        .args(["validate", "--stack", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "スタック 'nowhere' の設定ファイルが見つかりません",
        ));
}

#[test]
fn test_validate_ok() {
    let project = TestProject::with_stack("dev", STACK_YAML);
    project
        .wright()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("スタックは正常です"))
        .stdout(predicate::str::contains("https://app.example.com"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_validate_missing_key() {
    let project = TestProject::with_stack(
        "prod",
        "project: webapp\nconfig:\n  acmCertificateArn: arn\n  route53ZoneId: Z1\n",
    );
    project
        .wright()
        .args(["validate", "-s", "prod"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "必須の設定値 'webapp:domainName' がありません",
        ));
}

#[test]
fn test_stack_from_env() {
    let project = TestProject::with_stack("stg", STACK_YAML);
    project
        .wright()
        .env("WRIGHT_STACK", "stg")
        .arg("validate")
        .assert()
        .success();
}

#[test]
fn test_render_stdout_redacts_secret() {
    let project = TestProject::with_stack("dev", STACK_YAML);
    project
        .wright()
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"awsx:ecs:FargateService\""))
        .stdout(predicate::str::contains("https://app.example.com"))
        .stdout(predicate::str::contains("[secret]"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_render_yaml_to_file() {
    let project = TestProject::with_stack("dev", STACK_YAML);
    let out = project.path().join("out/manifest.yaml");
    project
        .wright()
        .args(["render", "--format", "yaml", "--context", "./web", "--out"])
        .arg(&out)
        .assert()
        .success();

    let content = std::fs::read_to_string(out).unwrap();
    assert!(content.contains("linux/arm64"));
    assert!(content.contains("./web"));
}

#[test]
fn test_preview_summary() {
    let project = TestProject::with_stack("dev", STACK_YAML);
    project
        .wright()
        .arg("preview")
        .assert()
        .success()
        .stdout(predicate::str::contains("6 to create"))
        .stdout(predicate::str::contains("app-service"));
}

#[test]
fn test_up_requires_yes() {
    let project = TestProject::with_stack("dev", STACK_YAML);
    project
        .wright()
        .arg("up")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
    assert!(!project.path().join(".stackwright/dev.json").exists());

    project
        .wright()
        .args(["up", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("スタックを引き渡しました"));
    assert!(project.path().join(".stackwright/dev.json").exists());
}

#[test]
fn test_up_stores_recoverable_secret() {
    let project = TestProject::with_stack("dev", STACK_YAML);
    project
        .wright()
        .args(["up", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2").not());

    let path = project.path().join(".stackwright/dev.json");
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let service = stored["resources"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "app-service")
        .unwrap();
    let environment = &service["properties"]["taskDefinitionArgs"]["container"]["environment"];
    assert_eq!(environment[2]["name"], "DATABASE_URL");
    assert_eq!(
        environment[2]["value"]["$secret"],
        "postgres://app:hunter2@db/app"
    );

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn test_overlay_overrides_namespaced_domain() {
    let project = TestProject::with_stack("dev", STACK_YAML);
    project
        .wright()
        .env("WRIGHT_CONFIG", r#"{"domainName":"override.example.com"}"#)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://override.example.com"))
        .stdout(predicate::str::contains("https://app.example.com").not());
}

#[test]
fn test_domain_named_like_load_balancer() {
    let project = TestProject::with_stack(
        "dev",
        &STACK_YAML.replace("app.example.com", "app-lb"),
    );
    project
        .wright()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://app-lb"));
}

#[test]
fn test_down_after_up() {
    let project = TestProject::with_stack("dev", STACK_YAML);
    project.wright().args(["up", "--yes"]).assert().success();
    project
        .wright()
        .args(["down", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("スタックを取り下げました"));
    assert!(!project.path().join(".stackwright/dev.json").exists());
}

#[test]
fn test_graph_lists_references() {
    let project = TestProject::with_stack("dev", STACK_YAML);
    project
        .wright()
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("app-lb.dnsName"))
        .stdout(predicate::str::contains("app-img.imageUri"));
}
