use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const STACK_YAML: &str = r#"
project: webapp
config:
  webapp:domainName: app.example.com
  acmCertificateArn: arn:aws:acm:us-east-1:123456789012:certificate/abc
  route53ZoneId: Z123456
  webapp:DATABASE_URL:
    secure: postgres://app:hunter2@db/app
"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn with_stack(stack: &str, content: &str) -> Self {
        let project = Self::new();
        project.write_stack_file(stack, content);
        project
    }

    pub fn write_stack_file(&self, stack: &str, content: &str) {
        let path = self.root.path().join(format!("Wright.{}.yaml", stack));
        fs::write(path, content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// `wright` running inside the project with a clean environment
    pub fn wright(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("wright").unwrap();
        cmd.current_dir(self.path())
            .env_remove("WRIGHT_CONFIG_PATH")
            .env_remove("WRIGHT_CONFIG")
            .env_remove("WRIGHT_CONFIG_SECRET_KEYS")
            .env_remove("WRIGHT_STACK")
            .env("NO_COLOR", "1");
        cmd
    }
}
