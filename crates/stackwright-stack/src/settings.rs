//! スタック設定から読み込まないデプロイメント設定

use crate::error::{Result, StackError};

/// 未指定時に使うビルドコンテキスト
pub const DEFAULT_CONTEXT: &str = "./path/to/your/app";

/// 宣言するリソースの名前とサイズ
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub cluster_name: String,
    pub load_balancer_name: String,
    pub repository_name: String,
    pub image_name: String,
    pub service_name: String,
    pub container_name: String,
    /// アプリケーションとDockerfileを含むローカルディレクトリ
    pub context: String,
    pub container_port: u16,
    /// コンテナのCPUユニット
    pub cpu: u32,
    /// コンテナのメモリ（MiB）
    pub memory: u32,
    pub desired_count: u32,
    pub assign_public_ip: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            cluster_name: "app-cluster".to_string(),
            load_balancer_name: "app-lb".to_string(),
            repository_name: "app-repo".to_string(),
            image_name: "app-img".to_string(),
            service_name: "app-service".to_string(),
            container_name: "app-container".to_string(),
            context: DEFAULT_CONTEXT.to_string(),
            container_port: 80,
            cpu: 128,
            memory: 1024,
            desired_count: 1,
            assign_public_ip: true,
        }
    }
}

impl AppSettings {
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.context.trim().is_empty() {
            return Err(StackError::InvalidSetting(
                "ビルドコンテキストが空です".to_string(),
            ));
        }
        if self.container_port == 0 {
            return Err(StackError::InvalidSetting(
                "コンテナポートは0以外を指定してください".to_string(),
            ));
        }
        if self.cpu == 0 || self.memory == 0 {
            return Err(StackError::InvalidSetting(
                "cpuとmemoryは0以外を指定してください".to_string(),
            ));
        }
        Ok(())
    }
}
