use stackwright_cloud::CloudError;
use stackwright_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("設定が不正です: {0}")]
    InvalidSetting(String),
}

impl StackError {
    /// 必須の設定キーが欠けていたために組み立てが止まったか
    pub fn is_missing_configuration(&self) -> bool {
        matches!(self, StackError::Config(e) if e.is_missing_configuration())
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
