use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "スタック '{stack}' の設定ファイルが見つかりません。以下を確認してください:\n\
        - カレントディレクトリ: Wright.{stack}.local.yaml, Wright.{stack}.yaml\n\
        - ./.stackwright/ ディレクトリ\n\
        - ~/.config/stackwright/Wright.{stack}.yaml\n\
        WRIGHT_CONFIG_PATH 環境変数でファイルを直接指定することもできます"
    )]
    StackFileNotFound { stack: String },

    #[error(
        "必須の設定値 '{key}' がありません (スタック: {stack})\n\
        ヒント: スタックファイルの `config:` か WRIGHT_CONFIG に `{key}` を追加してください"
    )]
    MissingConfiguration { key: String, stack: String },

    #[error("設定値 '{key}' が不正です: {message}")]
    InvalidValue { key: String, message: String },

    #[error("スタックファイルのパースエラー: {path}\n理由: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("環境変数 {var} が不正です: {message}")]
    EnvOverlay { var: String, message: String },

    #[error("1Password エラー: {0}")]
    OnePassword(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML エラー: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// 必須キーの欠落を表すエラーか
    pub fn is_missing_configuration(&self) -> bool {
        matches!(self, ConfigError::MissingConfiguration { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
