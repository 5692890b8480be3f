//! スタック設定
//!
//! スタックファイルにはデプロイメントが必要とする名前付きの値を書く:
//!
//! ```yaml
//! project: webapp
//! config:
//!   webapp:domainName: app.example.com
//!   acmCertificateArn: arn:aws:acm:us-east-1:123456789012:certificate/abc
//!   webapp:DATABASE_URL:
//!     secure: op://Infra/webapp-db/url
//! ```
//!
//! キーはまず `<project>:<key>`、次に素のキーで検索する。
//! `WRIGHT_CONFIG`（JSONオブジェクト）はファイルの値を上書きし、
//! `WRIGHT_CONFIG_SECRET_KEYS`（JSON配列）はキーをシークレットとして扱う。
//! どちらも、検索で実際に使われるエントリに対して適用される。

use crate::error::{ConfigError, Result};
use crate::onepassword;
use crate::secret::{REDACTED, Secret};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

pub const ENV_CONFIG: &str = "WRIGHT_CONFIG";
pub const ENV_SECRET_KEYS: &str = "WRIGHT_CONFIG_SECRET_KEYS";

/// 設定値1つ
#[derive(Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    value: String,
    secret: bool,
}

impl ConfigEntry {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            secret: false,
        }
    }

    pub fn secret(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            secret: true,
        }
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }
}

impl fmt::Debug for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.secret { REDACTED } else { self.value.as_str() };
        f.debug_struct("ConfigEntry")
            .field("value", &value)
            .field("secret", &self.secret)
            .finish()
    }
}

/// ディスク上のスタックファイルそのまま
#[derive(Debug, Deserialize)]
struct StackFile {
    project: Option<String>,
    #[serde(default)]
    config: BTreeMap<String, RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Secure { secure: String },
    Plain(serde_yaml::Value),
}

/// 1スタック分の設定。明示的に構築してリソース記述の組み立てに渡す
#[derive(Debug, Clone, Default)]
pub struct StackConfig {
    stack: String,
    project: Option<String>,
    entries: BTreeMap<String, ConfigEntry>,
    source: Option<PathBuf>,
}

impl StackConfig {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// 通常の値を設定する
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), ConfigEntry::plain(value));
        self
    }

    /// シークレット値を設定する
    pub fn set_secret(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), ConfigEntry::secret(value));
        self
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// 読み込み元のスタックファイルのパス
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// YAML文字列からスタックファイルをパースする
    pub fn from_yaml_str(stack: impl Into<String>, content: &str) -> Result<Self> {
        let file: StackFile = serde_yaml::from_str(content)?;
        let mut config = Self::new(stack);
        config.project = file.project;

        for (key, raw) in file.config {
            let entry = match raw {
                RawValue::Secure { secure } => ConfigEntry::secret(secure),
                RawValue::Plain(value) => ConfigEntry::plain(scalar_to_string(&key, value)?),
            };
            config.entries.insert(key, entry);
        }

        Ok(config)
    }

    /// ディスクからスタックファイルを読み込む
    #[instrument(fields(path = %path.display()))]
    pub fn from_file(stack: &str, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(stack, &content).map_err(|e| match e {
            ConfigError::Yaml(err) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
            other => other,
        })?;
        config.source = Some(path.to_path_buf());
        debug!(entries = config.entries.len(), "Parsed stack file");
        Ok(config)
    }

    /// スタックの設定を探して読み込み、確定させる
    ///
    /// ファイルの読み込み後に環境変数による上書きを適用し、`op://` 参照を解決する。
    #[instrument]
    pub fn load(stack: &str) -> Result<Self> {
        let path = crate::find_stack_file(stack)?;
        let mut config = Self::from_file(stack, &path)?;
        config.apply_env_overlay()?;
        config.resolve_secret_references()?;
        info!(
            stack = %config.stack,
            entries = config.entries.len(),
            "Stack configuration loaded"
        );
        Ok(config)
    }

    /// `WRIGHT_CONFIG` と `WRIGHT_CONFIG_SECRET_KEYS` を適用する
    ///
    /// 素のキーは、`<project>:<key>` のエントリがあればそちらに適用する。
    pub fn apply_env_overlay(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(ENV_CONFIG) {
            let overrides: BTreeMap<String, String> =
                serde_json::from_str(&raw).map_err(|e| ConfigError::EnvOverlay {
                    var: ENV_CONFIG.to_string(),
                    message: e.to_string(),
                })?;
            debug!(count = overrides.len(), "Applying environment overrides");
            for (key, value) in overrides {
                let key = self.storage_key(&key);
                let secret = self.entries.get(&key).is_some_and(ConfigEntry::is_secret);
                self.entries.insert(key, ConfigEntry { value, secret });
            }
        }

        if let Ok(raw) = std::env::var(ENV_SECRET_KEYS) {
            let keys: Vec<String> =
                serde_json::from_str(&raw).map_err(|e| ConfigError::EnvOverlay {
                    var: ENV_SECRET_KEYS.to_string(),
                    message: e.to_string(),
                })?;
            for key in keys {
                let key = self.storage_key(&key);
                if let Some(entry) = self.entries.get_mut(&key) {
                    entry.secret = true;
                }
            }
        }

        Ok(())
    }

    /// `op://` 参照を解決済みの値で置き換える
    ///
    /// 解決した値は常にシークレット扱い。解決した参照の数を返す。
    pub fn resolve_secret_references(&mut self) -> Result<usize> {
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| onepassword::is_op_reference(&entry.value))
            .map(|(key, _)| key.clone())
            .collect();

        if keys.is_empty() {
            return Ok(0);
        }

        if !onepassword::is_available() {
            return Err(ConfigError::OnePassword(
                "1Password CLI (op) がインストールされていないか PATH にありません".to_string(),
            ));
        }

        let mut errors = Vec::new();
        let mut resolved = 0;
        for key in keys {
            let Some(entry) = self.entries.get_mut(&key) else {
                continue;
            };
            match onepassword::resolve_reference(&entry.value) {
                Ok(value) => {
                    *entry = ConfigEntry::secret(value);
                    resolved += 1;
                    debug!(key = %key, "Resolved secret reference");
                }
                Err(e) => errors.push(format!("{}: {}", key, e)),
            }
        }

        if !errors.is_empty() {
            return Err(ConfigError::OnePassword(errors.join("\n")));
        }

        info!(resolved, "Resolved 1Password references");
        Ok(resolved)
    }

    fn namespaced(&self, key: &str) -> Option<String> {
        self.project
            .as_ref()
            .map(|project| format!("{}:{}", project, key))
    }

    fn entry(&self, key: &str) -> Option<&ConfigEntry> {
        self.namespaced(key)
            .and_then(|namespaced| self.entries.get(&namespaced))
            .or_else(|| self.entries.get(key))
    }

    /// `entry(key)` が参照するエントリのキー
    fn storage_key(&self, key: &str) -> String {
        match self.namespaced(key) {
            Some(namespaced) if self.entries.contains_key(&namespaced) => namespaced,
            _ => key.to_string(),
        }
    }

    fn missing(&self, key: &str) -> ConfigError {
        ConfigError::MissingConfiguration {
            key: self.namespaced(key).unwrap_or_else(|| key.to_string()),
            stack: self.stack.clone(),
        }
    }

    /// 値を取得する
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|entry| entry.value.as_str())
    }

    /// シークレットとして値を取得する
    pub fn get_secret(&self, key: &str) -> Option<Secret> {
        self.entry(key).map(|entry| Secret::new(entry.value.clone()))
    }

    /// `key` の値がシークレット扱いか
    pub fn is_secret(&self, key: &str) -> bool {
        self.entry(key).is_some_and(ConfigEntry::is_secret)
    }

    /// 必須の値を取得する
    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .map(str::to_string)
            .ok_or_else(|| self.missing(key))
    }

    /// 必須の値をシークレットとして取得する
    pub fn require_secret(&self, key: &str) -> Result<Secret> {
        self.get_secret(key).ok_or_else(|| self.missing(key))
    }
}

fn scalar_to_string(key: &str, value: serde_yaml::Value) -> Result<String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("文字列・数値・真偽値のいずれかを指定してください（実際: {:?}）", other),
        }),
    }
}
