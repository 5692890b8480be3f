//! コンテナの環境変数

use stackwright_cloud::Attr;
use stackwright_config::Secret;

/// 環境変数1つの値
#[derive(Debug, Clone, PartialEq)]
pub enum EnvValue {
    Plain(String),
    Secret(Secret),
}

impl EnvValue {
    /// 平文の値（シークレットかどうかに関わらず）
    pub fn expose(&self) -> &str {
        match self {
            EnvValue::Plain(value) => value,
            EnvValue::Secret(secret) => secret.expose(),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, EnvValue::Secret(_))
    }
}

impl From<EnvValue> for Attr {
    fn from(value: EnvValue) -> Self {
        match value {
            EnvValue::Plain(value) => Attr::Str(value),
            EnvValue::Secret(secret) => Attr::Secret(secret),
        }
    }
}

/// コンテナへ渡す順序付きの名前/値マッピング
///
/// 既存の名前を挿入すると、その位置のまま値を置き換える。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentMap {
    entries: Vec<(String, EnvValue)>,
}

impl EnvironmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `PORT`・`NODE_ENV`・`DATABASE_URL` をこの順で設定
    pub fn standard(port: u16, database_url: Secret) -> Self {
        let mut env = Self::new();
        env.insert("PORT", port.to_string());
        env.insert("NODE_ENV", "production");
        env.insert_secret("DATABASE_URL", database_url);
        env
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.put(name.into(), EnvValue::Plain(value.into()));
    }

    pub fn insert_secret(&mut self, name: impl Into<String>, value: Secret) {
        self.put(name.into(), EnvValue::Secret(value));
    }

    fn put(&mut self, name: String, value: EnvValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&EnvValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// コンテナ定義が受け取る `[{ name, value }, ...]` 形式のリスト
    pub fn to_pairs(&self) -> Attr {
        Attr::list(self.entries.iter().map(|(name, value)| {
            Attr::map([
                ("name", Attr::Str(name.clone())),
                ("value", Attr::from(value.clone())),
            ])
        }))
    }
}
