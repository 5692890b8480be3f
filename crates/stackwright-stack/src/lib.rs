//! AWS上のコンテナWebアプリケーションのデプロイメント記述
//!
//! スタック設定を読み込み、クラスター・ロードバランサー・DNSレコード・
//! レジストリ・イメージ・Fargateサービスを宣言して、プロビジョニング
//! エンジンが適用するマニフェストを生成する。
//!
//! ```ignore
//! let config = StackConfig::load("prod")?;
//! let deployment = Deployment::from_config(&config, &AppSettings::default())?;
//! let manifest = deployment.render_for_engine()?;
//! ```

pub mod aws;
pub mod deployment;
pub mod env;
pub mod error;
pub mod inputs;
pub mod settings;

pub use deployment::{DEFAULT_PROJECT, Deployment, URL_OUTPUT};
pub use env::{EnvValue, EnvironmentMap};
pub use error::{Result, StackError};
pub use inputs::StackInputs;
pub use settings::{AppSettings, DEFAULT_CONTEXT};
