//! stackwright のスタック設定
//!
//! スタックファイルを探して [`StackConfig`] に読み込み、リソース記述の
//! 組み立てで使う `require` / `require_secret` を提供する。

pub mod error;
pub mod onepassword;
pub mod secret;
pub mod stack;

pub use error::*;
pub use secret::{REDACTED, Secret};
pub use stack::{ConfigEntry, ENV_CONFIG, ENV_SECRET_KEYS, StackConfig};

use std::path::PathBuf;

/// コマンドラインでも `WRIGHT_STACK` でも指定がないときのスタック
pub const DEFAULT_STACK: &str = "dev";

/// スタックの設定ファイル名（優先度の高い順）
pub fn stack_file_candidates(stack: &str) -> [String; 2] {
    [
        format!("Wright.{}.local.yaml", stack),
        format!("Wright.{}.yaml", stack),
    ]
}

/// `stack` の設定ファイルを探す
///
/// 検索順序:
/// 1. `WRIGHT_CONFIG_PATH`（直接指定）
/// 2. カレントディレクトリ: `Wright.<stack>.local.yaml`, `Wright.<stack>.yaml`
/// 3. `./.stackwright/` 内の同名ファイル
/// 4. `~/.config/stackwright/Wright.<stack>.yaml`
pub fn find_stack_file(stack: &str) -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var("WRIGHT_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    let candidates = stack_file_candidates(stack);

    for filename in &candidates {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let stack_dir = current_dir.join(".stackwright");
    if stack_dir.is_dir() {
        for filename in &candidates {
            let path = stack_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir
            .join("stackwright")
            .join(format!("Wright.{}.yaml", stack));
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::StackFileNotFound {
        stack: stack.to_string(),
    })
}
