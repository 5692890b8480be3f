//! 1Password連携
//!
//! スタックファイルのシークレットは `op://Vault/Item/Field` 形式の参照で
//! 書ける。スタック設定の読み込み時に1Password CLI（`op read`）で解決する。
//!
//! 解決した値はログにもエラーメッセージにも含めない。

use crate::error::{ConfigError, Result};
use std::process::Command;
use tracing::debug;

const OP_PREFIX: &str = "op://";

/// 1Password CLIがインストールされているか
pub fn is_available() -> bool {
    Command::new("op")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// 値が1Password参照か
pub fn is_op_reference(value: &str) -> bool {
    value.starts_with(OP_PREFIX)
}

/// `op://` 参照を1つ解決してシークレット値を返す
pub fn resolve_reference(reference: &str) -> Result<String> {
    if !is_op_reference(reference) {
        return Err(ConfigError::OnePassword(format!(
            "1Password参照の形式が不正です: {} (op:// で始まる必要があります)",
            reference
        )));
    }

    debug!(reference = %reference, "Resolving 1Password reference");

    let mut cmd = Command::new("op");
    cmd.arg("read").arg(reference);

    if let Ok(account) = std::env::var("OP_ACCOUNT") {
        debug!(account = %account, "Using OP_ACCOUNT");
        cmd.arg("--account").arg(account);
    }

    let output = cmd
        .output()
        .map_err(|e| ConfigError::OnePassword(format!("op コマンドを実行できません: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        let hint = if stderr.contains("not signed in") || stderr.contains("session expired") {
            "\nヒント: `op signin` を実行するか OP_SERVICE_ACCOUNT_TOKEN を設定してください"
        } else if stderr.contains("not found") {
            "\nヒント: Vault・Item・Field の名前を確認してください"
        } else if stderr.contains("multiple accounts") {
            "\nヒント: OP_ACCOUNT でアカウントを選択してください"
        } else {
            ""
        };

        return Err(ConfigError::OnePassword(format!(
            "{} を解決できません: {}{}",
            reference,
            stderr.trim(),
            hint
        )));
    }

    let secret = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!("Resolved 1Password reference");

    Ok(secret)
}
