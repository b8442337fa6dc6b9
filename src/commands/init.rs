use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory and an initial `config.json` that submits edits under
/// `action_base`.
///
/// # Errors
/// - Returns an error if `action_base` is not a URL, a config file already exists, or any file
///   operation fails.
pub async fn init(home: &Path, action_base: &str) -> Result<Out<()>> {
    let config = Config::create(home, action_base)
        .await
        .context("Unable to create the home directory and config")?;
    Ok(format!(
        "Successfully created '{}', add your transactions to '{}'",
        config.config_path().display(),
        config.snapshot_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let out = init(&home, "https://budget.example.com/update").await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert!(home.join("config.json").is_file());
        assert!(init(&home, "https://budget.example.com/update").await.is_err());
    }
}
