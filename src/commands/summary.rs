use crate::commands::Out;
use crate::page::Page;
use crate::summary::CategorySummary;
use crate::{Config, Result};
use tracing::warn;

/// Totals expenses per category over the configured snapshot.
pub async fn summary(config: &Config) -> Result<Out<Vec<CategorySummary>>> {
    let page = Page::load(config).await?;
    let summary = page.summary();
    for category in summary.iter().filter(|c| c.warning.is_some()) {
        warn!("{} is over its threshold", category.title);
    }
    let message = summary
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Out::new(message, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_summary_command() {
        let env = TestEnv::new().await;
        let out = summary(&env.config()).await.unwrap();
        let lines: Vec<&str> = out.message().lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Groceries & Restaurants = 42.10€ (2%)");
        assert_eq!(lines[4], "Uncategorized = 18.00€ (1%)");
    }
}
