use crate::commands::Out;
use crate::extract::extract;
use crate::model::TransactionRecord;
use crate::page::Page;
use crate::{Config, Result};
use serde::Serialize;

/// The output of `show`.
#[derive(Debug, Clone, Serialize)]
pub struct Shown {
    pub record: TransactionRecord,
    /// Where an edit of the transaction would be submitted.
    pub target: String,
    /// Categories whose keywords match the label and that the transaction does not have yet.
    pub suggestions: Vec<String>,
}

/// Reads transaction `id` back from the rendered page and suggests categories for it.
pub async fn show(config: &Config, id: &str) -> Result<Out<Shown>> {
    let mut page = Page::load(config).await?;
    let record = extract(page.document(), page.node(id)?)?;
    let target = page.open(id)?.target().to_string();
    let suggestions = page.suggestions()?;
    let _ = page.cancel();

    let mut message = format!(
        "{} {} {} {} [{}]",
        record.id,
        record.date,
        record.label,
        record.amount_text,
        record.categories.join(", ")
    );
    if let Some(goal) = &record.goal {
        message.push_str(&format!(" goal: {goal}"));
    }
    if !suggestions.is_empty() {
        message.push_str(&format!(", suggested: {}", suggestions.join(", ")));
    }
    Ok(Out::new(
        message,
        Shown {
            record,
            target,
            suggestions,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_show() {
        let env = TestEnv::new().await;
        let out = show(&env.config(), "t3").await.unwrap();
        assert_eq!(
            out.message(),
            "t3 2024-03-08 Rent March -800.00€ [Rent, Gifts] goal: Vacation"
        );
        let shown = out.structure().unwrap();
        assert_eq!(shown.target, "http://localhost:5000/update/3/t3");
        assert!(shown.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_show_suggestions() {
        let env = TestEnv::new().await;
        let out = show(&env.config(), "t5").await.unwrap();
        assert_eq!(out.structure().unwrap().suggestions, vec!["Food"]);
        assert!(out.message().ends_with("suggested: Food"));
    }

    #[tokio::test]
    async fn test_show_unknown() {
        let env = TestEnv::new().await;
        assert!(show(&env.config(), "t9").await.is_err());
    }
}
