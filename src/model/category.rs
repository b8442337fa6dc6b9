use crate::Result;
use anyhow::{ensure, Context};
use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The legend key and display title of the empty ("uncategorized") category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A category as declared in the configuration file.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryConfig {
    pub name: String,
    /// Display title. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// A CSS color used for the legend entry, the form control and the category tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Regular expressions matched as whole words against transaction labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Monthly spending above this amount is flagged in the summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<Decimal>,
}

impl CategoryConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// The inline style replicated onto everything rendered for this category.
    pub fn style(&self) -> Option<String> {
        self.color
            .as_ref()
            .map(|color| format!("background-color: {color}"))
    }
}

/// What the legend says about one category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryDefinition {
    /// The category name, empty for uncategorized.
    pub name: String,
    pub title: String,
    pub style: Option<String>,
}

/// The configured categories, in legend order, with their keyword matchers compiled.
#[derive(Debug, Clone, Default)]
pub struct Legend {
    categories: Vec<CategoryConfig>,
    matchers: Vec<Vec<Regex>>,
}

impl Legend {
    /// # Errors
    /// - Returns an error if a category name is empty or declared twice.
    /// - Returns an error if a keyword is not a valid regular expression.
    pub fn new(categories: Vec<CategoryConfig>) -> Result<Self> {
        let mut matchers = Vec::with_capacity(categories.len());
        for (ix, category) in categories.iter().enumerate() {
            ensure!(
                !category.name.is_empty(),
                "Category #{} has an empty name",
                ix + 1
            );
            ensure!(
                category.name != UNCATEGORIZED,
                "'{UNCATEGORIZED}' is reserved for transactions without a category"
            );
            ensure!(
                !categories[..ix].iter().any(|c| c.name == category.name),
                "Category '{}' is declared more than once",
                category.name
            );
            let mut compiled = Vec::with_capacity(category.keywords.len());
            for keyword in &category.keywords {
                let regex = RegexBuilder::new(&format!(r"\b{keyword}\b"))
                    .case_insensitive(true)
                    .build()
                    .with_context(|| {
                        format!(
                            "Invalid keyword '{keyword}' for category '{}'",
                            category.name
                        )
                    })?;
                compiled.push(regex);
            }
            matchers.push(compiled);
        }
        Ok(Self {
            categories,
            matchers,
        })
    }

    pub fn categories(&self) -> &[CategoryConfig] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Names of the categories with a keyword that matches `label`, in legend order.
    pub fn suggest(&self, label: &str) -> Vec<String> {
        self.categories
            .iter()
            .zip(&self.matchers)
            .filter(|(_, regexes)| regexes.iter().any(|r| r.is_match(label)))
            .map(|(category, _)| category.name.clone())
            .collect()
    }
}
