//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::config::ConfigFile;
use crate::model::{CategoryConfig, TransactionEntry};
use crate::page::{Page, Snapshot};
use crate::Config;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use tempfile::TempDir;

pub(crate) const ACTION_BASE: &str = "http://localhost:5000/update";

fn config_file(page_size: usize) -> ConfigFile {
    let mut rent = CategoryConfig::new("Rent").with_color("#2a9d8f");
    rent.warning_threshold = Some(Decimal::from(700));
    let mut food = CategoryConfig::new("Food")
        .with_color("#f4a261")
        .with_keywords(["bakery", "super ?market"]);
    food.title = Some("Groceries & Restaurants".to_string());
    ConfigFile {
        action_base: ACTION_BASE.to_string(),
        page_size,
        categories: vec![
            food,
            rent,
            CategoryConfig::new("Transport").with_keywords(["sncf"]),
        ],
        goals: vec!["Vacation".to_string(), "Car".to_string()],
        ..ConfigFile::default()
    }
}

/// A configuration that is never written to disk.
pub(crate) fn fixture_config_with_page_size(page_size: usize) -> Config {
    Config::from_file(PathBuf::from("/nonexistent"), config_file(page_size)).unwrap()
}

pub(crate) fn fixture_config() -> Config {
    fixture_config_with_page_size(100)
}

fn entry(
    id: &str,
    date: (i32, u32, u32),
    label: &str,
    amount: &str,
    categories: &[&str],
    goal: Option<&str>,
) -> TransactionEntry {
    TransactionEntry {
        id: id.to_string(),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        label: label.to_string(),
        amount: FromStr::from_str(amount).unwrap(),
        categories: categories.iter().map(|s| s.to_string()).collect(),
        goal: goal.map(String::from),
    }
}

/// Five transactions of March 2024:
/// - `t1` Bakery Paul, -42.10, Food
/// - `t2` Salary, 2500.00, uncategorized
/// - `t3` Rent March, -800.00, Rent and Gifts (not in the legend), goal Vacation
/// - `t4` SNCF ticket, -35.50, Transport, goal Car
/// - `t5` Supermarket, -18.00, uncategorized, goal Vacation
pub(crate) fn fixture_snapshot() -> Snapshot {
    Snapshot {
        transactions: vec![
            entry("t1", (2024, 3, 2), "Bakery Paul", "-42.10", &["Food"], None),
            entry("t2", (2024, 3, 5), "Salary", "2500.00", &[], None),
            entry(
                "t3",
                (2024, 3, 8),
                "Rent March",
                "-800.00",
                &["Rent", "Gifts"],
                Some("Vacation"),
            ),
            entry("t4", (2024, 3, 12), "SNCF ticket", "-35.50", &["Transport"], Some("Car")),
            entry("t5", (2024, 3, 20), "Supermarket", "-18.00", &[], Some("Vacation")),
        ],
    }
}

/// Renders the fixture snapshot, showing `page_size` transactions before "show more".
pub(crate) fn fixture_page(page_size: usize) -> Page {
    Page::new(fixture_snapshot(), &fixture_config_with_page_size(page_size)).unwrap()
}

/// Test environment that sets up a home directory with a config file and the fixture snapshot.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub(crate) struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub(crate) async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("tx-annotate");
        let _ = Config::create(&root, ACTION_BASE).await.unwrap();
        let file = config_file(100);
        file.save(root.join("config.json")).await.unwrap();
        let config = Config::load(&root).await.unwrap();
        fixture_snapshot()
            .save(config.snapshot_path())
            .await
            .unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub(crate) fn config(&self) -> Config {
        self.config.clone()
    }
}
