//! These structs provide the CLI interface for the tx-annotate CLI.

use crate::model::{Dimension, FilterCriterion};
use clap::{ArgGroup, Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// tx-annotate: Annotate your transactions with categories and savings goals.
///
/// The program renders a snapshot of transactions into a page, the same page a budget web app
/// shows. Each transaction can be given any number of categories and at most one savings goal.
/// Edits are submitted to the server at the configured `action_base` and the page is updated
/// with the accepted result. The list can be filtered by category or goal.
///
/// Set TX_ANNOTATE_IN_TEST_MODE to a non-empty value to submit edits to an in-memory server
/// instead.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and an initial configuration file.
    ///
    /// The configuration names the server edits are submitted to. Categories, goals and display
    /// settings can then be added to `config.json`, and the transactions to annotate go in
    /// `transactions.json` next to it.
    Init(InitArgs),
    /// Print the rendered page as HTML.
    Render,
    /// Show one transaction as it is rendered, along with category suggestions.
    Show(ShowArgs),
    /// List the transactions that match a filter.
    Filter(FilterArgs),
    /// Change the categories and goal of a transaction and submit the edit.
    Annotate(AnnotateArgs),
    /// Show expenses per category.
    Summary,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration and transactions are held. Defaults to
    /// ~/tx-annotate
    #[arg(long, env = "TX_ANNOTATE_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `tx-annotate init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL edits are submitted under, e.g. https://budget.example.com/update. Each edit is
    /// POSTed to <action-base>/<month>/<transaction id>.
    #[arg(long)]
    action_base: String,
}

impl InitArgs {
    pub fn new(action_base: impl Into<String>) -> Self {
        Self {
            action_base: action_base.into(),
        }
    }

    pub fn action_base(&self) -> &str {
        &self.action_base
    }
}

/// (Not shown): Args for the `tx-annotate show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// The id of the transaction.
    id: String,
}

impl ShowArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Args for the `tx-annotate filter` command.
#[derive(Debug, Parser, Clone, Default)]
#[command(group(ArgGroup::new("by_category").args(["category", "uncategorized"])))]
#[command(group(ArgGroup::new("by_goal").args(["goal", "no_goal"])))]
pub struct FilterArgs {
    /// Keep transactions that have this category.
    #[arg(long)]
    category: Option<String>,

    /// Keep transactions that have no category.
    #[arg(long)]
    uncategorized: bool,

    /// Keep transactions that have this goal.
    #[arg(long)]
    goal: Option<String>,

    /// Keep transactions that have no goal.
    #[arg(long)]
    no_goal: bool,
}

impl FilterArgs {
    pub fn new(
        category: Option<String>,
        uncategorized: bool,
        goal: Option<String>,
        no_goal: bool,
    ) -> Self {
        Self {
            category,
            uncategorized,
            goal,
            no_goal,
        }
    }

    /// The filter these arguments describe. No arguments at all match every transaction.
    pub fn criterion(&self) -> FilterCriterion {
        let category = match (&self.category, self.uncategorized) {
            (_, true) => Dimension::Absent,
            (Some(name), false) => Dimension::Value(name.clone()),
            (None, false) => Dimension::Any,
        };
        let goal = match (&self.goal, self.no_goal) {
            (_, true) => Dimension::Absent,
            (Some(name), false) => Dimension::Value(name.clone()),
            (None, false) => Dimension::Any,
        };
        FilterCriterion::new(category, goal)
    }
}

/// (Not shown): Args for the `tx-annotate annotate` command.
///
/// Without any flag the transaction keeps its annotations and is submitted as is.
#[derive(Debug, Parser, Clone, Default)]
#[command(group(ArgGroup::new("set_goal").args(["goal", "no_goal"])))]
pub struct AnnotateArgs {
    /// The id of the transaction.
    id: String,

    /// Set the categories to exactly these. Can be repeated.
    #[arg(long = "category", conflicts_with = "uncategorized")]
    categories: Vec<String>,

    /// Remove every category.
    #[arg(long)]
    uncategorized: bool,

    /// Add a category that is not offered yet. Can be repeated.
    #[arg(long = "new-category")]
    new_categories: Vec<String>,

    /// Set the goal.
    #[arg(long)]
    goal: Option<String>,

    /// Remove the goal.
    #[arg(long)]
    no_goal: bool,
}

impl AnnotateArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_categories<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.categories = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_uncategorized(mut self) -> Self {
        self.uncategorized = true;
        self
    }

    pub fn with_new_category(mut self, name: impl Into<String>) -> Self {
        self.new_categories.push(name.into());
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn with_no_goal(mut self) -> Self {
        self.no_goal = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `Some` when the categories should be replaced, `Some(&[])` to remove all of them.
    pub fn categories(&self) -> Option<&[String]> {
        if self.uncategorized || !self.categories.is_empty() {
            Some(self.categories.as_slice())
        } else {
            None
        }
    }

    pub fn new_categories(&self) -> &[String] {
        &self.new_categories
    }

    /// `Any` keeps the goal, `Absent` removes it, `Value` sets it.
    pub fn goal(&self) -> Dimension<String> {
        if self.no_goal {
            return Dimension::Absent;
        }
        Dimension::from_optional(self.goal.as_deref()).normalized()
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("tx-annotate"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or TX_ANNOTATE_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("tx-annotate")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
