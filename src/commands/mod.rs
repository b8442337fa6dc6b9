//! Command handlers for the tx-annotate CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod annotate;
mod filter;
mod init;
mod render;
mod show;
mod summary;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use annotate::annotate;
pub use filter::filter;
pub use init::init;
pub use render::render;
pub use show::{show, Shown};
pub use summary::summary;

/// What a subcommand reports back to `main`: a line for the user and, for the commands that
/// inspect the page, the records or outcome behind it.
///
/// `show`, `filter`, `annotate` and `summary` attach their results, `render` attaches the HTML and
/// `init` only has a message.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    message: String,
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message along with the data it summarizes.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// The line shown to the user, e.g. `Saved t2: Food, Rent, goal Vacation`.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Logs the message at info level. The attached data is logged as JSON at debug level, so
    /// `--log-level debug` shows the records a command worked on.
    pub fn print(&self) {
        info!("{}", self.message);
        let Some(structure) = self.structure() else {
            return;
        };
        match serde_json::to_string_pretty(structure) {
            Ok(json) => debug!("Command output:\n\n{json}\n\n"),
            Err(e) => debug!("Unable to serialize the command output: {e}"),
        }
    }
}
