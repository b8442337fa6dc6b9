//! Sends edit forms to the server.
//!
//! The `Submitter` trait has two implementations: `HttpSubmitter`, which POSTs the form with
//! `reqwest`, and `TestSubmitter`, which keeps everything in memory. The in-memory one is compiled
//! in production too so that the whole program can run without a server.

mod http;
mod test_client;

use crate::model::Annotations;
use crate::{Config, Result};
use serde::Serialize;

pub use http::HttpSubmitter;
pub use test_client::{TestBehavior, TestSubmitter};

/// The environment variable that switches the program to the in-memory submitter.
pub const TEST_MODE_ENV: &str = "TX_ANNOTATE_IN_TEST_MODE";

/// Sends a serialized edit form to its target.
#[async_trait::async_trait]
pub trait Submitter {
    /// POSTs `form` to `target`.
    ///
    /// # Errors
    /// - Returns an error if the request cannot be sent, times out, or the server does not answer
    ///   with a success status.
    async fn submit(&self, target: &str, form: &FormData) -> Result<Accepted>;
}

/// The form-encoded body of a submission, in document order.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// All values submitted under `name`.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What a successful submission confirmed.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Accepted {
    annotations: Option<Annotations>,
}

impl Accepted {
    /// The server confirmed receipt without saying what it stored.
    pub fn receipt() -> Self {
        Self { annotations: None }
    }

    /// The server stated which annotations it stored.
    pub fn echo(annotations: Annotations) -> Self {
        Self {
            annotations: Some(annotations),
        }
    }

    pub fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }

    /// Parses a response body. A JSON `Annotations` object is an echo; anything else, including
    /// an empty body, is a plain receipt.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return Self::receipt();
        }
        match serde_json::from_str::<Annotations>(body) {
            Ok(annotations) => Self::echo(annotations),
            Err(e) => {
                tracing::debug!("Response body is not an annotation set ({e}), using the form");
                Self::receipt()
            }
        }
    }
}

/// Which `Submitter` the program uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// `Mode::Test` when `TX_ANNOTATE_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(v) if !v.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the `Submitter` for `mode`.
pub fn submitter(config: &Config, mode: Mode) -> Result<Box<dyn Submitter + Send + Sync>> {
    Ok(match mode {
        Mode::Http => Box::new(HttpSubmitter::new(config.request_timeout())?),
        Mode::Test => Box::new(TestSubmitter::default()),
    })
}
