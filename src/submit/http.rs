//! Implements the `Submitter` trait with `reqwest`.

use crate::submit::{Accepted, FormData, Submitter};
use crate::Result;
use anyhow::Context;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// POSTs edit forms as `application/x-www-form-urlencoded`. Every request is bounded by the
/// configured timeout.
pub struct HttpSubmitter {
    client: reqwest::Client,
}

impl HttpSubmitter {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, target: &str, form: &FormData) -> Result<Accepted> {
        let url = Url::parse(target).with_context(|| format!("Invalid target URL '{target}'"))?;
        trace!("POST {url} {:?}", form.pairs());
        let response = self
            .client
            .post(url.clone())
            .form(form.pairs())
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("The server rejected the edit sent to {url}"))?;
        let body = response
            .text()
            .await
            .with_context(|| format!("Unable to read the response from {url}"))?;
        debug!("{url} accepted the edit");
        Ok(Accepted::from_body(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_target() {
        let submitter = HttpSubmitter::new(Duration::from_secs(1)).unwrap();
        let err = submitter
            .submit("not a url/3/t1", &FormData::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid target URL"));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let submitter = HttpSubmitter::new(Duration::from_secs(2)).unwrap();
        let result = submitter
            .submit(
                &format!("http://127.0.0.1:{port}/update/3/t1"),
                &FormData::new(),
            )
            .await;
        assert!(result.is_err());
    }
}
