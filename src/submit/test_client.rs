//! Implements the `Submitter` trait in memory.

use crate::model::Annotations;
use crate::submit::{Accepted, FormData, Submitter};
use crate::Result;
use anyhow::bail;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// How a `TestSubmitter` answers.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum TestBehavior {
    /// Confirm receipt with an empty body.
    #[default]
    Receipt,
    /// Confirm and state which annotations were stored.
    Echo(Annotations),
    /// Fail as if the transport had failed.
    Fail(String),
}

/// A `Submitter` that records every submission and answers according to its `TestBehavior`.
///
/// Clones share their state, so a test can keep a handle to inspect what the page sent.
#[derive(Debug, Clone, Default)]
pub struct TestSubmitter {
    behavior: Arc<Mutex<TestBehavior>>,
    sent: Arc<Mutex<Vec<(String, FormData)>>>,
}

impl TestSubmitter {
    pub fn new(behavior: TestBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            sent: Arc::default(),
        }
    }

    pub fn set_behavior(&self, behavior: TestBehavior) -> Result<()> {
        *lock(&self.behavior)? = behavior;
        Ok(())
    }

    /// Every `(target, form)` submitted so far, in order.
    pub fn sent(&self) -> Result<Vec<(String, FormData)>> {
        Ok(lock(&self.sent)?.clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    match mutex.lock() {
        Ok(guard) => Ok(guard),
        Err(_) => bail!("The test submitter is poisoned"),
    }
}

#[async_trait::async_trait]
impl Submitter for TestSubmitter {
    async fn submit(&self, target: &str, form: &FormData) -> Result<Accepted> {
        lock(&self.sent)?.push((target.to_string(), form.clone()));
        let behavior = lock(&self.behavior)?.clone();
        debug!("Test submission to {target}: {behavior:?}");
        match behavior {
            TestBehavior::Receipt => Ok(Accepted::receipt()),
            TestBehavior::Echo(annotations) => Ok(Accepted::echo(annotations)),
            TestBehavior::Fail(message) => bail!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_answers() {
        let submitter = TestSubmitter::default();
        let handle = submitter.clone();
        let mut form = FormData::new();
        form.push("goal", "");
        let accepted = submitter.submit("http://x/3/t1", &form).await.unwrap();
        assert_eq!(accepted, Accepted::receipt());
        assert_eq!(handle.sent().unwrap(), vec![("http://x/3/t1".to_string(), form)]);

        handle
            .set_behavior(TestBehavior::Fail("connection reset".to_string()))
            .unwrap();
        let err = submitter
            .submit("http://x/3/t1", &FormData::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(handle.sent().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_poisoned_lock_is_reported() {
        let submitter = TestSubmitter::default();
        let handle = submitter.clone();
        let _ = std::thread::spawn(move || {
            let _guard = handle.sent.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(submitter.sent().is_err());
        let err = submitter
            .submit("http://x/3/t1", &FormData::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("poisoned"));
    }
}
