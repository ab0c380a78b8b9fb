//! Scripted catalog provider
//!
//! Each source has a FIFO of scripted responses. When the FIFO is empty the
//! source's default item list is returned, and a source with neither fails
//! with `NotFound`.

use async_trait::async_trait;
use kiosk_rotator::catalog::{CatalogProvider, FetchError};
use kiosk_rotator::queue::Item;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

struct Scripted {
    delay: Duration,
    result: Result<Vec<Item>, FetchError>,
    panic: Option<&'static str>,
}

#[derive(Default)]
pub struct ScriptedCatalog {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    defaults: Mutex<HashMap<String, Vec<Item>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items returned once the script for `source` runs out
    pub fn with_default(self, source: &str, items: Vec<Item>) -> Self {
        self.defaults
            .lock()
            .unwrap()
            .insert(source.to_string(), items);
        self
    }

    pub fn push_ok(&self, source: &str, items: Vec<Item>) {
        self.push(source, Duration::ZERO, Ok(items));
    }

    pub fn push_err(&self, source: &str, error: FetchError) {
        self.push(source, Duration::ZERO, Err(error));
    }

    /// Respond after `delay` (virtual time under a paused clock)
    pub fn push_delayed(&self, source: &str, delay: Duration, result: Result<Vec<Item>, FetchError>) {
        self.push(source, delay, result);
    }

    /// The next fetch of `source` panics with `message`
    pub fn push_panic(&self, source: &str, message: &'static str) {
        self.push_scripted(
            source,
            Scripted {
                delay: Duration::ZERO,
                result: Ok(Vec::new()),
                panic: Some(message),
            },
        );
    }

    fn push(&self, source: &str, delay: Duration, result: Result<Vec<Item>, FetchError>) {
        self.push_scripted(
            source,
            Scripted {
                delay,
                result,
                panic: None,
            },
        );
    }

    fn push_scripted(&self, source: &str, scripted: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .entry(source.to_string())
            .or_default()
            .push_back(scripted);
    }

    /// Sources fetched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, source: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|s| *s == source).count()
    }
}

#[async_trait]
impl CatalogProvider for ScriptedCatalog {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_queue(&self, source: &str) -> Result<Vec<Item>, FetchError> {
        self.calls.lock().unwrap().push(source.to_string());

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(source)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(Scripted {
                delay,
                result,
                panic,
            }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if let Some(message) = panic {
                    panic!("{}", message);
                }
                result
            }
            None => self
                .defaults
                .lock()
                .unwrap()
                .get(source)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(source.to_string())),
        }
    }
}
