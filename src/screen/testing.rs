use std::sync::{Arc, Mutex};

use super::client::{CommandRunner, ScreenClient};
use crate::config::ScreenConfig;
use crate::error::Result;

/// In-memory stand-in for screen: serves a mutable listing for `-ls` and
/// records every other invocation.
#[derive(Default)]
pub struct FakeRunner {
    listing: Mutex<String>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRunner {
    pub fn new(listing: &str) -> Self {
        Self {
            listing: Mutex::new(listing.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fake runner plus a client using it with no settle delay
    pub fn client(listing: &str) -> (Arc<FakeRunner>, ScreenClient) {
        Self::client_with(listing, ScreenConfig::default())
    }

    pub fn client_with(listing: &str, config: ScreenConfig) -> (Arc<FakeRunner>, ScreenClient) {
        let runner = Arc::new(Self::new(listing));
        let config = ScreenConfig {
            settle_delay_ms: 0,
            ..config
        };
        (runner.clone(), ScreenClient::with_runner(runner, config))
    }

    pub fn set_listing(&self, listing: &str) {
        *self.listing.lock().unwrap() = listing.to_string();
    }

    /// Every non-listing invocation, in order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded invocations whose argv starts with `prefix`
    pub fn count(&self, prefix: &[&str]) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                call.len() >= prefix.len()
                    && call.iter().zip(prefix).all(|(a, b)| a.as_str() == *b)
            })
            .count()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, args: &[String]) -> Result<String> {
        if args.first().map(String::as_str) == Some("-ls") {
            return Ok(self.listing.lock().unwrap().clone());
        }
        self.calls.lock().unwrap().push(args.to_vec());
        Ok(String::new())
    }
}
