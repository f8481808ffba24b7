#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use sift_dedup::DedupIndex;
use sift_fetch::{BoxStream, Fetcher, HttpClient, TransportFailure};
use sift_pipeline::{CandidateResource, Coordinator, PipelineOptions};

#[derive(Debug, thiserror::Error)]
#[error("mock transport failure (status {status:?})")]
pub struct MockError {
    pub status: Option<u16>,
}

impl TransportFailure for MockError {
    fn status(&self) -> Option<u16> { self.status }
}

#[derive(Debug, Clone, Default)]
pub struct Route {
    pub body:       Vec<u8>,
    pub status:     Option<u16>,
    /// Number of leading requests answered with 503.
    pub fail_first: u32,
    /// Fail after sending the body.
    pub broken:     bool,
    pub delay:      Duration,
}

impl Route {
    pub fn ok(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            ..Self::default()
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_first(mut self, n: u32) -> Self {
        self.fail_first = n;
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

#[derive(Default)]
struct State {
    routes:        HashMap<String, Route>,
    calls:         Mutex<HashMap<String, u32>>,
    in_flight:     AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// In-memory HTTP client answering from a fixed route table. Unknown URLs
/// get a 404.
#[derive(Clone, Default)]
pub struct MockClient {
    state: Arc<State>,
}

impl MockClient {
    pub fn new<'a>(routes: impl IntoIterator<Item = (&'a str, Route)>) -> Self {
        let routes = routes.into_iter().map(|(url, route)| (url.to_string(), route)).collect();
        Self {
            state: Arc::new(State {
                routes,
                ..State::default()
            }),
        }
    }

    pub fn calls(&self, url: &str) -> u32 {
        self.state.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize { self.state.max_in_flight.load(Ordering::SeqCst) }
}

impl HttpClient for MockClient {
    type Error = MockError;

    async fn stream(
        &self,
        url: &str,
        _headers: &[(String, String)],
    ) -> Result<BoxStream<'static, Result<Bytes, MockError>>, MockError> {
        let call = {
            let mut calls = self.state.calls.lock().unwrap();
            let count = calls.entry(url.to_string()).or_default();
            *count += 1;
            *count
        };

        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let route = self.state.routes.get(url).cloned();
        if let Some(route) = &route {
            tokio::time::sleep(route.delay).await;
        }
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);

        let Some(route) = route else {
            return Err(MockError { status: Some(404) });
        };
        if call <= route.fail_first {
            return Err(MockError { status: Some(503) });
        }
        if let Some(status) = route.status {
            return Err(MockError {
                status: Some(status),
            });
        }

        let mut items = vec![Ok(Bytes::from(route.body))];
        if route.broken {
            items.push(Err(MockError { status: None }));
        }
        Ok(Box::pin(futures_util::stream::iter(items)))
    }
}

pub fn candidate(url: &str) -> CandidateResource { CandidateResource::from_url(url).unwrap() }

pub fn candidates(urls: &[&str]) -> Vec<CandidateResource> { urls.iter().map(|u| candidate(u)).collect() }

/// Coordinator staging under `root/staging` and writing to `root/out`.
pub fn coordinator(
    root: &Path,
    client: MockClient,
    index: DedupIndex,
    options: PipelineOptions,
) -> Coordinator<MockClient> {
    let fetcher = Fetcher::new(client, root.join("staging")).unwrap();
    Coordinator::new(fetcher, Arc::new(index), root.join("out"), options).unwrap()
}

pub fn staging_is_empty(root: &Path) -> bool {
    std::fs::read_dir(root.join("staging")).unwrap().next().is_none()
}
