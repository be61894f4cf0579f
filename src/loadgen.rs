//! Load Generator
//!
//! Drives the HTTP surface with a fixed number of concurrent clients for a
//! fixed duration and reports throughput and latency.

use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use rand::Rng;
use reqwest::Client;
use tracing::warn;

/// Keys read by the `get-popular` workload.
pub const POPULAR_KEYS: [&str; 5] = ["key-1", "key-2", "key-3", "key-4", "key-5"];

const PRIME_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PUT_PAYLOAD: &str = "some-data-payload";

/// Traffic shape issued by every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Workload {
    /// Reads a small set of primed keys; exercises cache hits
    GetPopular,
    /// Writes a fresh key on every request
    PutAll,
    /// Reads a fresh, never-written key on every request; exercises misses
    GetAll,
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Workload::GetPopular => "get-popular",
            Workload::PutAll => "put-all",
            Workload::GetAll => "get-all",
        };
        f.write_str(name)
    }
}

/// One request the load generator is about to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedRequest {
    Get(String),
    Put(String, String),
}

impl Workload {
    /// Picks the next request for client `client_id`. `seq` must differ per
    /// call from the same client.
    pub fn next_request(&self, client_id: usize, seq: u64, rng: &mut impl Rng) -> PlannedRequest {
        match self {
            Workload::GetPopular => {
                let key = POPULAR_KEYS[rng.random_range(0..POPULAR_KEYS.len())];
                PlannedRequest::Get(key.to_string())
            }
            Workload::PutAll => {
                PlannedRequest::Put(unique_key(client_id, seq), PUT_PAYLOAD.to_string())
            }
            Workload::GetAll => PlannedRequest::Get(unique_key(client_id, seq)),
        }
    }
}

fn unique_key(client_id: usize, seq: u64) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("key-{}-{}-{}", client_id, nanos, seq)
}

/// Parameters for one load test run.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub base_url: String,
    pub clients: usize,
    pub duration: Duration,
    pub workload: Workload,
}

impl LoadConfig {
    fn key_url(&self, key: &str) -> String {
        format!("{}/kv/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Aggregated request outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub total_latency: Duration,
}

impl LoadReport {
    pub fn record(&mut self, latency: Duration, is_error: bool) {
        self.total_requests += 1;
        self.total_latency += latency;
        if is_error {
            self.failed_requests += 1;
        }
    }

    pub fn merge(&mut self, other: &LoadReport) {
        self.total_requests += other.total_requests;
        self.failed_requests += other.failed_requests;
        self.total_latency += other.total_latency;
    }

    pub fn successful_requests(&self) -> u64 {
        self.total_requests - self.failed_requests
    }

    /// Successful requests per second over `duration`.
    pub fn throughput(&self, duration: Duration) -> f64 {
        let secs = duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.successful_requests() as f64 / secs
        }
    }

    /// Mean latency in whole milliseconds, 0 when nothing was sent.
    pub fn average_latency_ms(&self) -> u128 {
        if self.total_requests == 0 {
            0
        } else {
            self.total_latency.as_nanos() / u128::from(self.total_requests) / 1_000_000
        }
    }

    /// Human-readable summary printed at the end of a run.
    pub fn summary(&self, workload: Workload, duration: Duration) -> String {
        format!(
            "--- Load Test Finished ---\n\
             Workload Type:         {}\n\
             Test Duration:         {:?}\n\
             Total Requests:        {}\n\
             Successful Requests:   {}\n\
             Failed Requests:       {}\n\
             Average Throughput:    {:.2} reqs/sec\n\
             Average Response Time: {} ms",
            workload,
            duration,
            self.total_requests,
            self.successful_requests(),
            self.failed_requests,
            self.throughput(duration),
            self.average_latency_ms()
        )
    }
}

/// Writes `data-<key>` for every popular key so `get-popular` reads hit.
///
/// Failures are logged and skipped.
pub async fn prime_popular_keys(config: &LoadConfig) -> Result<(), reqwest::Error> {
    let client = Client::builder().timeout(PRIME_TIMEOUT).build()?;

    for key in POPULAR_KEYS {
        let result = client
            .put(config.key_url(key))
            .body(format!("data-{}", key))
            .send()
            .await;
        match result {
            Ok(resp) if resp.status().is_client_error() || resp.status().is_server_error() => {
                warn!("Priming {} returned status {}", key, resp.status());
            }
            Ok(_) => {}
            Err(err) => warn!("Failed to prime key {}: {}", key, err),
        }
    }
    Ok(())
}

/// Runs the configured workload and returns the merged report.
pub async fn run(config: &LoadConfig) -> Result<LoadReport, reqwest::Error> {
    if config.workload == Workload::GetPopular {
        prime_popular_keys(config).await?;
    }

    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let deadline = Instant::now() + config.duration;

    let mut handles = Vec::with_capacity(config.clients);
    for client_id in 0..config.clients {
        let client = client.clone();
        let config = config.clone();
        handles.push(tokio::spawn(async move {
            run_client(client_id, &client, &config, deadline).await
        }));
    }

    let mut report = LoadReport::default();
    for handle in handles {
        match handle.await {
            Ok(client_report) => report.merge(&client_report),
            Err(err) => warn!("Load client task failed: {}", err),
        }
    }
    Ok(report)
}

async fn run_client(
    client_id: usize,
    client: &Client,
    config: &LoadConfig,
    deadline: Instant,
) -> LoadReport {
    let mut report = LoadReport::default();
    let mut seq = 0u64;

    while Instant::now() < deadline {
        let planned = config
            .workload
            .next_request(client_id, seq, &mut rand::rng());
        seq += 1;

        let request = match planned {
            PlannedRequest::Get(key) => client.get(config.key_url(&key)),
            PlannedRequest::Put(key, value) => client.put(config.key_url(&key)).body(value),
        };

        let started = Instant::now();
        let is_error = match request.send().await {
            Ok(resp) => resp.status().as_u16() >= 400,
            Err(_) => true,
        };
        report.record(started.elapsed(), is_error);
    }

    report
}
