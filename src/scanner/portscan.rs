//! Top-ports TCP scanning.
//!
//! Every host runs its own three-stage pipeline:
//!
//! - a producer offers ranked ports one at a time,
//! - a launcher starts one probe task per port, never more than the
//!   per-second rate within any one-second window ([`LaunchGate`]),
//! - the host worker consumes outcomes in completion order.
//!
//! An unreachable verdict on any port cancels the host. Every launch site
//! checks the cancellation token before probing and before publishing, and
//! the host's result is only built after all launched probes have finished.
//! Outcomes that arrive after cancellation are discarded.

use crate::error::{ConfigError, ConfigResult, HostScanError, PortFailure, ProbeError};
use crate::ranking::{PortRanking, Protocol, RankedPort};
use crate::scanner::pool;
use crate::scanner::probe::{Connector, PortProbeOutcome, ProbeState, Prober};
use crate::scanner::rate_limiter::LaunchGate;
use crate::scanner::resolve::HostResolver;
use crate::scanner::tcp::TcpConnector;
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Settings for a scan run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Deadline for each port probe.
    pub tcp_timeout: Duration,
    /// Number of top-ranked TCP ports to probe per host.
    pub top_ports: usize,
    /// Concurrent host workers; zero means one per host.
    pub workers: usize,
    /// Probes started per second for each host.
    pub rate_per_second: usize,
    /// Optional cap on outstanding probes per host, independent of the rate.
    pub max_in_flight: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tcp_timeout: Duration::from_millis(500),
            top_ports: 1000,
            workers: 0,
            rate_per_second: 100,
            max_in_flight: None,
        }
    }
}

impl ScanConfig {
    pub fn with_tcp_timeout(mut self, timeout: Duration) -> Self {
        self.tcp_timeout = timeout;
        self
    }

    pub fn with_top_ports(mut self, count: usize) -> Self {
        self.top_ports = count;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_rate(mut self, per_second: usize) -> Self {
        self.rate_per_second = per_second;
        self
    }

    pub fn with_max_in_flight(mut self, limit: Option<usize>) -> Self {
        self.max_in_flight = limit;
        self
    }

    /// Reject settings under which a scan could never make progress.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rate_per_second == 0 {
            return Err(ConfigError::Invalid("scan rate must be at least 1".to_string()));
        }
        if self.max_in_flight == Some(0) {
            return Err(ConfigError::Invalid(
                "max in-flight probes must be at least 1".to_string(),
            ));
        }
        if self.tcp_timeout.is_zero() {
            return Err(ConfigError::Invalid("TCP timeout must be positive".to_string()));
        }
        Ok(())
    }
}

/// Scan result for one host.
#[derive(Debug, Clone, Serialize)]
pub struct HostScanResult {
    pub host: String,
    /// Open and closed ports, ascending by port number.
    pub ports: Vec<PortProbeOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<HostScanError>,
}

impl HostScanResult {
    /// Ports that accepted a connection.
    pub fn open_ports(&self) -> impl Iterator<Item = &PortProbeOutcome> {
        self.ports.iter().filter(|p| p.state == ProbeState::Open)
    }
}

/// Stream of per-host results in completion order.
///
/// Ends once every host has been scanned.
pub struct ScanStream {
    rx: mpsc::Receiver<HostScanResult>,
}

impl ScanStream {
    /// Wait for the next finished host.
    pub async fn recv(&mut self) -> Option<HostScanResult> {
        self.rx.recv().await
    }
}

impl Stream for ScanStream {
    type Item = HostScanResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Port scan engine.
///
/// Cheap to clone; clones share the ranking and transport.
#[derive(Clone)]
pub struct PortScanner {
    inner: Arc<Inner>,
}

struct Inner {
    config: ScanConfig,
    ranking: Arc<PortRanking>,
    prober: Prober,
}

impl PortScanner {
    /// Engine using real TCP connects.
    pub fn new(config: ScanConfig, ranking: Arc<PortRanking>) -> ConfigResult<Self> {
        let connector = Arc::new(TcpConnector::new(HostResolver::new()));
        Self::with_transport(config, ranking, connector)
    }

    /// Engine using the given transport.
    pub fn with_transport(
        config: ScanConfig,
        ranking: Arc<PortRanking>,
        connector: Arc<dyn Connector>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        let prober = Prober::new(connector, config.tcp_timeout);
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                ranking,
                prober,
            }),
        })
    }

    /// Start scanning `targets`. Must be called from within a Tokio runtime.
    ///
    /// Yields exactly one result per target, even for hosts that turned out
    /// to be down.
    pub fn scan(&self, targets: Vec<String>) -> ScanStream {
        let ports: Arc<[RankedPort]> = Arc::from(
            self.inner
                .ranking
                .top_ports(Protocol::Tcp, self.inner.config.top_ports),
        );
        if ports.len() < self.inner.config.top_ports {
            tracing::warn!(
                requested = self.inner.config.top_ports,
                available = ports.len(),
                "ranking knows fewer ports than requested, scanning all of them"
            );
        }
        tracing::info!(
            hosts = targets.len(),
            ports = ports.len(),
            rate = self.inner.config.rate_per_second,
            "starting scan"
        );

        let scanner = self.clone();
        let rx = pool::spawn(targets, self.inner.config.workers, move |host| {
            let scanner = scanner.clone();
            let ports = Arc::clone(&ports);
            async move { scanner.scan_host(host, ports).await }
        });

        ScanStream { rx }
    }

    /// Scan a single host through its producer/launcher/consumer pipeline.
    async fn scan_host(&self, host: String, ports: Arc<[RankedPort]>) -> HostScanResult {
        let config = &self.inner.config;
        let cancel = CancellationToken::new();
        let target: Arc<str> = Arc::from(host.as_str());

        let (queue_tx, queue_rx) = mpsc::channel(1);
        let (outcome_tx, mut outcome_rx) = mpsc::channel(config.rate_per_second);

        let producer = tokio::spawn(produce(ports, queue_tx, cancel.clone()));
        let launcher = tokio::spawn(
            Launcher {
                prober: self.inner.prober.clone(),
                host: Arc::clone(&target),
                rate: config.rate_per_second,
                limit: config.max_in_flight.map(|n| Arc::new(Semaphore::new(n))),
                cancel: cancel.clone(),
            }
            .run(queue_rx, outcome_tx),
        );

        let mut recorded = Vec::new();
        let mut error = HostScanError::default();

        while let Some(outcome) = outcome_rx.recv().await {
            match outcome.state {
                ProbeState::Timeout => {}
                ProbeState::HostUnreachable => {
                    tracing::debug!(host = %host, port = outcome.port, "host is down, cancelling");
                    error.down = Some(outcome.cause.unwrap_or(ProbeError::NoRoute));
                    cancel.cancel();
                    break;
                }
                ProbeState::Unknown => {
                    let cause = outcome
                        .cause
                        .unwrap_or_else(|| ProbeError::Other("unclassified failure".to_string()));
                    error.failures.push(PortFailure {
                        port: outcome.port,
                        cause,
                    });
                }
                ProbeState::Open | ProbeState::Closed => {
                    let service = self
                        .inner
                        .ranking
                        .service_name(Protocol::Tcp, outcome.port)
                        .map(str::to_owned);
                    recorded.push(outcome.with_service(service));
                }
            }
        }

        // Drain: stop the pipeline and wait for every launched probe.
        cancel.cancel();
        drop(outcome_rx);
        if let Err(e) = producer.await {
            tracing::warn!(host = %host, error = %e, "port producer failed");
        }
        if let Err(e) = launcher.await {
            tracing::warn!(host = %host, error = %e, "probe launcher failed");
        }

        recorded.sort_by_key(|o| o.port);
        recorded.dedup_by_key(|o| o.port);

        tracing::info!(
            host = %host,
            open = recorded.iter().filter(|o| o.state == ProbeState::Open).count(),
            closed = recorded.iter().filter(|o| o.state == ProbeState::Closed).count(),
            down = error.is_host_down(),
            "host scanned"
        );

        HostScanResult {
            host,
            ports: recorded,
            error: (!error.is_empty()).then_some(error),
        }
    }
}

/// Offer ranked ports one at a time until done or cancelled.
async fn produce(ports: Arc<[RankedPort]>, queue: mpsc::Sender<u16>, cancel: CancellationToken) {
    for ranked in ports.iter() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = queue.send(ranked.port) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

/// Starts probe tasks for one host, at most `rate` per second.
struct Launcher {
    prober: Prober,
    host: Arc<str>,
    rate: usize,
    limit: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
}

impl Launcher {
    async fn run(self, mut queue: mpsc::Receiver<u16>, outcomes: mpsc::Sender<PortProbeOutcome>) {
        let mut gate = LaunchGate::per_second(self.rate);
        let mut in_flight = JoinSet::new();

        loop {
            let port = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                port = queue.recv() => match port {
                    Some(port) => port,
                    None => break,
                },
            };

            let permit = match &self.limit {
                Some(limit) => tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break,
                    permit = Arc::clone(limit).acquire_owned() => permit.ok(),
                },
                None => None,
            };

            // Admit last so the gate sees the actual launch instant.
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = gate.admit() => {}
            }

            if self.cancel.is_cancelled() {
                break;
            }

            in_flight.spawn(probe_and_publish(
                self.prober.clone(),
                Arc::clone(&self.host),
                port,
                outcomes.clone(),
                self.cancel.clone(),
                permit,
            ));
        }

        drop(outcomes);
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(host = %self.host, error = %e, "probe task failed");
            }
        }
    }
}

/// Probe one port and publish the outcome unless the host was cancelled.
async fn probe_and_publish(
    prober: Prober,
    host: Arc<str>,
    port: u16,
    outcomes: mpsc::Sender<PortProbeOutcome>,
    cancel: CancellationToken,
    _permit: Option<OwnedSemaphorePermit>,
) {
    if cancel.is_cancelled() {
        return;
    }

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        outcome = prober.probe(&host, port) => outcome,
    };

    if cancel.is_cancelled() {
        return;
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {}
        _ = outcomes.send(outcome) => {}
    }
}
