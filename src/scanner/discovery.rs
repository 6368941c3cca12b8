//! Host discovery.
//!
//! A host is alive when it answers an ICMP echo, or failing that, when any
//! of its most popular TCP ports gives a definitive answer (accepted or
//! refused). Hosts that stay silent can be retried in further passes.

use crate::error::{ConfigError, ConfigResult};
use crate::ranking::{PortRanking, Protocol};
use crate::scanner::icmp::{IcmpPinger, Pinger};
use crate::scanner::pool;
use crate::scanner::probe::{Connector, ProbeState, Prober};
use crate::scanner::resolve::HostResolver;
use crate::scanner::tcp::TcpConnector;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How a host was found to be alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiscoveryMethod {
    #[serde(rename = "ICMP")]
    Icmp,
    #[serde(rename = "TCP Ports")]
    TcpPorts,
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Icmp => write!(f, "ICMP"),
            Self::TcpPorts => write!(f, "TCP Ports"),
        }
    }
}

/// Verdict for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostDiscoveryResult {
    pub host: String,
    /// `None` when the host is inactive.
    pub method: Option<DiscoveryMethod>,
    pub active: bool,
}

impl HostDiscoveryResult {
    fn alive(host: String, method: DiscoveryMethod) -> Self {
        Self {
            host,
            method: Some(method),
            active: true,
        }
    }

    fn inactive(host: String) -> Self {
        Self {
            host,
            method: None,
            active: false,
        }
    }
}

/// Progress notifications emitted while a run is underway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    /// Another pass is starting over `hosts` hosts that have not answered.
    ExtraAttempt { attempt: u32, hosts: usize },
    /// A host was just classified as alive.
    Alive(HostDiscoveryResult),
}

type Reporter = Arc<dyn Fn(&DiscoveryEvent) + Send + Sync>;

/// Settings for a discovery run.
///
/// A zero timeout disables that probing method.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub icmp_timeout: Duration,
    pub tcp_timeout: Duration,
    /// Number of top-ranked TCP ports to try per host.
    pub ports_to_try: usize,
    /// Maximum number of passes over hosts that have not answered.
    pub attempts: u32,
    /// Concurrent host workers; zero means one per host.
    pub workers: usize,
    /// Use raw ICMP sockets instead of datagram sockets.
    pub privileged_icmp: bool,
    /// Show a progress bar for each pass.
    pub progress: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            icmp_timeout: Duration::from_millis(500),
            tcp_timeout: Duration::from_millis(500),
            ports_to_try: 100,
            attempts: 1,
            workers: 0,
            privileged_icmp: false,
            progress: false,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_icmp_timeout(mut self, timeout: Duration) -> Self {
        self.icmp_timeout = timeout;
        self
    }

    pub fn with_tcp_timeout(mut self, timeout: Duration) -> Self {
        self.tcp_timeout = timeout;
        self
    }

    pub fn with_ports_to_try(mut self, ports: usize) -> Self {
        self.ports_to_try = ports;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_privileged_icmp(mut self, privileged: bool) -> Self {
        self.privileged_icmp = privileged;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Reject settings that would make a run meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.attempts == 0 {
            return Err(ConfigError::Invalid(
                "discovery needs at least one attempt".to_string(),
            ));
        }
        Ok(())
    }
}

/// Host discovery engine.
///
/// Cheap to clone; clones share the ranking and transports.
#[derive(Clone)]
pub struct HostDiscovery {
    inner: Arc<Inner>,
    reporter: Option<Reporter>,
}

struct Inner {
    config: DiscoveryConfig,
    ranking: Arc<PortRanking>,
    prober: Prober,
    pinger: Arc<dyn Pinger>,
}

/// Stand-in used when ICMP is disabled so no socket is opened.
struct NoEcho;

#[async_trait]
impl Pinger for NoEcho {
    async fn ping(&self, _host: &str, _timeout: Duration) -> bool {
        false
    }
}

impl HostDiscovery {
    /// Engine using real TCP connects and ICMP sockets.
    ///
    /// Must be called from within a Tokio runtime when ICMP is enabled.
    pub fn new(config: DiscoveryConfig, ranking: Arc<PortRanking>) -> ConfigResult<Self> {
        let resolver = HostResolver::new();
        let connector = Arc::new(TcpConnector::new(resolver.clone()));
        let pinger: Arc<dyn Pinger> = if config.icmp_timeout.is_zero() {
            Arc::new(NoEcho)
        } else {
            Arc::new(IcmpPinger::new(config.privileged_icmp, resolver))
        };
        Self::with_transport(config, ranking, connector, pinger)
    }

    /// Engine using the given transports.
    pub fn with_transport(
        config: DiscoveryConfig,
        ranking: Arc<PortRanking>,
        connector: Arc<dyn Connector>,
        pinger: Arc<dyn Pinger>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        let prober = Prober::new(connector, config.tcp_timeout);
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                ranking,
                prober,
                pinger,
            }),
            reporter: None,
        })
    }

    /// Call `reporter` for every [`DiscoveryEvent`] as the run progresses.
    ///
    /// Events arrive from the task driving [`run`](Self::run), in order.
    pub fn with_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&DiscoveryEvent) + Send + Sync + 'static,
    {
        self.reporter = Some(Arc::new(reporter));
        self
    }

    /// Discover which of `targets` are alive.
    ///
    /// Returns alive hosts in the order they were classified. Hosts that stay
    /// silent through every attempt are left out.
    pub async fn run(&self, targets: Vec<String>) -> Vec<HostDiscoveryResult> {
        let config = &self.inner.config;
        let mut alive = Vec::new();
        let mut remaining = targets;

        for attempt in 1..=config.attempts {
            if remaining.is_empty() {
                break;
            }
            if attempt > 1 {
                tracing::info!(
                    attempt,
                    hosts = remaining.len(),
                    "performing additional attempt"
                );
                self.report(
                    DiscoveryEvent::ExtraAttempt {
                        attempt,
                        hosts: remaining.len(),
                    },
                    None,
                );
            }

            let (found, silent) = self.pass(remaining).await;
            tracing::info!(attempt, alive = found.len(), silent = silent.len(), "pass complete");
            alive.extend(found);
            remaining = silent;
        }

        alive
    }

    /// One sweep over `hosts`, split into alive results and silent hosts.
    async fn pass(&self, hosts: Vec<String>) -> (Vec<HostDiscoveryResult>, Vec<String>) {
        let progress = self.progress_bar(hosts.len());
        let engine = self.clone();
        let mut results = pool::spawn(hosts, self.inner.config.workers, move |host| {
            let engine = engine.clone();
            async move { engine.check_host(host).await }
        });

        let mut alive = Vec::new();
        let mut silent = Vec::new();
        while let Some(result) = results.recv().await {
            if let Some(pb) = &progress {
                pb.inc(1);
            }

            if result.active {
                self.report(DiscoveryEvent::Alive(result.clone()), progress.as_ref());
                alive.push(result);
            } else {
                silent.push(result.host);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        (alive, silent)
    }

    /// Decide whether a single host is alive.
    async fn check_host(&self, host: String) -> HostDiscoveryResult {
        let config = &self.inner.config;

        if !config.icmp_timeout.is_zero()
            && self.inner.pinger.ping(&host, config.icmp_timeout).await
        {
            tracing::debug!(host = %host, "alive via ICMP");
            return HostDiscoveryResult::alive(host, DiscoveryMethod::Icmp);
        }

        if !config.tcp_timeout.is_zero() {
            if let Some(port) = self.first_answering_port(&host).await {
                tracing::debug!(host = %host, port, "alive via TCP");
                return HostDiscoveryResult::alive(host, DiscoveryMethod::TcpPorts);
            }
        }

        HostDiscoveryResult::inactive(host)
    }

    /// Try ranked ports one at a time until one gives a definitive answer.
    ///
    /// Stops early and returns `None` as soon as the host proves unreachable.
    async fn first_answering_port(&self, host: &str) -> Option<u16> {
        let ports = self
            .inner
            .ranking
            .top_ports(Protocol::Tcp, self.inner.config.ports_to_try);

        for ranked in ports {
            let outcome = self.inner.prober.probe(host, ranked.port).await;
            match outcome.state {
                ProbeState::Open | ProbeState::Closed => return Some(ranked.port),
                ProbeState::HostUnreachable => {
                    tracing::debug!(host, port = ranked.port, "host unreachable");
                    return None;
                }
                ProbeState::Timeout => {}
                ProbeState::Unknown => {
                    if let Some(cause) = &outcome.cause {
                        tracing::debug!(host, port = ranked.port, error = %cause, "indeterminate probe");
                    }
                }
            }
        }

        None
    }

    /// Hand `event` to the reporter, hiding the progress bar while it runs.
    fn report(&self, event: DiscoveryEvent, progress: Option<&ProgressBar>) {
        let Some(reporter) = &self.reporter else {
            return;
        };
        match progress {
            Some(pb) => pb.suspend(|| reporter(&event)),
            None => reporter(&event),
        }
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.inner.config.progress {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    }
}
