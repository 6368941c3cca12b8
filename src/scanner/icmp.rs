//! ICMP echo transport.
//!
//! Privileged mode opens raw sockets (root or `CAP_NET_RAW`); unprivileged
//! mode uses ICMP datagram sockets, which Linux only allows for groups listed
//! in `net.ipv4.ping_group_range`. Either way a socket that cannot be opened
//! is treated as "no reply" rather than an error.

use crate::scanner::resolve::HostResolver;
use async_trait::async_trait;
use socket2::Type;
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, ICMP};

const PAYLOAD: [u8; 56] = [0; 56];

/// Echo-request transport.
#[async_trait]
pub trait Pinger: Send + Sync {
    /// Send one echo request and report whether a reply arrived in time.
    async fn ping(&self, host: &str, timeout: Duration) -> bool;
}

/// [`Pinger`] backed by `surge-ping` clients.
pub struct IcmpPinger {
    resolver: HostResolver,
    v4: Option<Client>,
    v6: Option<Client>,
}

impl IcmpPinger {
    /// Open the ICMP sockets. Must be called from within a Tokio runtime.
    pub fn new(privileged: bool, resolver: HostResolver) -> Self {
        let sock_type = if privileged { Type::RAW } else { Type::DGRAM };
        Self {
            resolver,
            v4: open_client(ICMP::V4, sock_type, privileged),
            v6: open_client(ICMP::V6, sock_type, privileged),
        }
    }

    async fn echo(&self, host: &str, timeout: Duration) -> bool {
        let ip = match self.resolver.resolve(host).await {
            Ok(ip) => ip,
            Err(e) => {
                tracing::debug!(host, error = %e, "cannot resolve host for ICMP");
                return false;
            }
        };

        let client = match ip {
            IpAddr::V4(_) => self.v4.as_ref(),
            IpAddr::V6(_) => self.v6.as_ref(),
        };
        let Some(client) = client else {
            return false;
        };

        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &PAYLOAD).await {
            Ok((_, rtt)) => {
                tracing::debug!(host, rtt_ms = rtt.as_millis() as u64, "echo reply");
                true
            }
            Err(e) => {
                tracing::trace!(host, error = %e, "no echo reply");
                false
            }
        }
    }
}

#[async_trait]
impl Pinger for IcmpPinger {
    async fn ping(&self, host: &str, timeout: Duration) -> bool {
        // Resolution counts against the same budget as the echo itself.
        tokio::time::timeout(timeout, self.echo(host, timeout))
            .await
            .unwrap_or(false)
    }
}

fn open_client(kind: ICMP, sock_type: Type, privileged: bool) -> Option<Client> {
    let config = Config::builder().kind(kind).sock_type_hint(sock_type).build();
    match Client::new(&config) {
        Ok(client) => Some(client),
        Err(e) => {
            let family = match kind {
                ICMP::V4 => "IPv4",
                ICMP::V6 => "IPv6",
            };
            tracing::warn!(
                family,
                privileged,
                error = %e,
                "cannot open ICMP socket, echo probes will report no reply"
            );
            None
        }
    }
}
