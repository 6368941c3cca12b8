//! TCP connect transport.
//!
//! Uses the operating system's socket API to complete a full handshake and
//! closes the connection immediately. No special privileges are required.

use crate::error::ProbeError;
use crate::scanner::probe::Connector;
use crate::scanner::resolve::HostResolver;
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// [`Connector`] backed by real TCP connections.
#[derive(Clone, Default)]
pub struct TcpConnector {
    resolver: HostResolver,
}

impl TcpConnector {
    pub fn new(resolver: HostResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, host: &str, port: u16) -> Result<(), ProbeError> {
        let ip = self.resolver.resolve(host).await?;
        let stream = TcpStream::connect(SocketAddr::new(ip, port)).await?;
        drop(stream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::probe::{ProbeState, Prober};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn prober() -> Prober {
        Prober::new(Arc::new(TcpConnector::default()), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_listening_port_is_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let outcome = prober().probe("127.0.0.1", port).await;
        assert_eq!(outcome.state, ProbeState::Open);
    }

    #[tokio::test]
    async fn test_released_port_is_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let outcome = prober().probe("127.0.0.1", port).await;
        assert_eq!(outcome.state, ProbeState::Closed);
        assert_eq!(outcome.cause, Some(ProbeError::Refused));
    }
}
