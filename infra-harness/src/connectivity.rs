//! TCP reachability probes for cluster nodes.
//!
//! A freshly applied instance takes a while to boot sshd and the k3s API
//! server, so a probe retries the connect on an interval until it succeeds
//! or runs out of attempts.

use std::time::Duration;

use tokio::net::TcpStream;

use crate::config::ConnectivityConfig;

/// How hard to try before declaring a port unreachable.
#[derive(Debug, Clone, Copy)]
pub struct ProbeConfig {
    /// Timeout for one connect attempt.
    pub timeout: Duration,
    /// Total attempts.
    pub attempts: u32,
    /// Pause between attempts.
    pub interval: Duration,
}

impl From<&ConnectivityConfig> for ProbeConfig {
    fn from(c: &ConnectivityConfig) -> Self {
        Self {
            timeout: Duration::from_secs(c.timeout_secs),
            attempts: c.attempts.max(1),
            interval: Duration::from_secs(c.interval_secs),
        }
    }
}

/// Outcome of probing one host:port.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// `host:port` that was probed.
    pub target: String,
    /// Whether a connection was established.
    pub reachable: bool,
    /// Attempts made.
    pub attempts: u32,
    /// Error from the last failed attempt.
    pub last_error: Option<String>,
}

/// Probe `host:port` until it accepts a TCP connection.
pub async fn probe_tcp(host: &str, port: u16, config: ProbeConfig) -> ProbeResult {
    let target = format!("{}:{}", host, port);
    let mut last_error = None;

    for attempt in 1..=config.attempts {
        match tokio::time::timeout(config.timeout, TcpStream::connect(target.as_str())).await {
            Ok(Ok(_stream)) => {
                tracing::info!("{} reachable after {} attempt(s)", target, attempt);
                return ProbeResult {
                    target,
                    reachable: true,
                    attempts: attempt,
                    last_error: None,
                };
            }
            Ok(Err(e)) => last_error = Some(e.to_string()),
            Err(_) => last_error = Some(format!("connect timed out after {:?}", config.timeout)),
        }

        tracing::debug!(
            "{} not reachable (attempt {}/{}): {:?}",
            target,
            attempt,
            config.attempts,
            last_error
        );
        if attempt < config.attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    ProbeResult {
        target,
        reachable: false,
        attempts: config.attempts,
        last_error,
    }
}

/// Probe every port on `host`, one after another.
pub async fn probe_ports(host: &str, ports: &[u16], config: ProbeConfig) -> Vec<ProbeResult> {
    let mut results = Vec::with_capacity(ports.len());
    for &port in ports {
        results.push(probe_tcp(host, port, config).await);
    }
    results
}
