//! Transport configuration helpers for the sync swarm, grounded in the
//! teacher's `uc-network/src/transport.rs`: TCP with `nodelay`, Noise, Yamux,
//! and a QUIC profile tuned for low-frequency clipboard traffic rather than
//! high-throughput streaming.

use std::time::Duration;

use libp2p::{identity::Keypair, noise, quic, tcp, yamux};
use tracing::debug;

pub fn tcp_config() -> tcp::Config {
    tcp::Config::default().nodelay(true)
}

pub fn noise_config(keypair: &Keypair) -> Result<noise::Config, noise::Error> {
    noise::Config::new(keypair)
}

pub fn yamux_config() -> yamux::Config {
    yamux::Config::default()
}

/// QUIC is the fallback path behind firewalls that block raw TCP; traffic on
/// this daemon is bursty and small, so idle timeout and keep-alive favor
/// staying connected over throughput.
pub fn quic_config(mut cfg: quic::Config) -> quic::Config {
    cfg.handshake_timeout = Duration::from_secs(30);
    cfg.max_idle_timeout = 300_000;
    cfg.keep_alive_interval = Duration::from_secs(10);
    cfg.max_concurrent_stream_limit = 64;
    cfg.max_stream_data = 16 * 1024 * 1024;
    cfg.max_connection_data = 64 * 1024 * 1024;
    debug!("configured quic transport: idle_timeout=300s keep_alive=10s max_streams=64");
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_config_builds_from_a_fresh_keypair() {
        let keypair = Keypair::generate_ed25519();
        assert!(noise_config(&keypair).is_ok());
    }
}
