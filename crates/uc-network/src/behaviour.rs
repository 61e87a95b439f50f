//! The combined swarm behaviour: mDNS for LAN peer discovery, request-response
//! for the clipboard sync protocol, identify and ping for liveness — grounded
//! in the teacher's `uc-platform/src/adapters/libp2p_network.rs` `MdnsBehaviour`
//! (`#[derive(NetworkBehaviour)]` with a hand-written `out_event`), extended
//! with the protocols this daemon actually needs to move data, not just
//! discover peers.

use libp2p::{identify, identity::Keypair, mdns, ping, request_response, PeerId};

use crate::wire::{ClipboardCodec, PROTOCOL_NAME};

#[derive(libp2p::swarm::NetworkBehaviour)]
#[behaviour(out_event = "ClipmanEvent")]
pub struct ClipmanBehaviour {
    pub mdns: mdns::tokio::Behaviour,
    pub sync: request_response::Behaviour<ClipboardCodec>,
    pub identify: identify::Behaviour,
    pub ping: ping::Behaviour,
}

#[derive(Debug)]
pub enum ClipmanEvent {
    Mdns(mdns::Event),
    Sync(request_response::Event<<ClipboardCodec as request_response::Codec>::Request, <ClipboardCodec as request_response::Codec>::Response>),
    Identify(identify::Event),
    Ping(ping::Event),
}

impl From<mdns::Event> for ClipmanEvent {
    fn from(event: mdns::Event) -> Self {
        Self::Mdns(event)
    }
}

impl From<request_response::Event<<ClipboardCodec as request_response::Codec>::Request, <ClipboardCodec as request_response::Codec>::Response>> for ClipmanEvent {
    fn from(event: request_response::Event<<ClipboardCodec as request_response::Codec>::Request, <ClipboardCodec as request_response::Codec>::Response>) -> Self {
        Self::Sync(event)
    }
}

impl From<identify::Event> for ClipmanEvent {
    fn from(event: identify::Event) -> Self {
        Self::Identify(event)
    }
}

impl From<ping::Event> for ClipmanEvent {
    fn from(event: ping::Event) -> Self {
        Self::Ping(event)
    }
}

impl ClipmanBehaviour {
    pub fn new(keypair: &Keypair, local_peer_id: PeerId) -> Result<Self, mdns::Error> {
        let mdns = mdns::tokio::Behaviour::new(mdns::Config::default(), local_peer_id)?;
        let sync = request_response::Behaviour::new(
            std::iter::once((PROTOCOL_NAME, request_response::ProtocolSupport::Full)),
            request_response::Config::default(),
        );
        let identify = identify::Behaviour::new(identify::Config::new(
            "/clipman/id/1.0.0".to_string(),
            keypair.public(),
        ));
        let ping = ping::Behaviour::new(ping::Config::default());

        Ok(Self { mdns, sync, identify, ping })
    }
}
