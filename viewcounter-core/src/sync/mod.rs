/*
    Sync subsystem - replica-to-replica state exchange

    Transport primitives (push/pull of counter snapshots) and the
    periodic anti-entropy loop that guarantees convergence.
*/

pub mod anti_entropy;
pub mod transport;

pub use anti_entropy::{AntiEntropyConfig, AntiEntropyTask};
pub use transport::{
    HttpSyncTransport, Peer, SyncEnvelope, SyncTransport, TransportError, TransportResult,
};
