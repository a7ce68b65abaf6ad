//! Ingress paths into the QuantumFlow matching thread.
//!
//! Two producers feed the engine: an in-process producer pushing onto a
//! bounded lock-free SPSC ring, and out-of-process producers sending fixed
//! 56-byte records over a unix datagram socket. The matching thread drains
//! the ring first, then the socket, within a per-tick budget.
//!
//! Both paths are constructed explicitly at startup and passed by handle;
//! there is no process-global state, so tests can stand up private
//! instances.

pub mod ring;
pub mod socket;

pub use ring::{EventRing, RingConsumer, RingProducer, RingStats, DEFAULT_RING_CAPACITY};
pub use socket::{BridgeSocket, SocketStats, DEFAULT_BRIDGE_SOCKET_PATH};
