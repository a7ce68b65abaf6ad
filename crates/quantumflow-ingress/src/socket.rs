//! Non-blocking unix-datagram receiver for out-of-process producers.
//!
//! The socket is bound to a filesystem rendezvous path which is unlinked
//! before binding and again on drop, so a stale path from a crashed run
//! never blocks startup. One `recv` call returns at most one decoded
//! record; short or otherwise malformed datagrams are counted and skipped
//! without ending the drain.

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use quantumflow_models::{MarketDataEvent, WIRE_SIZE};
use tracing::{debug, warn};

/// Default rendezvous path shared with the producer bridge.
pub const DEFAULT_BRIDGE_SOCKET_PATH: &str = "/tmp/quantumflow_bridge.sock";

/// Observable socket counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocketStats {
    pub recv_count: u64,
    pub malformed_count: u64,
}

/// Datagram endpoint owned by the matching thread.
pub struct BridgeSocket {
    socket: UnixDatagram,
    path: PathBuf,
    recv_count: u64,
    malformed_count: u64,
}

impl BridgeSocket {
    /// Unlink any stale socket at `path`, bind a fresh non-blocking
    /// datagram socket there.
    pub fn bind(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let _ = std::fs::remove_file(&path);

        let socket = UnixDatagram::bind(&path)?;
        socket.set_nonblocking(true)?;

        Ok(Self {
            socket,
            path,
            recv_count: 0,
            malformed_count: 0,
        })
    }

    /// Receive one record. Returns `None` when the socket has no more data
    /// this tick (would-block) or on a socket error (logged; the caller's
    /// drain ends for the tick and is retried next tick).
    ///
    /// Datagrams longer than the record size are truncated by the kernel to
    /// the receive buffer; datagrams shorter than the record size count as
    /// malformed and are skipped.
    pub fn recv(&mut self) -> Option<MarketDataEvent> {
        let mut buf = [0u8; WIRE_SIZE];
        loop {
            match self.socket.recv(&mut buf) {
                Ok(n) => match MarketDataEvent::decode(&buf[..n]) {
                    Ok(event) => {
                        self.recv_count += 1;
                        return Some(event);
                    }
                    Err(err) => {
                        self.malformed_count += 1;
                        debug!("[BRIDGE] dropping malformed datagram: {}", err);
                    }
                },
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return None,
                Err(err) => {
                    warn!("[BRIDGE] socket error on {}: {}", self.path.display(), err);
                    return None;
                }
            }
        }
    }

    pub fn stats(&self) -> SocketStats {
        SocketStats {
            recv_count: self.recv_count,
            malformed_count: self.malformed_count,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BridgeSocket {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
