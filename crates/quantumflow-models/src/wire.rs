//! Fixed-layout wire codec for bridge datagrams.
//!
//! Producer and consumer are colocated on one host, so the record uses
//! native byte order. Layout (56 bytes):
//!
//! | offset | size | field        |
//! |--------|------|--------------|
//! | 0      | 16   | symbol (null-padded ASCII) |
//! | 16     | 1    | side (0=buy, 1=sell)       |
//! | 17     | 1    | event_type (0=level, 1=trade) |
//! | 18     | 6    | reserved, zero             |
//! | 24     | 8    | price (f64)                |
//! | 32     | 8    | quantity (u64, pre-scaled) |
//! | 40     | 8    | timestamp_ns (u64)         |
//! | 48     | 8    | order_id (u64, 0 = synthesise) |

use byteorder::{ByteOrder, NativeEndian};
use thiserror::Error;

use crate::event::{EventKind, MarketDataEvent, Side, SYMBOL_LEN};

/// Size of one encoded record. Shorter datagrams are malformed; longer ones
/// are truncated to this size.
pub const WIRE_SIZE: usize = 56;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("short record: {len} bytes, need 56")]
    Truncated { len: usize },
    #[error("invalid side byte {0}")]
    BadSide(u8),
    #[error("invalid event type byte {0}")]
    BadEventKind(u8),
}

impl MarketDataEvent {
    /// Decode a wire record. Input longer than [`WIRE_SIZE`] is truncated.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < WIRE_SIZE {
            return Err(WireError::Truncated { len: buf.len() });
        }

        let mut symbol = [0u8; SYMBOL_LEN];
        symbol.copy_from_slice(&buf[0..SYMBOL_LEN]);

        let side = Side::from_u8(buf[16]).ok_or(WireError::BadSide(buf[16]))?;
        let kind = EventKind::from_u8(buf[17]).ok_or(WireError::BadEventKind(buf[17]))?;

        Ok(Self {
            symbol,
            side,
            kind,
            price: NativeEndian::read_f64(&buf[24..32]),
            quantity: NativeEndian::read_u64(&buf[32..40]),
            timestamp_ns: NativeEndian::read_u64(&buf[40..48]),
            order_id: NativeEndian::read_u64(&buf[48..56]),
        })
    }

    /// Encode into a wire record. Reserved bytes are zeroed.
    pub fn encode(&self) -> [u8; WIRE_SIZE] {
        let mut buf = [0u8; WIRE_SIZE];
        buf[0..SYMBOL_LEN].copy_from_slice(&self.symbol);
        buf[16] = self.side as u8;
        buf[17] = self.kind as u8;
        NativeEndian::write_f64(&mut buf[24..32], self.price);
        NativeEndian::write_u64(&mut buf[32..40], self.quantity);
        NativeEndian::write_u64(&mut buf[40..48], self.timestamp_ns);
        NativeEndian::write_u64(&mut buf[48..56], self.order_id);
        buf
    }
}
