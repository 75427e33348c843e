// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bounded outbound queue drained one byte per control-loop iteration.

use core::fmt;

use heapless::Deque;

use crate::protocol::SerialPort;

/// Bytes the queue can hold before new output is dropped.
pub const TX_CAPACITY: usize = 512;

/// Outbound byte queue. Writes never block; bytes that do not fit are dropped.
pub struct TxBuffer {
    queue: Deque<u8, TX_CAPACITY>,
}

impl Default for TxBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TxBuffer {
    pub fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    /// Queue `bytes`. Returns how many did not fit.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut dropped = 0;
        for &b in bytes {
            if self.queue.push_back(b).is_err() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!("tx queue full, {} bytes dropped", dropped);
        }
        dropped
    }

    /// Move at most one byte into `port`. Returns `true` if a byte was handed over.
    pub fn service<P: SerialPort + ?Sized>(&mut self, port: &mut P) -> bool {
        let Some(&byte) = self.queue.front() else {
            return false;
        };
        if !port.try_write(byte) {
            return false;
        }
        self.queue.pop_front();
        true
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl fmt::Write for TxBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_bytes(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LoopbackPort;
    use core::fmt::Write;

    #[test]
    fn drains_one_byte_per_service_in_order() {
        let mut tx = TxBuffer::new();
        let mut port = LoopbackPort::new();
        write!(tx, "ok {}", 7).unwrap();
        assert_eq!(tx.len(), 4);

        assert!(tx.service(&mut port));
        assert_eq!(port.output(), "o");
        while tx.service(&mut port) {}
        assert_eq!(port.output(), "ok 7");
        assert!(tx.is_empty());
    }

    #[test]
    fn busy_port_keeps_byte_queued() {
        let mut tx = TxBuffer::new();
        let mut port = LoopbackPort::new();
        assert_eq!(tx.push_bytes(b"A"), 0);
        port.tx_busy = true;
        assert!(!tx.service(&mut port));
        assert_eq!(tx.len(), 1);
        port.tx_busy = false;
        assert!(tx.service(&mut port));
        assert_eq!(port.output(), "A");
    }

    #[test]
    fn overflow_drops_newest_bytes() {
        let mut tx = TxBuffer::new();
        assert_eq!(tx.push_bytes(&[b'x'; TX_CAPACITY]), 0);
        assert_eq!(tx.push_bytes(b"yz"), 2);
        tx.write_str("more").unwrap();
        assert_eq!(tx.len(), TX_CAPACITY);
    }
}
