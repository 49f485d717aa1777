//! Messages exchanged between the repaint coordinator and the drawing loop.

use crate::render::coordinator::RepaintTarget;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;

/// Sequence number attached to each repaint request, for log correlation.
pub type RequestId = u64;

/// Ask the drawing loop to redraw the canvas once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepaintRequest {
    pub request_id: RequestId,
}

/// Repaint target that enqueues a [`RepaintRequest`] for the drawing loop.
///
/// Sending on an unbounded channel never blocks, so this is safe to invoke from the producer
/// thread or the timer thread. The loop that drains the channel owns the completion call.
#[derive(Debug)]
pub struct ChannelTarget {
    tx: UnboundedSender<RepaintRequest>,
    next_request_id: AtomicU64,
}

impl ChannelTarget {
    pub fn new(tx: UnboundedSender<RepaintRequest>) -> Self {
        Self {
            tx,
            next_request_id: AtomicU64::new(1),
        }
    }
}

impl RepaintTarget for ChannelTarget {
    fn request_redraw(&self) {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(RepaintRequest { request_id }).is_err() {
            // Drawing loop is gone; nothing left to paint.
            debug!("repaint request {request_id} dropped: drawing loop closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_channel_target_sequences_requests() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let target = ChannelTarget::new(tx);

        target.request_redraw();
        target.request_redraw();

        assert_eq!(rx.try_recv().unwrap(), RepaintRequest { request_id: 1 });
        assert_eq!(rx.try_recv().unwrap(), RepaintRequest { request_id: 2 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_target_tolerates_closed_loop() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let target = ChannelTarget::new(tx);
        target.request_redraw();
    }
}
