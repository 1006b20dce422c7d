//! # Control queue with per-message acknowledgment and a drain join.
//!
//! A thin wrapper over an unbounded tokio mpsc channel that additionally
//! tracks how many enqueued messages have not yet been acknowledged,
//! so that a supervisor can block until a worker has fully drained.
//!
//! ## Architecture
//! ```text
//! ControlSender (clone per producer)          ControlReceiver (one worker)
//!   send() ── increments outstanding ──► [unbounded mpsc] ──► try_recv()
//!   join() ◄── notified at zero ◄────────── ack() decrements outstanding
//! ```
//!
//! ## Rules
//! - `send` never blocks and only fails if the worker end is gone.
//! - `try_recv` never blocks; consumption order is FIFO.
//! - Every received message must be `ack`'d exactly once; `ack` with no
//!   outstanding received message is a no-op.
//! - `join` resolves when outstanding == 0 — immediately if nothing is
//!   pending, otherwise on the acknowledgment that drains the queue.
//! - `pending` is how a supervisor detects a worker that exited without
//!   consuming its shutdown message (outstanding stuck above zero).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};

use super::message::ControlMessage;

/// State shared between the sender and receiver halves.
struct Shared {
    /// Messages enqueued but not yet acknowledged.
    outstanding: AtomicUsize,
    /// Woken whenever `outstanding` drops to zero.
    drained: Notify,
}

/// Creates a connected control-queue pair.
pub fn queue() -> (ControlSender, ControlReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared {
        outstanding: AtomicUsize::new(0),
        drained: Notify::new(),
    });
    (
        ControlSender {
            tx,
            shared: Arc::clone(&shared),
        },
        ControlReceiver {
            rx,
            shared,
            unacked: 0,
        },
    )
}

/// Producer half of the control queue. Cloneable (multi-producer).
#[derive(Clone)]
pub struct ControlSender {
    tx: mpsc::UnboundedSender<ControlMessage>,
    shared: Arc<Shared>,
}

impl ControlSender {
    /// Enqueues a message without blocking.
    ///
    /// Returns `false` if the worker end has been dropped; in that case
    /// the message is discarded and does not count as outstanding.
    pub fn send(&self, msg: ControlMessage) -> bool {
        self.shared.outstanding.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(msg).is_err() {
            if self.shared.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
                self.shared.drained.notify_waiters();
            }
            return false;
        }
        true
    }

    /// Number of messages enqueued but not yet acknowledged.
    pub fn pending(&self) -> usize {
        self.shared.outstanding.load(Ordering::SeqCst)
    }

    /// Resolves once every enqueued message has been acknowledged.
    ///
    /// Returns immediately when nothing is outstanding.
    pub async fn join(&self) {
        loop {
            // Register interest before checking, so an ack that lands
            // between the check and the await still wakes us.
            let notified = self.shared.drained.notified();
            if self.shared.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Consumer half of the control queue. Owned by exactly one worker.
pub struct ControlReceiver {
    rx: mpsc::UnboundedReceiver<ControlMessage>,
    shared: Arc<Shared>,
    /// Messages received but not yet acknowledged by this worker.
    unacked: usize,
}

impl ControlReceiver {
    /// Dequeues the next message without blocking; `None` when empty.
    pub fn try_recv(&mut self) -> Option<ControlMessage> {
        match self.rx.try_recv() {
            Ok(msg) => {
                self.unacked += 1;
                Some(msg)
            }
            Err(_) => None,
        }
    }

    /// Acknowledges the most recently received message.
    ///
    /// A no-op when no received message is awaiting acknowledgment.
    pub fn ack(&mut self) {
        if self.unacked == 0 {
            return;
        }
        self.unacked -= 1;
        if self.shared.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.shared.drained.notify_waiters();
        }
    }

    /// Receives and acknowledges everything currently queued.
    ///
    /// Workers call this on their exit paths so that pending messages
    /// (including an unobserved shutdown) never leave a joiner blocked.
    /// Returns the drained messages for the caller to log.
    pub fn drain(&mut self) -> Vec<ControlMessage> {
        let mut drained = Vec::new();
        while let Some(msg) = self.try_recv() {
            self.ack();
            drained.push(msg);
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn join_returns_immediately_when_drained() {
        let (tx, mut rx) = queue();
        tx.send(ControlMessage::shutdown("test"));
        let msg = rx.try_recv().expect("message queued");
        assert!(msg.is_shutdown());
        rx.ack();

        // Must resolve without blocking once the shutdown is acked.
        tokio::time::timeout(Duration::from_millis(50), tx.join())
            .await
            .expect("join should not block after drain");
    }

    #[tokio::test]
    async fn join_blocks_until_ack() {
        let (tx, mut rx) = queue();
        tx.send(ControlMessage::noop("test"));
        assert_eq!(tx.pending(), 1);

        let join = tokio::time::timeout(Duration::from_millis(20), tx.join()).await;
        assert!(join.is_err(), "join must block while a message is unacked");

        rx.try_recv().expect("message queued");
        // Received but not acked: still outstanding.
        assert_eq!(tx.pending(), 1);
        rx.ack();
        assert_eq!(tx.pending(), 0);

        tokio::time::timeout(Duration::from_millis(50), tx.join())
            .await
            .expect("join resolves after ack");
    }

    #[tokio::test]
    async fn try_recv_is_nonblocking_and_fifo() {
        let (tx, mut rx) = queue();
        assert!(rx.try_recv().is_none());

        tx.send(ControlMessage::noop("a"));
        tx.send(ControlMessage::shutdown("b"));
        assert_eq!(rx.try_recv().unwrap().origin(), "a");
        assert_eq!(rx.try_recv().unwrap().origin(), "b");
        assert!(rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn ack_without_receive_is_noop() {
        let (tx, mut rx) = queue();
        rx.ack();
        tx.send(ControlMessage::noop("test"));
        rx.ack(); // nothing received yet: still a no-op
        assert_eq!(tx.pending(), 1);
    }

    #[tokio::test]
    async fn drain_clears_everything_queued() {
        let (tx, mut rx) = queue();
        tx.send(ControlMessage::noop("one"));
        tx.send(ControlMessage::shutdown("two"));

        let drained = rx.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(tx.pending(), 0);
    }

    #[tokio::test]
    async fn multi_producer_counts_are_shared() {
        let (tx, mut rx) = queue();
        let tx2 = tx.clone();
        tx.send(ControlMessage::noop("main"));
        tx2.send(ControlMessage::noop("clone"));
        assert_eq!(tx.pending(), 2);
        assert_eq!(tx2.pending(), 2);
        rx.drain();
        assert_eq!(tx2.pending(), 0);
    }
}
